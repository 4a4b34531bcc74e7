//! Coordinate space marker types.
//!
//! Pose detectors report landmarks as fractions of the frame, while every
//! angle is measured in pixels of the (possibly resized) image. These
//! zero-sized markers keep the two from being mixed up.

use std::fmt;

/// Marker type for pixel coordinates in the analysed image.
///
/// (0, 0) is the top-left corner and y grows downwards.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker type for detector-normalized coordinates (0.0 to 1.0 of the frame).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
