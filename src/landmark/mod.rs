//! Pose landmark model.
//!
//! A pose detector turns one image into a [`LandmarkSet`]: a fixed
//! enumeration of named anatomical points with 2-D positions. Everything
//! the angle engine consumes is expressed in these types.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: positions carry their coordinate space as a type
//!    parameter ([`Pixel`] or [`Normalized`]); angles are only ever measured
//!    on [`Point`] (= `Coord<Pixel>`).
//!
//! 2. **Closed Vocabulary**: landmark names are an enum of the 33-point
//!    body model, not strings, so a misspelt name is a parse error rather
//!    than a silent lookup miss.
//!
//! 3. **Validated Sets**: a [`LandmarkSet`] never contains duplicate names
//!    or non-finite positions.
//!
//! # Example
//!
//! ```
//! use goniometry::landmark::{Landmark, LandmarkName, LandmarkSet};
//!
//! let set = LandmarkSet::new(vec![
//!     Landmark::new(LandmarkName::RightHip, 100.0, 100.0),
//!     Landmark::new(LandmarkName::RightKnee, 100.0, 200.0),
//! ])
//! .unwrap();
//! assert!(set.contains(LandmarkName::RightKnee));
//! ```

mod coord;
pub mod io_json;
mod model;
mod name;
mod space;

pub use coord::{Coord, Point};
pub use model::{Landmark, LandmarkSet};
pub use name::{Joint, LandmarkName, Side};
pub use space::{Normalized, Pixel};

use thiserror::Error;

/// Problems with detector output that prevent building a [`LandmarkSet`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LandmarkError {
    #[error("unknown landmark name '{0}'")]
    UnknownName(String),

    #[error("landmark {0} appears more than once")]
    DuplicateName(LandmarkName),

    #[error("landmark {name} has a non-finite position")]
    NonFinite { name: LandmarkName },

    #[error("unnamed landmark at index {0} is outside the 33-point model")]
    IndexOutOfRange(usize),
}
