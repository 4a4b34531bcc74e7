//! Annotation overlay: skeleton, landmarks and the measured angle.
//!
//! Drawing is presentational only. Nothing here feeds back into the angle.
//! Primitives come from `imageproc`, labels are set in the bundled DejaVu
//! Sans face through `ab_glyph`.

use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut, draw_text_mut,
};
use imageproc::point::Point as Vertex;
use serde::{Deserialize, Serialize};

use crate::landmark::{LandmarkName, LandmarkSet, Point};
use crate::metric::AngleMeasurement;

use LandmarkName::*;

static LABEL_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

pub const MAX_LANDMARK_RADIUS: u32 = 64;
pub const MAX_LINE_THICKNESS: u32 = 64;
pub const MAX_ARC_RADIUS: u32 = 1024;
pub const LABEL_SIZE_RANGE: std::ops::RangeInclusive<f32> = 4.0..=256.0;

const ARC_SEGMENTS: usize = 32;
const LABEL_MARGIN: i32 = 10;

/// Body connections drawn as the skeleton (face omitted).
pub const SKELETON_EDGES: [(LandmarkName, LandmarkName); 24] = [
    (LeftShoulder, RightShoulder),
    (LeftShoulder, LeftElbow),
    (LeftElbow, LeftWrist),
    (RightShoulder, RightElbow),
    (RightElbow, RightWrist),
    (LeftWrist, LeftIndex),
    (LeftWrist, LeftPinky),
    (LeftWrist, LeftThumb),
    (RightWrist, RightIndex),
    (RightWrist, RightPinky),
    (RightWrist, RightThumb),
    (LeftShoulder, LeftHip),
    (RightShoulder, RightHip),
    (LeftHip, RightHip),
    (LeftHip, LeftKnee),
    (LeftKnee, LeftAnkle),
    (LeftAnkle, LeftHeel),
    (LeftHeel, LeftFootIndex),
    (LeftAnkle, LeftFootIndex),
    (RightHip, RightKnee),
    (RightKnee, RightAnkle),
    (RightAnkle, RightHeel),
    (RightHeel, RightFootIndex),
    (RightAnkle, RightFootIndex),
];

/// Colours and sizes of the overlay, in working-image pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    pub landmark_radius: u32,
    pub line_thickness: u32,
    pub arc_radius: u32,

    /// Pixel height of the angle label; the side label is drawn at 80%.
    pub label_size: f32,

    pub skeleton_color: [u8; 3],
    pub landmark_color: [u8; 3],
    pub measurement_color: [u8; 3],

    /// Colour of the "No pose detected" stamp.
    pub error_color: [u8; 3],
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            landmark_radius: 3,
            line_thickness: 2,
            arc_radius: 30,
            label_size: 24.0,
            skeleton_color: [245, 117, 66],
            landmark_color: [245, 66, 230],
            measurement_color: [0, 255, 0],
            error_color: [255, 0, 0],
        }
    }
}

impl AnnotationStyle {
    /// Rejects sizes the annotator would not draw as given.
    pub fn validate(&self) -> Result<(), String> {
        let limits = [
            ("landmark_radius", self.landmark_radius, MAX_LANDMARK_RADIUS),
            ("line_thickness", self.line_thickness, MAX_LINE_THICKNESS),
            ("arc_radius", self.arc_radius, MAX_ARC_RADIUS),
        ];
        for (field, value, max) in limits {
            if value > max {
                return Err(format!("annotation.{field} is {value}, at most {max} is allowed"));
            }
        }
        if !LABEL_SIZE_RANGE.contains(&self.label_size) {
            return Err(format!(
                "annotation.label_size is {}, expected {} to {}",
                self.label_size,
                LABEL_SIZE_RANGE.start(),
                LABEL_SIZE_RANGE.end()
            ));
        }
        Ok(())
    }

    fn clamped(mut self) -> Self {
        self.landmark_radius = self.landmark_radius.min(MAX_LANDMARK_RADIUS);
        self.line_thickness = self.line_thickness.min(MAX_LINE_THICKNESS);
        self.arc_radius = self.arc_radius.min(MAX_ARC_RADIUS);
        if !LABEL_SIZE_RANGE.contains(&self.label_size) {
            self.label_size = Self::default().label_size;
        }
        self
    }
}

/// Draws landmark overlays onto copies of working images.
#[derive(Clone, Debug)]
pub struct Annotator {
    style: AnnotationStyle,
    font: Option<FontRef<'static>>,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(AnnotationStyle::default())
    }
}

impl Annotator {
    /// Sizes beyond the `MAX_*` limits are clamped.
    pub fn new(style: AnnotationStyle) -> Self {
        let font = match FontRef::try_from_slice(LABEL_FONT) {
            Ok(font) => Some(font),
            Err(err) => {
                tracing::warn!(error = %err, "label font unusable; drawing without labels");
                None
            }
        };
        Self {
            style: style.clamped(),
            font,
        }
    }

    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    /// Returns a copy of `raster` with the skeleton, every landmark, the
    /// two rays plus arc of `measurement`, and its angle and side labels.
    pub fn annotate(
        &self,
        raster: &RgbImage,
        landmarks: &LandmarkSet,
        measurement: &AngleMeasurement,
    ) -> RgbImage {
        let mut canvas = raster.clone();
        let style = &self.style;

        let skeleton = Rgb(style.skeleton_color);
        for (a, b) in SKELETON_EDGES {
            if let (Some(pa), Some(pb)) = (landmarks.position(a), landmarks.position(b)) {
                draw_thick_segment(&mut canvas, pa, pb, style.line_thickness, skeleton);
            }
        }

        let dot = Rgb(style.landmark_color);
        for landmark in landmarks {
            draw_disc(&mut canvas, landmark.position, style.landmark_radius, dot);
        }

        let highlight = Rgb(style.measurement_color);
        let ops = &measurement.operands;
        let thick = style.line_thickness + 1;
        draw_thick_segment(&mut canvas, ops.vertex, ops.first, thick, highlight);
        draw_thick_segment(&mut canvas, ops.vertex, ops.last, thick, highlight);
        draw_arc(
            &mut canvas,
            ops.vertex,
            ops.vertex.heading_to(&ops.first),
            ops.vertex.heading_to(&ops.last),
            f64::from(style.arc_radius),
            highlight,
        );
        for point in [ops.first, ops.vertex, ops.last] {
            draw_disc(&mut canvas, point, style.landmark_radius + 2, highlight);
        }

        let angle_label = format!("{}: {:.1}°", measurement.metric, measurement.degrees);
        let side_label = format!("Side: {}", measurement.side);
        self.draw_labels(
            &mut canvas,
            &[(angle_label.as_str(), 1.0), (side_label.as_str(), 0.8)],
            highlight,
        );

        canvas
    }

    /// Returns a copy of `raster` stamped "No pose detected".
    pub fn no_pose(&self, raster: &RgbImage) -> RgbImage {
        let mut canvas = raster.clone();
        self.draw_labels(
            &mut canvas,
            &[("No pose detected", 1.0)],
            Rgb(self.style.error_color),
        );
        canvas
    }

    /// Stacks `(text, relative size)` lines down from the top-left corner.
    fn draw_labels(&self, canvas: &mut RgbImage, lines: &[(&str, f32)], color: Rgb<u8>) {
        let Some(font) = &self.font else {
            return;
        };
        let mut y = LABEL_MARGIN;
        for &(text, relative) in lines {
            let size = self.style.label_size * relative;
            draw_text_mut(canvas, color, LABEL_MARGIN, y, PxScale::from(size), font, text);
            y += (size * 1.4).round() as i32;
        }
    }
}

fn vertex(point: Point) -> Vertex<i32> {
    Vertex::new(point.x.round() as i32, point.y.round() as i32)
}

fn pixel(point: Point) -> (f32, f32) {
    (point.x.round() as f32, point.y.round() as f32)
}

/// Cuts `from -> to` to the part inside the canvas grown by `margin` on
/// every side. `None` when nothing of it is there or it is not finite.
///
/// imageproc steps through every pixel of a line, visible or not.
fn clip_segment(canvas: &RgbImage, from: Point, to: Point, margin: f64) -> Option<(Point, Point)> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    if !from.is_finite() || !dx.is_finite() || !dy.is_finite() {
        return None;
    }

    let (width, height) = (f64::from(canvas.width()), f64::from(canvas.height()));
    let (mut enter, mut leave) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, from.x + margin),
        (dx, width + margin - from.x),
        (-dy, from.y + margin),
        (dy, height + margin - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            enter = enter.max(t);
        } else {
            leave = leave.min(t);
        }
        if enter > leave {
            return None;
        }
    }

    Some((from.offset(dx * enter, dy * enter), from.offset(dx * leave, dy * leave)))
}

fn draw_thick_segment(canvas: &mut RgbImage, from: Point, to: Point, thickness: u32, color: Rgb<u8>) {
    let Some((a, b)) = clip_segment(canvas, from, to, f64::from(thickness) + 2.0) else {
        return;
    };
    let length = (b.x - a.x).hypot(b.y - a.y);
    if thickness <= 1 || length < 1.0 {
        draw_line_segment_mut(canvas, pixel(a), pixel(b), color);
        return;
    }

    let half = f64::from(thickness) / 2.0;
    let (nx, ny) = (-(b.y - a.y) / length * half, (b.x - a.x) / length * half);
    let quad = [
        vertex(a.offset(nx, ny)),
        vertex(b.offset(nx, ny)),
        vertex(b.offset(-nx, -ny)),
        vertex(a.offset(-nx, -ny)),
    ];
    // draw_polygon_mut panics when the outline closes on itself.
    if quad[0] == quad[3] {
        draw_line_segment_mut(canvas, pixel(a), pixel(b), color);
    } else {
        draw_polygon_mut(canvas, &quad, color);
    }
}

fn draw_disc(canvas: &mut RgbImage, center: Point, radius: u32, color: Rgb<u8>) {
    let reach = f64::from(radius) + 1.0;
    let (width, height) = (f64::from(canvas.width()), f64::from(canvas.height()));
    // Also rejects NaN.
    if !(center.x > -reach && center.x < width + reach && center.y > -reach && center.y < height + reach) {
        return;
    }
    let (x, y) = (center.x.round() as i32, center.y.round() as i32);
    draw_filled_circle_mut(canvas, (x, y), radius as i32, color);
}

/// Draws the short arc at `center` from heading `start` to heading `end`.
fn draw_arc(canvas: &mut RgbImage, center: Point, start: f64, end: f64, radius: f64, color: Rgb<u8>) {
    use std::f64::consts::{PI, TAU};

    let mut sweep = (end - start) % TAU;
    if sweep > PI {
        sweep -= TAU;
    } else if sweep < -PI {
        sweep += TAU;
    }

    let along = |i: usize| {
        let heading = start + sweep * (i as f64 / ARC_SEGMENTS as f64);
        center.offset(radius * heading.cos(), radius * heading.sin())
    };
    for i in 0..ARC_SEGMENTS {
        if let Some((a, b)) = clip_segment(canvas, along(i), along(i + 1), 1.0) {
            draw_line_segment_mut(canvas, pixel(a), pixel(b), color);
        }
    }
}

/// Fuzz-only entrypoint for the drawing primitives with arbitrary geometry.
#[cfg(feature = "fuzzing")]
pub fn fuzz_draw(width: u32, height: u32, points: [(f64, f64); 3]) {
    let mut canvas = RgbImage::new(width.clamp(1, 256), height.clamp(1, 256));
    let [first, vertex, last] = points.map(|(x, y)| Point::new(x, y));
    let color = Rgb([255, 255, 255]);
    draw_thick_segment(&mut canvas, vertex, first, 3, color);
    draw_thick_segment(&mut canvas, vertex, last, 3, color);
    draw_disc(&mut canvas, vertex, 5, color);
    draw_arc(
        &mut canvas,
        vertex,
        vertex.heading_to(&first),
        vertex.heading_to(&last),
        30.0,
        color,
    );
}
