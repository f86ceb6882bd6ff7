// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection metrics — measurements of an accepted quadrilateral against
// its frame, expressed in the portrait view the user actually sees.

use scanwerk_core::types::Point;
use serde::Serialize;

use crate::quad::Quadrilateral;

/// Pixel margin within which a corner counts as touching a view border.
const EDGE_MARGIN: f64 = 50.0;

/// Maximum horizontal drift of a side edge before it reads as skewed.
const SKEW_LIMIT: f64 = 100.0;

/// Corner cosine bound. At 0.085 a corner more than about five degrees off
/// square fails the angle check.
const COSINE_LIMIT: f64 = 0.085;

/// Height-to-width ratio above which a detection is a sliver, not a page.
const DISPROPORTION_LIMIT: f64 = 4.0;

/// Read-only measurements of one detection, in portrait-view coordinates.
///
/// Lives for exactly one classification and is rebuilt from scratch for
/// the next frame.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionMetrics {
    view_width: f64,
    view_height: f64,
    frame_area: f64,
    detected_width: f64,
    detected_height: f64,
    detected_area: f64,
    top_left: Point,
    top_right: Point,
    bottom_right: Point,
    bottom_left: Point,
    max_cosine: f64,
}

impl DetectionMetrics {
    /// Measure `quad` against a `frame_width` x `frame_height` sensor frame.
    ///
    /// This is the only place the sensor-to-view rotation happens. The
    /// preview is shown turned a quarter turn from sensor orientation, so
    /// the view is `frame_height` wide and `frame_width` tall, and a sensor
    /// point `(x, y)` lands at view `(view_width - y, x)`. The corner
    /// labels here mean true view positions: the sensor-canonical
    /// bottom-left corner becomes this view's top-left, and so on around
    /// the quad. Everything upstream of this constructor speaks sensor
    /// coordinates; every field and predicate below speaks view
    /// coordinates.
    pub fn new(quad: &Quadrilateral, frame_width: u32, frame_height: u32) -> Self {
        let view_width = frame_height as f64;
        let view_height = frame_width as f64;
        let rotate = |p: Point| Point::new(view_width - p.y, p.x);

        let top_left = rotate(quad.bottom_left());
        let top_right = rotate(quad.top_left());
        let bottom_right = rotate(quad.top_right());
        let bottom_left = rotate(quad.bottom_right());

        // Opposite edges of a skewed quad differ; the larger span decides.
        let detected_width = (top_right.x - top_left.x).max(bottom_right.x - bottom_left.x);
        let detected_height = (bottom_left.y - top_left.y).max(bottom_right.y - top_right.y);

        Self {
            view_width,
            view_height,
            frame_area: view_width * view_height,
            detected_width,
            detected_height,
            detected_area: quad.area(),
            top_left,
            top_right,
            bottom_right,
            bottom_left,
            max_cosine: max_corner_cosine(quad.polygon()),
        }
    }

    // -- Raw measurements -----------------------------------------------------

    pub fn frame_area(&self) -> f64 {
        self.frame_area
    }

    pub fn detected_area(&self) -> f64 {
        self.detected_area
    }

    pub fn detected_width(&self) -> f64 {
        self.detected_width
    }

    pub fn detected_height(&self) -> f64 {
        self.detected_height
    }

    /// Share of the frame area the detection covers.
    pub fn area_ratio(&self) -> f64 {
        self.detected_area / self.frame_area
    }

    /// Share of the view width the detection spans.
    pub fn width_ratio(&self) -> f64 {
        self.detected_width / self.view_width
    }

    /// Share of the view height the detection spans.
    pub fn height_ratio(&self) -> f64 {
        self.detected_height / self.view_height
    }

    /// Largest corner-angle cosine of the detected polygon.
    pub fn max_cosine(&self) -> f64 {
        self.max_cosine
    }

    // -- Framing predicates ---------------------------------------------------

    /// Any corner within [`EDGE_MARGIN`] of the view border next to it.
    pub fn edge_touching(&self) -> bool {
        self.touches_top() || self.touches_bottom() || self.touches_left() || self.touches_right()
    }

    /// A corner too far off square, either by cosine bound or because a
    /// side edge drifts sideways across the view.
    pub fn angle_not_correct(&self) -> bool {
        self.max_cosine >= COSINE_LIMIT || self.edge_skewed()
    }

    /// Much taller than wide: a pen or a table edge, not a page. Division
    /// by a zero width yields infinity, which correctly reads as a sliver.
    pub fn is_disproportionate(&self) -> bool {
        self.detected_height / self.detected_width > DISPROPORTION_LIMIT
    }

    fn touches_top(&self) -> bool {
        self.top_left.y <= EDGE_MARGIN || self.top_right.y <= EDGE_MARGIN
    }

    fn touches_bottom(&self) -> bool {
        self.bottom_left.y >= self.view_height - EDGE_MARGIN
            || self.bottom_right.y >= self.view_height - EDGE_MARGIN
    }

    fn touches_left(&self) -> bool {
        self.top_left.x <= EDGE_MARGIN || self.bottom_left.x <= EDGE_MARGIN
    }

    fn touches_right(&self) -> bool {
        self.top_right.x >= self.view_width - EDGE_MARGIN
            || self.bottom_right.x >= self.view_width - EDGE_MARGIN
    }

    fn edge_skewed(&self) -> bool {
        (self.top_left.x - self.bottom_left.x).abs() > SKEW_LIMIT
            || (self.top_right.x - self.bottom_right.x).abs() > SKEW_LIMIT
    }
}

/// Largest absolute cosine over the four interior corner angles.
///
/// Each corner's cosine is taken between the vectors to its two polygon
/// neighbours; a perfect right angle gives 0. The small constant under the
/// square root keeps zero-length edges finite instead of dividing by zero.
fn max_corner_cosine(polygon: &[Point; 4]) -> f64 {
    let mut max_cosine = 0.0f64;
    for i in 0..4 {
        let corner = polygon[i];
        let prev = polygon[(i + 3) % 4];
        let next = polygon[(i + 1) % 4];
        max_cosine = max_cosine.max(corner_cosine(prev, corner, next).abs());
    }
    max_cosine
}

fn corner_cosine(prev: Point, corner: Point, next: Point) -> f64 {
    let dx1 = prev.x - corner.x;
    let dy1 = prev.y - corner.y;
    let dx2 = next.x - corner.x;
    let dy2 = next.y - corner.y;
    (dx1 * dx2 + dy1 * dy2) / ((dx1 * dx1 + dy1 * dy1) * (dx2 * dx2 + dy2 * dy2) + 1e-10).sqrt()
}
