// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral acceptance — polygon approximation over ranked contours
// and canonical corner ordering.

use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point as GridPoint;
use scanwerk_core::types::Point;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::contours::RankedContour;

/// The accepted four-vertex document candidate, in sensor coordinates.
///
/// `polygon` preserves the approximation's own vertex order, which the
/// corner-angle check needs. `corners` holds the same four points relabelled
/// canonically: top-left has the smallest `x + y`, top-right the smallest
/// `y - x`, bottom-right the largest `x + y`, bottom-left the largest
/// `y - x`. Ties keep the first-encountered vertex, so degenerate shapes
/// stay deterministic.
#[derive(Debug, Clone, Serialize)]
pub struct Quadrilateral {
    polygon: [Point; 4],
    corners: [Point; 4],
}

impl Quadrilateral {
    pub fn from_polygon(polygon: [Point; 4]) -> Self {
        let corners = canonical_corners(&polygon);
        Self { polygon, corners }
    }

    /// Vertices in approximation order.
    pub fn polygon(&self) -> &[Point; 4] {
        &self.polygon
    }

    /// Vertices in canonical order: top-left, top-right, bottom-right,
    /// bottom-left. This is the closed path handed to overlay renderers.
    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[3]
    }

    /// Enclosed area via the shoelace formula.
    pub fn area(&self) -> f64 {
        let mut area = 0.0;
        for i in 0..self.polygon.len() {
            let j = (i + 1) % self.polygon.len();
            area += self.polygon[i].x * self.polygon[j].y;
            area -= self.polygon[j].x * self.polygon[i].y;
        }
        area.abs() / 2.0
    }
}

/// Walk `contours` (largest first) and accept the first one whose
/// simplified polygon has exactly four vertices.
///
/// The approximation tolerance is `epsilon_ratio` of each contour's closed
/// perimeter, so tolerance scales with candidate size. Contours after the
/// first acceptance are never examined.
#[instrument(skip(contours), fields(candidates = contours.len()))]
pub fn first_quadrilateral(
    contours: &[RankedContour],
    epsilon_ratio: f64,
) -> Option<Quadrilateral> {
    for contour in contours {
        let ring = contour.boundary();
        // Approximation only removes vertices; shorter rings can never
        // make a quadrilateral.
        if ring.len() < 4 {
            continue;
        }
        let epsilon = epsilon_ratio * arc_length(contour.points(), true);
        if epsilon <= 0.0 {
            continue;
        }
        // The approximation anchors on the ring's two ends and its closed
        // pass drops the final output point. The full walk ends adjacent
        // to its start, so the dropped point is the redundant closure, not
        // a corner. The compressed chain must never go through here: its
        // last point is a real vertex.
        let approx = approximate_polygon_dp(ring, epsilon, true);
        if approx.len() == 4 {
            debug!(area = contour.area(), "quadrilateral accepted");
            return Some(Quadrilateral::from_polygon([
                to_sensor_point(approx[0]),
                to_sensor_point(approx[1]),
                to_sensor_point(approx[2]),
                to_sensor_point(approx[3]),
            ]));
        }
    }
    None
}

fn to_sensor_point(p: GridPoint<i32>) -> Point {
    Point::new(p.x as f64, p.y as f64)
}

fn canonical_corners(polygon: &[Point; 4]) -> [Point; 4] {
    [
        first_min(polygon, |p| p.x + p.y), // top-left
        first_min(polygon, |p| p.y - p.x), // top-right
        first_max(polygon, |p| p.x + p.y), // bottom-right
        first_max(polygon, |p| p.y - p.x), // bottom-left
    ]
}

/// First point minimising `key`. Unlike `Iterator::min_by`, ties keep the
/// earliest point rather than the latest.
fn first_min(points: &[Point; 4], key: impl Fn(&Point) -> f64) -> Point {
    let mut best = points[0];
    let mut best_key = key(&points[0]);
    for p in &points[1..] {
        let k = key(p);
        if k < best_key {
            best = *p;
            best_key = k;
        }
    }
    best
}

/// First point maximising `key`; the tie rule matches [`first_min`].
fn first_max(points: &[Point; 4], key: impl Fn(&Point) -> f64) -> Point {
    let mut best = points[0];
    let mut best_key = key(&points[0]);
    for p in &points[1..] {
        let k = key(p);
        if k > best_key {
            best = *p;
            best_key = k;
        }
    }
    best
}
