// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour extraction — outermost object boundaries from a binary image,
// ranked by enclosed area. Each keeps the full traced ring alongside its
// direction-change points.

use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::point::Point;
use tracing::{debug, instrument};

use crate::frame::BinaryImage;

/// A closed boundary chain with its enclosed area.
///
/// Two views of the same ring are kept. `boundary` is the border walk as
/// traced, every pixel in order, with the last point a ring neighbour of
/// the first; polygon approximation runs over this. `points` drops the
/// straight-run interior pixels and is enough for perimeter and area.
#[derive(Debug, Clone)]
pub struct RankedContour {
    boundary: Vec<Point<i32>>,
    points: Vec<Point<i32>>,
    area: f64,
}

impl RankedContour {
    pub(crate) fn new(boundary: Vec<Point<i32>>) -> Self {
        let points = compress_chain(&boundary);
        let area = shoelace_area(&points);
        Self {
            boundary,
            points,
            area,
        }
    }

    /// Every boundary pixel in trace order. The walk closes on itself, so
    /// the last point is adjacent to the first.
    pub fn boundary(&self) -> &[Point<i32>] {
        &self.boundary
    }

    /// Direction-change points of the boundary, in trace order.
    pub fn points(&self) -> &[Point<i32>] {
        &self.points
    }

    /// Enclosed area in square pixels.
    pub fn area(&self) -> f64 {
        self.area
    }
}

/// Find the outermost contours of `binary`, largest area first.
///
/// Only top-level outer borders are kept. Holes, and shapes nested inside
/// holes, are never document candidates. The sort is stable, so equal areas
/// keep their discovery order and the result is deterministic for
/// identical input.
#[instrument(skip(binary), fields(width = binary.width(), height = binary.height()))]
pub fn external_contours(binary: &BinaryImage) -> Vec<RankedContour> {
    let raw: Vec<Contour<i32>> = find_contours(binary.as_gray());
    let total = raw.len();

    let mut ranked: Vec<RankedContour> = raw
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| RankedContour::new(c.points))
        .collect();

    ranked.sort_by(|a, b| {
        b.area
            .partial_cmp(&a.area)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(total, external = ranked.len(), "contours extracted");
    ranked
}

/// Drop interior points of straight runs from a closed boundary chain.
///
/// Border following yields every boundary pixel; along a straight run the
/// step direction between neighbours is constant, so a point is kept only
/// where the incoming and outgoing steps differ. The chain is treated as a
/// ring: the first and last points get the same test via wraparound.
fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let mut compressed = Vec::with_capacity(n);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let here = points[i];
        let next = points[(i + 1) % n];
        let step_in = (here.x - prev.x, here.y - prev.y);
        let step_out = (next.x - here.x, next.y - here.y);
        if step_in != step_out {
            compressed.push(here);
        }
    }

    if compressed.is_empty() {
        // A closed ring always turns somewhere; this only guards repeated
        // identical points.
        return points.to_vec();
    }
    compressed
}

/// Shoelace area of a closed integer chain.
fn shoelace_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut doubled: i64 = 0;
    for i in 0..n {
        let j = (i + 1) % n;
        doubled += points[i].x as i64 * points[j].y as i64;
        doubled -= points[j].x as i64 * points[i].y as i64;
    }
    doubled.abs() as f64 / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn binary_with_rects(rects: &[(i32, i32, u32, u32)]) -> BinaryImage {
        let mut img = GrayImage::new(120, 90);
        for &(x, y, w, h) in rects {
            draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(w, h), Luma([255u8]));
        }
        BinaryImage::new(img)
    }

    #[test]
    fn empty_image_has_no_contours() {
        let binary = BinaryImage::new(GrayImage::new(50, 50));
        assert!(external_contours(&binary).is_empty());
    }

    #[test]
    fn largest_contour_comes_first() {
        let binary = binary_with_rects(&[(5, 5, 10, 10), (30, 10, 60, 50), (100, 70, 8, 8)]);
        let contours = external_contours(&binary);
        assert_eq!(contours.len(), 3);
        assert!(contours[0].area() > contours[1].area());
        assert!(contours[1].area() > contours[2].area());
        // The 60x50 rectangle dominates; border following traces pixel
        // centres, so the ring is one pixel short of the fill on each axis.
        assert!((contours[0].area() - 59.0 * 49.0).abs() < 1e-6);
    }

    #[test]
    fn hole_boundaries_are_ignored() {
        // A filled rectangle with a hole punched through it: the hole's
        // border and anything inside it must not appear as candidates.
        let mut img = GrayImage::new(100, 80);
        draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(70, 60), Luma([255u8]));
        draw_filled_rect_mut(&mut img, Rect::at(30, 30).of_size(20, 15), Luma([0u8]));
        let contours = external_contours(&BinaryImage::new(img));
        assert_eq!(contours.len(), 1);
    }

    #[test]
    fn straight_runs_compress_to_corners() {
        let binary = binary_with_rects(&[(10, 10, 40, 20)]);
        let contours = external_contours(&binary);
        assert_eq!(contours.len(), 1);
        // An axis-aligned rectangle boundary has exactly four direction
        // changes.
        assert_eq!(contours[0].points().len(), 4);
    }

    #[test]
    fn boundary_ring_ends_adjacent_to_its_start() {
        let binary = binary_with_rects(&[(10, 10, 40, 20)]);
        let contours = external_contours(&binary);
        let ring = contours[0].boundary();
        // The full walk keeps every border pixel, not just the corners, and
        // wraps back to within one step of where it began.
        assert!(ring.len() > contours[0].points().len());
        let (first, last) = (ring[0], ring[ring.len() - 1]);
        assert!((first.x - last.x).abs() <= 1);
        assert!((first.y - last.y).abs() <= 1);
    }

    #[test]
    fn shoelace_area_rectangle() {
        let points = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 5),
            Point::new(0, 5),
        ];
        assert!((shoelace_area(&points) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn shoelace_area_orientation_independent() {
        let clockwise = vec![
            Point::new(0, 0),
            Point::new(0, 5),
            Point::new(10, 5),
            Point::new(10, 0),
        ];
        assert!((shoelace_area(&clockwise) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_chains_have_zero_area() {
        assert_eq!(shoelace_area(&[Point::new(3, 3)]), 0.0);
        assert_eq!(shoelace_area(&[Point::new(3, 3), Point::new(9, 3)]), 0.0);
    }
}
