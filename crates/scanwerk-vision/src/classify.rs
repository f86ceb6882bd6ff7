// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Framing classification — the ordered decision rules that turn detection
// metrics into a single scan hint.

use scanwerk_core::types::ScanHint;
use tracing::debug;

use crate::metrics::DetectionMetrics;

/// Detections above this share of the frame area are implausible; a real
/// page never fills the whole preview.
pub const AREA_CEILING_RATIO: f64 = 0.95;

/// Detections below this share of the frame area are noise.
pub const AREA_FLOOR_RATIO: f64 = 0.20;

/// Between the floor and this bound the document is real but too far away.
pub const AREA_NEAR_FLOOR_RATIO: f64 = 0.25;

/// Above this share of the frame area the document crowds the preview.
pub const AREA_CROWD_RATIO: f64 = 0.75;

/// A width or height spanning more than this share of the view reads as
/// about to clip.
pub const SPAN_LIMIT_RATIO: f64 = 0.9;

/// Map one detection's metrics to framing guidance.
///
/// The rules are ordered and the first match wins. Every arm except the
/// last cancels a pending capture countdown; only a run of uninterrupted
/// [`ScanHint::CapturingImage`] verdicts lets the capture fire.
pub fn classify(metrics: &DetectionMetrics) -> ScanHint {
    let area_ratio = metrics.area_ratio();

    let hint = if area_ratio > AREA_CEILING_RATIO || area_ratio < AREA_FLOOR_RATIO {
        ScanHint::FindRect
    } else if area_ratio < AREA_NEAR_FLOOR_RATIO {
        // Small but plausible: either clipped against a border or simply
        // far away.
        if metrics.edge_touching() {
            ScanHint::MoveAway
        } else {
            ScanHint::MoveCloser
        }
    } else if metrics.height_ratio() > SPAN_LIMIT_RATIO {
        ScanHint::MoveAway
    } else if metrics.width_ratio() > SPAN_LIMIT_RATIO || area_ratio > AREA_CROWD_RATIO {
        ScanHint::MoveAway
    } else if metrics.edge_touching() {
        ScanHint::MoveAway
    } else if metrics.angle_not_correct() {
        ScanHint::AdjustAngle
    } else {
        debug!(
            aspect = metrics.detected_height() / metrics.detected_width(),
            disproportionate = metrics.is_disproportionate(),
            "framing steady"
        );
        ScanHint::CapturingImage
    };

    debug!(
        area_ratio,
        width_ratio = metrics.width_ratio(),
        height_ratio = metrics.height_ratio(),
        max_cosine = metrics.max_cosine(),
        hint = %hint,
        "frame classified"
    );
    hint
}
