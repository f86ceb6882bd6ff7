// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-vision — Per-frame document edge detection for ScanWerk.
//
// Provides the synchronous detection pipeline (binarization, contour
// extraction, quadrilateral approximation) plus the geometry measurements
// and the framing classifier that turn a detected quadrilateral into a
// single scan hint. Everything here is pure and deterministic; the async
// orchestration lives in scanwerk-capture.

pub mod binarize;
pub mod classify;
pub mod contours;
pub mod detector;
pub mod frame;
pub mod metrics;
pub mod quad;

// Re-export the primary types so callers can use `scanwerk_vision::Frame` etc.
pub use classify::classify;
pub use detector::DocumentDetector;
pub use frame::{BinaryImage, Frame};
pub use metrics::DetectionMetrics;
pub use quad::Quadrilateral;
