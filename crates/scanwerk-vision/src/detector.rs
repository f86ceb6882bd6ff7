// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document detection — composes binarization, contour extraction and
// polygon simplification into a single frame-to-outline pass.

use scanwerk_core::config::ScanConfig;
use tracing::{debug, instrument};

use crate::binarize::binarize;
use crate::contours::external_contours;
use crate::frame::Frame;
use crate::quad::{Quadrilateral, first_quadrilateral};

/// Finds the most plausible document outline in a camera frame.
///
/// The detector holds no state between frames; its tuning is fixed at
/// construction from [`ScanConfig`].
#[derive(Debug, Clone)]
pub struct DocumentDetector {
    fixed_threshold: u8,
    approx_epsilon_ratio: f64,
}

impl DocumentDetector {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            fixed_threshold: config.fixed_threshold,
            approx_epsilon_ratio: config.approx_epsilon_ratio,
        }
    }

    /// Run one detection pass.
    ///
    /// Returns `None` when no external contour simplifies to exactly four
    /// vertices, which callers treat as "no document in view".
    #[instrument(skip(self, frame), fields(width = frame.width(), height = frame.height()))]
    pub fn detect(&self, frame: &Frame) -> Option<Quadrilateral> {
        let binary = binarize(frame, self.fixed_threshold);
        let contours = external_contours(&binary);
        debug!(contours = contours.len(), "external contours ranked");
        let quad = first_quadrilateral(&contours, self.approx_epsilon_ratio);
        if quad.is_none() {
            debug!("no quadrilateral in frame");
        }
        quad
    }
}

impl Default for DocumentDetector {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}
