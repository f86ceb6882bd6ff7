// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for detection and capture timing.
///
/// The geometry thresholds that define the classification procedure itself
/// (area ratios, edge margins, the cosine bound) are deliberately not here:
/// they are named constants in the vision crate, because changing them
/// changes what the hints mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Fixed binarization threshold. The effective cut is the lower of this
    /// and the Otsu level computed per frame.
    pub fixed_threshold: u8,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// How long the framing must hold steady before the capture fires.
    pub countdown_ms: u64,
    /// Debounce timer tick period.
    pub tick_ms: u64,
}

impl ScanConfig {
    pub fn countdown(&self) -> Duration {
        Duration::from_millis(self.countdown_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fixed_threshold: 150,
            approx_epsilon_ratio: 0.02,
            countdown_ms: 2_000,
            tick_ms: 100,
        }
    }
}
