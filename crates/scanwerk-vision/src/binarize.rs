// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global binarization — grayscale conversion and thresholding against the
// more permissive of a fixed cut and the per-frame Otsu level.

use image::imageops;
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use tracing::{debug, instrument};

use crate::frame::{BinaryImage, Frame};

/// Threshold a frame to black and white.
///
/// The effective cut is the lower of the fixed threshold and the Otsu level
/// computed from the frame's histogram, so a pixel counts as foreground
/// when it clears either criterion. Bright paper on a dark desk passes the
/// fixed cut; dim scenes fall back to whatever separation Otsu finds.
/// Pixels strictly above the cut become 255, everything else 0.
#[instrument(skip(frame), fields(width = frame.width(), height = frame.height()))]
pub fn binarize(frame: &Frame, fixed_threshold: u8) -> BinaryImage {
    let gray = imageops::grayscale(frame.as_rgb());
    let otsu = otsu_level(&gray);
    let cut = otsu.min(fixed_threshold);
    debug!(otsu, fixed = fixed_threshold, cut, "threshold selected");
    BinaryImage::new(threshold(&gray, cut, ThresholdType::Binary))
}
