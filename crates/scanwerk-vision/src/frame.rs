// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame intake — validated RGB camera frames and the binary working images
// derived from them.

use image::{GrayImage, RgbImage};
use scanwerk_core::error::{Result, ScanError};
use tracing::warn;

/// One camera frame in sensor orientation.
///
/// Wraps a packed RGB buffer. Frames are immutable once built; the detector
/// reads them, never writes. Colour-space conversion from whatever the
/// camera actually delivers (NV21, YUYV, ...) is the embedder's job.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wrap raw packed RGB bytes, 3 bytes per pixel, row-major.
    ///
    /// The buffer length must be exactly `width * height * 3`; anything else
    /// is rejected so a stride mismatch cannot silently shear the image.
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ScanError::EmptyFrame { width, height });
        }
        let expected = width as usize * height as usize * 3;
        let actual = bytes.len();
        if actual != expected {
            warn!(width, height, expected, actual, "rejecting malformed frame buffer");
            return Err(ScanError::MalformedFrame {
                width,
                height,
                expected,
                actual,
            });
        }
        let image = RgbImage::from_raw(width, height, bytes).ok_or(ScanError::MalformedFrame {
            width,
            height,
            expected,
            actual,
        })?;
        Ok(Self { image })
    }

    /// Wrap an already-decoded RGB image.
    pub fn from_image(image: RgbImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ScanError::EmptyFrame {
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(Self { image })
    }

    /// Frame width in sensor columns.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in sensor rows.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Total pixel count. The classifier uses this as the frame area
    /// reference; it is the same number whichever way the preview is turned.
    pub fn area(&self) -> f64 {
        self.width() as f64 * self.height() as f64
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }
}

/// A black-and-white working image: 0 is background, 255 is foreground.
///
/// Only the binarizer constructs these, so downstream code can rely on the
/// two-value invariant. Scoped to a single frame's pipeline run.
#[derive(Debug, Clone)]
pub struct BinaryImage(GrayImage);

impl BinaryImage {
    pub(crate) fn new(image: GrayImage) -> Self {
        Self(image)
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_accepts_exact_buffer() {
        let frame = Frame::from_raw(4, 3, vec![0u8; 4 * 3 * 3]).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.area(), 12.0);
    }

    #[test]
    fn from_raw_rejects_short_buffer() {
        let err = Frame::from_raw(4, 3, vec![0u8; 10]).unwrap_err();
        match err {
            ScanError::MalformedFrame {
                expected, actual, ..
            } => {
                assert_eq!(expected, 36);
                assert_eq!(actual, 10);
            }
            other => panic!("expected MalformedFrame, got {other:?}"),
        }
    }

    #[test]
    fn from_raw_rejects_oversized_buffer() {
        // An oversized buffer would decode without error but shear the rows.
        assert!(Frame::from_raw(4, 3, vec![0u8; 40]).is_err());
    }

    #[test]
    fn from_raw_rejects_zero_dimensions() {
        assert!(matches!(
            Frame::from_raw(0, 3, Vec::new()),
            Err(ScanError::EmptyFrame { .. })
        ));
    }
}
