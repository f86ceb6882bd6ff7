// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the ScanWerk capture engine.

use serde::{Deserialize, Serialize};

/// A point in sensor image coordinates: `x` is the column index, `y` the
/// row index, matching the convention of the `image` crate. The preview is
/// displayed rotated a quarter turn; that mapping happens in one place in
/// the vision crate, never here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Framing guidance emitted once per processed frame.
///
/// This is the entire vocabulary between the geometry classifier, the
/// capture debouncer, and the embedding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanHint {
    /// Document too small in frame — user should move the camera closer.
    MoveCloser,
    /// Document too large, clipped, or skewed against a border.
    MoveAway,
    /// Detection is implausible (near-full-frame or tiny); keep searching.
    FindRect,
    /// A corner angle is too far from square.
    AdjustAngle,
    /// Framing is good; the capture countdown is running.
    CapturingImage,
    /// The capture fired.
    Captured,
    /// Nothing to report (e.g. no quadrilateral found this frame).
    NoMessage,
}

// -- Overlay styling ---------------------------------------------------------

/// Translucent red wash shown while the user still needs to adjust framing.
const WARN_FILL: Tint = Tint::rgba(255, 38, 0, 30);
const WARN_STROKE: Tint = Tint::rgb(255, 38, 0);

/// Green wash shown once framing is good and the countdown is running.
const AFFIRM_FILL: Tint = Tint::rgba(38, 216, 76, 30);
const AFFIRM_STROKE: Tint = Tint::rgb(38, 216, 76);

/// Border thickness shared by every overlay style.
const STROKE_WIDTH: f32 = 12.0;

impl ScanHint {
    /// Overlay colours for this hint. Total by construction: adding a hint
    /// variant without a style is a compile error.
    pub fn overlay_style(&self) -> OverlayStyle {
        match self {
            Self::MoveCloser | Self::MoveAway | Self::AdjustAngle => OverlayStyle {
                fill: WARN_FILL,
                stroke: WARN_STROKE,
                stroke_width: STROKE_WIDTH,
            },
            // Path is still drawn, just invisibly, so the renderer keeps a
            // consistent call pattern while the detector hunts.
            Self::FindRect => OverlayStyle {
                fill: Tint::CLEAR,
                stroke: Tint::CLEAR,
                stroke_width: STROKE_WIDTH,
            },
            Self::CapturingImage => OverlayStyle {
                fill: AFFIRM_FILL,
                stroke: AFFIRM_STROKE,
                stroke_width: STROKE_WIDTH,
            },
            Self::Captured | Self::NoMessage => OverlayStyle {
                fill: Tint::CLEAR,
                stroke: Tint::CLEAR,
                stroke_width: STROKE_WIDTH,
            },
        }
    }
}

impl std::fmt::Display for ScanHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::MoveCloser => "move closer",
            Self::MoveAway => "move away",
            Self::FindRect => "finding document",
            Self::AdjustAngle => "adjust angle",
            Self::CapturingImage => "hold steady",
            Self::Captured => "captured",
            Self::NoMessage => "no message",
        };
        write!(f, "{label}")
    }
}

/// An RGBA colour. Kept independent of any image crate so UI layers can map
/// it onto whatever paint type they use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Tint {
    /// Fully transparent.
    pub const CLEAR: Tint = Tint::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// True when the colour draws nothing.
    pub const fn is_clear(&self) -> bool {
        self.a == 0
    }
}

/// How the detected quadrilateral should be painted on the preview overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub fill: Tint,
    pub stroke: Tint,
    pub stroke_width: f32,
}
