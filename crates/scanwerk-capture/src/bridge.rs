// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Embedder-facing trait definitions for presentation and capture.
//
// The pipeline computes hints and outlines; everything user-visible is
// delegated through these traits. Implementations are injected as
// `Arc<dyn ...>` and called from the worker task, hence the Send + Sync
// bounds.

use scanwerk_core::types::{OverlayStyle, Point, ScanHint};

/// Draws the detected document outline over the camera preview.
pub trait OverlayRenderer: Send + Sync {
    /// Remove any previously drawn outline. Called once per processed
    /// frame, before detection runs.
    fn clear_overlay(&self);

    /// Draw the outline for the current frame. `corners` is the canonical
    /// closed path (top-left, top-right, bottom-right, bottom-left) in
    /// sensor coordinates; mapping to display space is the renderer's
    /// concern.
    fn draw_overlay(&self, corners: &[Point; 4], style: &OverlayStyle);
}

/// Presents framing guidance to the user.
pub trait HintPresenter: Send + Sync {
    /// Show one hint. Called once per processed frame, plus once with
    /// [`ScanHint::Captured`] when the capture fires.
    fn show_hint(&self, hint: ScanHint);
}

/// Receives the capture trigger.
pub trait CaptureSink: Send + Sync {
    /// The framing held steady for the full countdown; acquire and persist
    /// the photo. The pipeline passes no image data.
    fn on_capture_triggered(&self);
}
