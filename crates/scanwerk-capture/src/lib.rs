// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-capture — Debounced auto-capture orchestration for ScanWerk.
//
// Owns the asynchronous half of the scanner: a single worker task that
// consumes camera frames, runs the scanwerk-vision detection pass, and
// debounces steady framing into one capture trigger. User-visible output
// goes through the bridge traits implemented by the embedding application.

pub mod bridge;
pub mod debounce;
pub mod pipeline;

pub use bridge::{CaptureSink, HintPresenter, OverlayRenderer};
pub use debounce::{CaptureDebouncer, CaptureTimerState, DebounceAction};
pub use pipeline::FramePipeline;
