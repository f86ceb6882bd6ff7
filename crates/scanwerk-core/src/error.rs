// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for ScanWerk.

use thiserror::Error;

/// Top-level error type for all ScanWerk operations.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Frame intake --
    #[error("malformed frame: {width}x{height} RGB needs {expected} bytes, got {actual}")]
    MalformedFrame {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("empty frame: {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },

    // -- Pipeline lifecycle --
    #[error("frame pipeline is not running")]
    PipelineStopped,

    #[error("pipeline worker failed to join: {0}")]
    WorkerJoin(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;
