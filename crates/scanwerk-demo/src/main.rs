// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ScanWerk demo — drives the capture pipeline from a synthetic camera.
//
// A scripted "camera" renders a bright rectangle over a dark background.
// The rectangle starts too small, then sits skewed, then settles into a
// well-framed pose. Frames are submitted to a real `FramePipeline` at
// camera cadence and the resulting guidance is logged. The binary exits
// once the auto-capture fires, or after a frame budget runs out.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;
use imageproc::rect::Rect;
use tokio::sync::Notify;
use tokio::time;
use tracing::{debug, info, warn};

use scanwerk_capture::{CaptureSink, FramePipeline, HintPresenter, OverlayRenderer};
use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::Result;
use scanwerk_core::types::{OverlayStyle, Point, ScanHint};
use scanwerk_vision::Frame;

/// Sensor dimensions of the synthetic feed.
const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

/// Cadence of the synthetic feed, roughly 30 fps.
const FRAME_PERIOD: Duration = Duration::from_millis(33);

/// Stop after this many frames even if no capture fired.
const FRAME_BUDGET: u32 = 300;

// ---------------------------------------------------------------------------
// Synthetic camera
// ---------------------------------------------------------------------------

/// Scripted stand-in for a camera feed.
///
/// Each call to [`SyntheticCamera::next_frame`] renders the next frame of a
/// fixed scene: the document is first shown too small to capture, then
/// skewed, then held steady in a well-framed pose until the countdown runs.
struct SyntheticCamera {
    index: u32,
}

impl SyntheticCamera {
    fn new() -> Self {
        Self { index: 0 }
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let index = self.index;
        self.index += 1;

        let mut image =
            RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgb([20, 20, 20]));
        let paper = Rgb([235, 235, 235]);

        match index {
            // Far too small: the detector finds it but the framing is poor.
            0..=29 => {
                draw_filled_rect_mut(
                    &mut image,
                    Rect::at(220, 140).of_size(200, 200),
                    paper,
                );
            }
            // Closer, but still not filling enough of the view.
            30..=59 => {
                draw_filled_rect_mut(
                    &mut image,
                    Rect::at(195, 115).of_size(250, 250),
                    paper,
                );
            }
            // Right size, wrong angle: a slanted parallelogram.
            60..=89 => {
                let corners = [
                    PixelPoint::new(120, 80),
                    PixelPoint::new(560, 80),
                    PixelPoint::new(520, 400),
                    PixelPoint::new(80, 400),
                ];
                draw_polygon_mut(&mut image, &corners, paper);
            }
            // Settled and well framed; held here until the capture fires.
            _ => {
                draw_filled_rect_mut(
                    &mut image,
                    Rect::at(80, 80).of_size(480, 320),
                    paper,
                );
            }
        }

        Frame::from_image(image)
    }
}

// ---------------------------------------------------------------------------
// Logging bridge implementations
// ---------------------------------------------------------------------------

/// Overlay "renderer" that logs outline geometry instead of drawing it.
struct LogOverlay;

impl OverlayRenderer for LogOverlay {
    fn clear_overlay(&self) {}

    fn draw_overlay(&self, corners: &[Point; 4], style: &OverlayStyle) {
        if style.stroke.is_clear() {
            return;
        }
        debug!(
            top_left = %corners[0],
            top_right = %corners[1],
            bottom_right = %corners[2],
            bottom_left = %corners[3],
            "document outline"
        );
    }
}

/// Hint presenter that logs each change of guidance exactly once.
#[derive(Default)]
struct ConsoleHints {
    last: Mutex<Option<ScanHint>>,
}

impl HintPresenter for ConsoleHints {
    fn show_hint(&self, hint: ScanHint) {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *last != Some(hint) {
            info!(hint = %hint, "guidance");
            *last = Some(hint);
        }
    }
}

/// Capture sink that wakes the feed loop so the demo can stop.
struct TriggerSink {
    captured: Arc<Notify>,
}

impl CaptureSink for TriggerSink {
    fn on_capture_triggered(&self) {
        info!("still image captured");
        self.captured.notify_one();
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("ScanWerk demo starting");

    let captured = Arc::new(Notify::new());
    let overlay = Arc::new(LogOverlay);
    let hints = Arc::new(ConsoleHints::default());
    let sink = Arc::new(TriggerSink {
        captured: Arc::clone(&captured),
    });

    let config = ScanConfig::default();
    let mut pipeline = FramePipeline::spawn(&config, overlay, hints, sink);

    let mut camera = SyntheticCamera::new();
    let mut cadence = time::interval(FRAME_PERIOD);
    let mut submitted = 0u32;

    loop {
        if submitted >= FRAME_BUDGET {
            warn!(submitted, "frame budget exhausted before a capture");
            break;
        }
        tokio::select! {
            _ = captured.notified() => {
                info!(submitted, "capture fired, stopping the feed");
                break;
            }
            _ = cadence.tick() => {
                pipeline.submit(camera.next_frame()?)?;
                submitted += 1;
            }
        }
    }

    pipeline.shutdown().await?;
    info!(
        submitted,
        replaced = pipeline.replaced_frames(),
        "demo finished"
    );
    Ok(())
}
