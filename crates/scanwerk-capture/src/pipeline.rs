// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Asynchronous frame pipeline -- one worker task turns submitted camera
// frames into overlay drawing, hints and the debounced capture trigger.
//
// Producers hand frames to a single-slot mailbox; a frame that arrives
// before its predecessor was processed replaces it. The worker serializes
// detection, classification and debouncing, so bridge implementations see
// results in frame order and the countdown state never needs a lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, Interval};
use tracing::{debug, info};

use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::ScanHint;
use scanwerk_vision::{DetectionMetrics, DocumentDetector, Frame, classify};

use crate::bridge::{CaptureSink, HintPresenter, OverlayRenderer};
use crate::debounce::{CaptureDebouncer, DebounceAction};

// ---------------------------------------------------------------------------
// Frame slot
// ---------------------------------------------------------------------------

/// Single-slot latest-wins mailbox between producers and the worker.
#[derive(Default)]
struct FrameSlot {
    /// The pending frame, if any.
    frame: Mutex<Option<Frame>>,
    /// Wakes the worker when a frame lands in the slot.
    notify: Notify,
    /// Total frames replaced before the worker got to them.
    replaced: AtomicU64,
}

impl FrameSlot {
    /// Store a frame, returning `true` if an unprocessed one was replaced.
    fn put(&self, frame: Frame) -> bool {
        let mut guard = match self.frame.lock() {
            Ok(guard) => guard,
            // The critical section is a plain swap and cannot panic, so a
            // poisoned lock still holds a usable Option.
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.replace(frame).is_some()
    }

    fn take(&self) -> Option<Frame> {
        let mut guard = match self.frame.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take()
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// State owned by the worker task. Single-writer by construction; nothing
/// here needs synchronization.
struct Worker {
    detector: DocumentDetector,
    debouncer: CaptureDebouncer,
    /// Armed only while the debouncer is counting.
    ticker: Option<Interval>,
    tick_period: Duration,
    overlay: Arc<dyn OverlayRenderer>,
    presenter: Arc<dyn HintPresenter>,
    sink: Arc<dyn CaptureSink>,
}

impl Worker {
    /// Run until the shutdown signal arrives.
    ///
    /// One frame per pass: a due countdown tick gets its own pass even
    /// while submissions arrive faster than frames can be processed, so a
    /// saturated slot never stalls the clock.
    async fn run(mut self, slot: Arc<FrameSlot>, shutdown: Arc<Notify>) {
        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    debug!("frame pipeline received shutdown signal");
                    break;
                }

                // `notify_one` stores a permit, so a frame submitted while
                // the worker is mid-pass is picked up on the next one.
                _ = slot.notify.notified() => {
                    if let Some(frame) = slot.take() {
                        self.process_frame(&frame);
                    }
                }

                _ = Self::next_tick(self.ticker.as_mut()), if self.ticker.is_some() => {
                    self.on_tick();
                }
            }
        }
    }

    /// One full pass over a frame: clear the overlay, detect, classify,
    /// feed the debouncer, then present.
    fn process_frame(&mut self, frame: &Frame) {
        self.overlay.clear_overlay();

        let Some(quad) = self.detector.detect(frame) else {
            // A vanished outline is not a framing verdict; a running
            // countdown keeps its clock and only the message is cleared.
            self.presenter.show_hint(ScanHint::NoMessage);
            return;
        };

        let metrics = DetectionMetrics::new(&quad, frame.width(), frame.height());
        let hint = classify(&metrics);

        match self.debouncer.observe(hint) {
            DebounceAction::Started => self.arm_ticker(),
            DebounceAction::Canceled => self.ticker = None,
            _ => {}
        }

        self.presenter.show_hint(hint);
        self.overlay.draw_overlay(quad.corners(), &hint.overlay_style());
    }

    /// Advance the countdown by one period and act on the outcome.
    fn on_tick(&mut self) {
        match self.debouncer.tick() {
            DebounceAction::Fire => {
                self.sink.on_capture_triggered();
                self.presenter.show_hint(ScanHint::Captured);
            }
            DebounceAction::Completed => self.ticker = None,
            _ => {}
        }
    }

    fn arm_ticker(&mut self) {
        // interval_at so the first tick lands one full period out instead
        // of immediately. Ticks delayed behind a slow frame are delivered
        // back to back, which keeps the countdown's elapsed total on the
        // wall clock.
        let start = time::Instant::now() + self.tick_period;
        let mut ticker = time::interval_at(start, self.tick_period);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Burst);
        self.ticker = Some(ticker);
    }

    /// Await the next tick, or forever when no interval is armed. The
    /// select arm guards on `is_some`, so the pending branch is never
    /// polled in practice.
    async fn next_tick(ticker: Option<&mut Interval>) {
        match ticker {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

// ---------------------------------------------------------------------------
// FramePipeline
// ---------------------------------------------------------------------------

/// Handle to the running capture pipeline.
///
/// `submit` may be called from any thread; everything else the pipeline
/// does happens on its single worker task.
pub struct FramePipeline {
    slot: Arc<FrameSlot>,
    shutdown: Arc<Notify>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl FramePipeline {
    /// Spawn the worker task and return the pipeline handle.
    pub fn spawn(
        config: &ScanConfig,
        overlay: Arc<dyn OverlayRenderer>,
        presenter: Arc<dyn HintPresenter>,
        sink: Arc<dyn CaptureSink>,
    ) -> Self {
        let slot = Arc::new(FrameSlot::default());
        let shutdown = Arc::new(Notify::new());

        let worker = Worker {
            detector: DocumentDetector::new(config),
            debouncer: CaptureDebouncer::new(config),
            ticker: None,
            tick_period: config.tick(),
            overlay,
            presenter,
            sink,
        };

        info!(
            countdown_ms = config.countdown_ms,
            tick_ms = config.tick_ms,
            "frame pipeline started"
        );

        let handle = tokio::spawn(worker.run(Arc::clone(&slot), Arc::clone(&shutdown)));

        Self {
            slot,
            shutdown,
            running: Arc::new(AtomicBool::new(true)),
            worker: Some(handle),
        }
    }

    /// Offer one frame to the worker. Never blocks on processing: if the
    /// previous frame is still unprocessed it is replaced and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::PipelineStopped`] after [`shutdown`](Self::shutdown).
    pub fn submit(&self, frame: Frame) -> Result<()> {
        if !self.running.load(Ordering::Acquire) {
            return Err(ScanError::PipelineStopped);
        }

        if self.slot.put(frame) {
            let dropped = self.slot.replaced.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(dropped, "unprocessed frame replaced");
        }
        self.slot.notify.notify_one();
        Ok(())
    }

    /// Total frames that were replaced in the slot before processing.
    pub fn replaced_frames(&self) -> u64 {
        self.slot.replaced.load(Ordering::Relaxed)
    }

    /// Stop the worker and await its completion. Idempotent.
    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.running.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        info!("stopping frame pipeline");
        self.shutdown.notify_one();

        if let Some(handle) = self.worker.take() {
            handle
                .await
                .map_err(|e| ScanError::WorkerJoin(e.to_string()))?;
        }

        info!("frame pipeline stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;
    use scanwerk_core::types::{OverlayStyle, Point};
    use std::sync::atomic::AtomicU32;

    /// Implements all three bridges and records every call.
    #[derive(Default)]
    struct RecordingBridge {
        clears: AtomicU32,
        draws: Mutex<Vec<OverlayStyle>>,
        hints: Mutex<Vec<ScanHint>>,
        captures: AtomicU32,
        /// Blocks every frame pass for this long, so a test can make
        /// processing slower than the submission cadence.
        stall: Duration,
    }

    impl OverlayRenderer for RecordingBridge {
        fn clear_overlay(&self) {
            if !self.stall.is_zero() {
                std::thread::sleep(self.stall);
            }
            self.clears.fetch_add(1, Ordering::Relaxed);
        }

        fn draw_overlay(&self, _corners: &[Point; 4], style: &OverlayStyle) {
            self.draws.lock().unwrap().push(*style);
        }
    }

    impl HintPresenter for RecordingBridge {
        fn show_hint(&self, hint: ScanHint) {
            self.hints.lock().unwrap().push(hint);
        }
    }

    impl CaptureSink for RecordingBridge {
        fn on_capture_triggered(&self) {
            self.captures.fetch_add(1, Ordering::Relaxed);
        }
    }

    impl RecordingBridge {
        fn hints(&self) -> Vec<ScanHint> {
            self.hints.lock().unwrap().clone()
        }

        fn captures(&self) -> u32 {
            self.captures.load(Ordering::Relaxed)
        }
    }

    fn spawn_pipeline() -> (FramePipeline, Arc<RecordingBridge>) {
        spawn_pipeline_with(RecordingBridge::default())
    }

    fn spawn_pipeline_with(bridge: RecordingBridge) -> (FramePipeline, Arc<RecordingBridge>) {
        let bridge = Arc::new(bridge);
        let pipeline = FramePipeline::spawn(
            &ScanConfig::default(),
            Arc::clone(&bridge) as Arc<dyn OverlayRenderer>,
            Arc::clone(&bridge) as Arc<dyn HintPresenter>,
            Arc::clone(&bridge) as Arc<dyn CaptureSink>,
        );
        (pipeline, bridge)
    }

    /// A 640x480 frame with a bright rectangle on black.
    fn frame_with_rect(x: i32, y: i32, w: u32, h: u32) -> Frame {
        let mut img = RgbImage::new(640, 480);
        draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(w, h), Rgb([255, 255, 255]));
        Frame::from_image(img).unwrap()
    }

    /// Half the frame, centred, square: classifies as CapturingImage.
    fn steady_frame() -> Frame {
        frame_with_rect(80, 80, 480, 320)
    }

    /// Small and clear of the borders: classifies as MoveCloser.
    fn distant_frame() -> Frame {
        frame_with_rect(190, 110, 260, 260)
    }

    /// Nothing to detect.
    fn empty_frame() -> Frame {
        Frame::from_image(RgbImage::new(640, 480)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn steady_stream_triggers_exactly_one_capture() {
        let (mut pipeline, bridge) = spawn_pipeline();

        // Twelve steady frames, 100 ms apart: one countdown, one trigger.
        for _ in 0..12 {
            pipeline.submit(steady_frame()).unwrap();
            time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(bridge.captures(), 1);
        let hints = bridge.hints();
        assert!(hints.contains(&ScanHint::CapturingImage));
        assert!(hints.contains(&ScanHint::Captured));

        pipeline.shutdown().await.unwrap();
    }

    // Real time rather than the paused clock: the regime under test is
    // frames arriving faster than they can be processed, and a
    // synchronous frame pass consumes no virtual time at all.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn capture_fires_while_frames_outpace_processing() {
        let (mut pipeline, bridge) = spawn_pipeline_with(RecordingBridge {
            stall: Duration::from_millis(25),
            ..RecordingBridge::default()
        });

        // Five submissions per frame pass. The trigger point sits 600 ms
        // into the countdown, so two seconds is ample headroom.
        let deadline = time::Instant::now() + Duration::from_secs(2);
        while time::Instant::now() < deadline && bridge.captures() == 0 {
            pipeline.submit(steady_frame()).unwrap();
            time::sleep(Duration::from_millis(5)).await;
        }

        // The slot really was saturated, and the countdown still ran.
        assert!(pipeline.replaced_frames() > 0);
        assert_eq!(bridge.captures(), 1);

        pipeline.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn lost_outline_does_not_cancel_countdown() {
        let (mut pipeline, bridge) = spawn_pipeline();

        pipeline.submit(steady_frame()).unwrap();
        time::sleep(Duration::from_millis(300)).await;

        // The outline vanishes mid-countdown; the clock keeps running.
        pipeline.submit(empty_frame()).unwrap();
        time::sleep(Duration::from_millis(700)).await;

        assert_eq!(bridge.captures(), 1);
        let hints = bridge.hints();
        assert!(hints.contains(&ScanHint::NoMessage));
        assert!(hints.contains(&ScanHint::Captured));

        pipeline.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn unsteady_frame_cancels_countdown() {
        let (mut pipeline, bridge) = spawn_pipeline();

        pipeline.submit(steady_frame()).unwrap();
        time::sleep(Duration::from_millis(300)).await;

        // The document moves away before the trigger point at 600 ms.
        pipeline.submit(distant_frame()).unwrap();
        time::sleep(Duration::from_millis(1_700)).await;

        assert_eq!(bridge.captures(), 0);
        assert!(bridge.hints().contains(&ScanHint::MoveCloser));

        pipeline.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn newest_frame_replaces_unprocessed_one() {
        let (mut pipeline, bridge) = spawn_pipeline();

        // Both submitted before the worker gets a chance to run; only the
        // second is ever processed.
        pipeline.submit(distant_frame()).unwrap();
        pipeline.submit(steady_frame()).unwrap();
        time::sleep(Duration::from_millis(10)).await;

        assert_eq!(pipeline.replaced_frames(), 1);
        assert_eq!(bridge.hints(), vec![ScanHint::CapturingImage]);

        pipeline.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn overlay_cleared_even_without_detection() {
        let (mut pipeline, bridge) = spawn_pipeline();

        pipeline.submit(steady_frame()).unwrap();
        time::sleep(Duration::from_millis(10)).await;
        pipeline.submit(empty_frame()).unwrap();
        time::sleep(Duration::from_millis(10)).await;

        assert_eq!(bridge.clears.load(Ordering::Relaxed), 2);
        // Only the detected frame drew an outline.
        assert_eq!(bridge.draws.lock().unwrap().len(), 1);
        assert_eq!(
            bridge.hints(),
            vec![ScanHint::CapturingImage, ScanHint::NoMessage]
        );

        pipeline.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn submit_after_shutdown_is_rejected() {
        let (mut pipeline, _bridge) = spawn_pipeline();

        pipeline.shutdown().await.unwrap();
        // A second shutdown is harmless.
        pipeline.shutdown().await.unwrap();

        let err = pipeline.submit(empty_frame()).unwrap_err();
        assert!(matches!(err, ScanError::PipelineStopped));
    }
}
