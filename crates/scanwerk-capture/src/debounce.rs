// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture debouncing with an explicit countdown state machine.
//
// A single steady frame is not enough to take a photo; the framing must
// hold for a full countdown, and any frame that classifies as anything
// other than "capturing" aborts it. The machine is passive: the pipeline
// worker owns the clock and feeds it verdicts and ticks.

use std::time::Duration;

use scanwerk_core::config::ScanConfig;
use scanwerk_core::types::ScanHint;
use tracing::{debug, info};

/// Countdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTimerState {
    /// No countdown pending. Steady framing starts one.
    Idle,
    /// Countdown running. `fired` records that the capture trigger has
    /// already been delivered for this instance.
    Counting { elapsed: Duration, fired: bool },
}

/// What the caller must do after feeding the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceAction {
    /// A countdown began; the worker arms its tick interval.
    Started,
    /// Nothing to do.
    Unchanged,
    /// A pending countdown was aborted; the worker disarms the interval.
    Canceled,
    /// The framing held long enough; trigger the capture now.
    Fire,
    /// The countdown ran its full course; the worker disarms the interval.
    Completed,
}

/// Debounces steady-framing verdicts into a single capture trigger.
pub struct CaptureDebouncer {
    state: CaptureTimerState,
    /// Full countdown length.
    countdown: Duration,
    /// How much `tick` advances the clock.
    tick: Duration,
}

impl Default for CaptureDebouncer {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl CaptureDebouncer {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            state: CaptureTimerState::Idle,
            countdown: config.countdown(),
            tick: config.tick(),
        }
    }

    /// Feed one classification verdict.
    ///
    /// A steady verdict starts a countdown when none is pending and leaves
    /// a running one untouched; the countdown never restarts mid-streak.
    /// Any other verdict aborts a pending countdown.
    pub fn observe(&mut self, hint: ScanHint) -> DebounceAction {
        match (hint, self.state) {
            (ScanHint::CapturingImage, CaptureTimerState::Idle) => {
                info!(countdown_ms = self.countdown.as_millis() as u64, "capture countdown started");
                self.state = CaptureTimerState::Counting {
                    elapsed: Duration::ZERO,
                    fired: false,
                };
                DebounceAction::Started
            }
            (ScanHint::CapturingImage, CaptureTimerState::Counting { .. }) => {
                DebounceAction::Unchanged
            }
            (_, CaptureTimerState::Counting { elapsed, .. }) => {
                debug!(hint = %hint, elapsed_ms = elapsed.as_millis() as u64, "capture countdown canceled");
                self.state = CaptureTimerState::Idle;
                DebounceAction::Canceled
            }
            (_, CaptureTimerState::Idle) => DebounceAction::Unchanged,
        }
    }

    /// Advance the countdown by one tick period.
    ///
    /// Returns `Fire` exactly once per countdown instance, on the first
    /// tick where the remaining time rounds to one second. Returns
    /// `Completed` when the countdown has fully elapsed.
    pub fn tick(&mut self) -> DebounceAction {
        let CaptureTimerState::Counting { elapsed, fired } = self.state else {
            return DebounceAction::Unchanged;
        };

        let elapsed = elapsed + self.tick;
        let remaining = self.countdown.saturating_sub(elapsed);

        if !fired && rounded_seconds(remaining) == 1 {
            info!(elapsed_ms = elapsed.as_millis() as u64, "capture trigger");
            self.state = CaptureTimerState::Counting { elapsed, fired: true };
            return DebounceAction::Fire;
        }

        if elapsed >= self.countdown {
            debug!("capture countdown completed");
            self.state = CaptureTimerState::Idle;
            return DebounceAction::Completed;
        }

        self.state = CaptureTimerState::Counting { elapsed, fired };
        DebounceAction::Unchanged
    }

    /// Abort any pending countdown. Callable while Idle; that is a no-op,
    /// which makes late cancels from the worker harmless.
    pub fn cancel(&mut self) {
        if self.state != CaptureTimerState::Idle {
            debug!("capture countdown canceled");
            self.state = CaptureTimerState::Idle;
        }
    }

    pub fn is_counting(&self) -> bool {
        matches!(self.state, CaptureTimerState::Counting { .. })
    }

    pub fn state(&self) -> CaptureTimerState {
        self.state
    }
}

/// Remaining time in whole seconds, rounded half away from zero.
fn rounded_seconds(remaining: Duration) -> u64 {
    (remaining.as_millis() as f64 / 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debouncer() -> CaptureDebouncer {
        CaptureDebouncer::default()
    }

    #[test]
    fn steady_framing_starts_countdown() {
        let mut d = debouncer();
        assert_eq!(d.observe(ScanHint::CapturingImage), DebounceAction::Started);
        assert!(d.is_counting());
    }

    #[test]
    fn countdown_does_not_restart_mid_streak() {
        let mut d = debouncer();
        d.observe(ScanHint::CapturingImage);
        for _ in 0..3 {
            d.tick();
        }
        // A fresh steady verdict must keep the accumulated elapsed time.
        assert_eq!(d.observe(ScanHint::CapturingImage), DebounceAction::Unchanged);
        assert_eq!(
            d.state(),
            CaptureTimerState::Counting {
                elapsed: Duration::from_millis(300),
                fired: false
            }
        );
    }

    #[test]
    fn any_other_hint_cancels() {
        let mut d = debouncer();
        d.observe(ScanHint::CapturingImage);
        d.tick();
        assert_eq!(d.observe(ScanHint::MoveCloser), DebounceAction::Canceled);
        assert!(!d.is_counting());
        // While idle, non-steady verdicts are inert.
        assert_eq!(d.observe(ScanHint::AdjustAngle), DebounceAction::Unchanged);
    }

    #[test]
    fn fires_exactly_once_then_completes() {
        let mut d = debouncer();
        d.observe(ScanHint::CapturingImage);

        let actions: Vec<DebounceAction> = (0..20).map(|_| d.tick()).collect();
        let fires = actions.iter().filter(|a| **a == DebounceAction::Fire).count();
        assert_eq!(fires, 1);
        // 2000 ms countdown, 100 ms ticks: remaining first rounds to one
        // second at 600 ms elapsed.
        assert_eq!(actions[5], DebounceAction::Fire);
        assert_eq!(actions[19], DebounceAction::Completed);
        assert!(!d.is_counting());
    }

    #[test]
    fn cancel_resets_the_clock() {
        let mut d = debouncer();
        d.observe(ScanHint::CapturingImage);
        for _ in 0..15 {
            d.tick();
        }
        d.cancel();

        // The next streak counts from zero: no fire before 600 ms.
        assert_eq!(d.observe(ScanHint::CapturingImage), DebounceAction::Started);
        for _ in 0..5 {
            assert_eq!(d.tick(), DebounceAction::Unchanged);
        }
        assert_eq!(d.tick(), DebounceAction::Fire);
    }

    #[test]
    fn cancel_while_idle_is_harmless() {
        let mut d = debouncer();
        d.cancel();
        d.cancel();
        assert_eq!(d.state(), CaptureTimerState::Idle);
    }

    #[test]
    fn tick_while_idle_is_inert() {
        let mut d = debouncer();
        assert_eq!(d.tick(), DebounceAction::Unchanged);
        assert_eq!(d.state(), CaptureTimerState::Idle);
    }

    #[test]
    fn short_countdown_rounds_half_away_from_zero() {
        // 1000 ms countdown, 500 ms ticks: after one tick 500 ms remain,
        // which rounds up to one second and fires.
        let config = ScanConfig {
            countdown_ms: 1_000,
            tick_ms: 500,
            ..ScanConfig::default()
        };
        let mut d = CaptureDebouncer::new(&config);
        d.observe(ScanHint::CapturingImage);
        assert_eq!(d.tick(), DebounceAction::Fire);
        assert_eq!(d.tick(), DebounceAction::Completed);
    }
}
