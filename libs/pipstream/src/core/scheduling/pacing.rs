// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Frame-rate limiting independent of the trigger's native rate.

use std::time::Duration;

use crate::core::sources::{MAX_FRAME_RATE, MIN_FRAME_RATE};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Mutable pacing state. Only the pacing controller touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingState {
    pub interval_ns: i64,
    pub last_emit_ns: Option<i64>,
    pub frame_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Too early, or not running. Nothing changed.
    Skip,
    /// Produce a frame for this tick.
    Emit { frame_number: u64 },
}

/// `Stopped -> start(rate) -> Running -> stop() -> Stopped`.
#[derive(Debug)]
pub struct PacingController {
    state: Option<PacingState>,
    frame_rate: u32,
    jitter_tolerance_ns: i64,
}

impl PacingController {
    /// `jitter_tolerance` absorbs trigger jitter: a tick that lands slightly
    /// before the interval boundary still emits.
    pub fn new(jitter_tolerance: Duration) -> Self {
        Self {
            state: None,
            frame_rate: 0,
            jitter_tolerance_ns: jitter_tolerance.as_nanos() as i64,
        }
    }

    pub fn clamp_rate(frame_rate: u32) -> u32 {
        frame_rate.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE)
    }

    pub fn interval_for(frame_rate: u32) -> i64 {
        NANOS_PER_SECOND / Self::clamp_rate(frame_rate) as i64
    }

    /// Enter Running at `frame_rate` (clamped to 1..=60). The next tick emits.
    /// Returns the effective rate.
    pub fn start(&mut self, frame_rate: u32) -> u32 {
        let rate = Self::clamp_rate(frame_rate);
        if rate != frame_rate {
            tracing::debug!("PacingController: clamped {} fps to {}", frame_rate, rate);
        }
        self.frame_rate = rate;
        self.state = Some(PacingState {
            interval_ns: Self::interval_for(rate),
            last_emit_ns: None,
            frame_count: 0,
        });
        rate
    }

    /// Change the rate while keeping the last emission time, so a rate change
    /// never causes an immediate burst.
    pub fn set_frame_rate(&mut self, frame_rate: u32) -> u32 {
        let rate = Self::clamp_rate(frame_rate);
        self.frame_rate = rate;
        if let Some(state) = &mut self.state {
            state.interval_ns = Self::interval_for(rate);
        }
        rate
    }

    /// Let the next tick emit regardless of the interval. Frame count and
    /// rate are kept.
    pub fn rearm(&mut self) {
        if let Some(state) = &mut self.state {
            state.last_emit_ns = None;
        }
    }

    pub fn tick(&mut self, tick_ns: i64) -> TickDecision {
        let Some(state) = &mut self.state else {
            return TickDecision::Skip;
        };

        if let Some(last) = state.last_emit_ns {
            let elapsed = tick_ns - last;
            if elapsed + self.jitter_tolerance_ns < state.interval_ns {
                return TickDecision::Skip;
            }
        }

        state.last_emit_ns = Some(tick_ns);
        let frame_number = state.frame_count;
        state.frame_count += 1;
        TickDecision::Emit { frame_number }
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        if let Some(state) = self.state.take() {
            tracing::debug!("PacingController: stopped after {} frames", state.frame_count);
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_some()
    }

    /// Effective frame rate, kept across stop so a restart can reuse it.
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn state(&self) -> Option<&PacingState> {
        self.state.as_ref()
    }

    pub fn jitter_tolerance(&self) -> Duration {
        Duration::from_nanos(self.jitter_tolerance_ns as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: i64 = 1_000_000;

    fn pacing() -> PacingController {
        PacingController::new(Duration::from_millis(2))
    }

    #[test]
    fn test_stopped_controller_skips() {
        let mut pacing = pacing();
        assert_eq!(pacing.tick(0), TickDecision::Skip);
        assert!(!pacing.is_running());
    }

    #[test]
    fn test_first_tick_emits_then_limits() {
        let mut pacing = pacing();
        pacing.start(10);

        assert_eq!(pacing.tick(0), TickDecision::Emit { frame_number: 0 });
        assert_eq!(pacing.tick(50 * MS), TickDecision::Skip);
        assert_eq!(pacing.tick(97 * MS), TickDecision::Skip);
        assert_eq!(pacing.tick(99 * MS), TickDecision::Emit { frame_number: 1 });
    }

    #[test]
    fn test_skip_leaves_state_untouched() {
        let mut pacing = pacing();
        pacing.start(30);
        pacing.tick(1_000);
        let before = *pacing.state().unwrap();
        pacing.tick(1_000 + 5 * MS);
        assert_eq!(*pacing.state().unwrap(), before);
    }

    #[test]
    fn test_rate_is_clamped() {
        let mut pacing = pacing();
        assert_eq!(pacing.start(0), 1);
        assert_eq!(pacing.state().unwrap().interval_ns, 1_000_000_000);
        assert_eq!(pacing.start(120), 60);
        assert_eq!(pacing.state().unwrap().interval_ns, 16_666_666);
    }

    #[test]
    fn test_sixty_hz_trigger_at_ten_fps() {
        let mut pacing = pacing();
        pacing.start(10);
        let period = 1_000_000_000 / 60;
        let emitted = (0..180)
            .filter(|i| matches!(pacing.tick(i * period), TickDecision::Emit { .. }))
            .count();
        assert_eq!(emitted, 30);
    }

    #[test]
    fn test_stop_is_idempotent_and_keeps_rate() {
        let mut pacing = pacing();
        pacing.start(24);
        pacing.stop();
        pacing.stop();
        assert!(!pacing.is_running());
        assert_eq!(pacing.frame_rate(), 24);
    }

    #[test]
    fn test_rearm_emits_on_next_tick() {
        let mut pacing = pacing();
        pacing.start(1);
        pacing.tick(0);
        assert_eq!(pacing.tick(10 * MS), TickDecision::Skip);
        pacing.rearm();
        assert_eq!(pacing.tick(20 * MS), TickDecision::Emit { frame_number: 1 });
    }

    #[test]
    fn test_set_frame_rate_keeps_last_emit() {
        let mut pacing = pacing();
        pacing.start(10);
        pacing.tick(0);
        pacing.set_frame_rate(20);
        assert_eq!(pacing.tick(30 * MS), TickDecision::Skip);
        assert_eq!(pacing.tick(50 * MS), TickDecision::Emit { frame_number: 1 });
    }
}
