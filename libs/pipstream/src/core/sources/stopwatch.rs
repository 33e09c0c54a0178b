// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;
use std::time::Duration;

use super::{ContentSize, RasterContent};
use crate::core::clocks::{Clock, HostClock};
use crate::core::render::{Canvas, Color};

/// Elapsed-time readout (`MM:SS.cc`).
///
/// `start()` after `stop()` resumes from the accumulated elapsed time. Only
/// [`Stopwatch::reset`] clears it.
pub struct Stopwatch {
    clock: Arc<dyn Clock>,
    size: ContentSize,
    accumulated: Duration,
    running_since_ns: Option<i64>,
    text: String,
}

impl Stopwatch {
    pub fn new(size: ContentSize) -> Self {
        Self::with_clock(size, Arc::new(HostClock::new()))
    }

    pub fn with_clock(size: ContentSize, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            size,
            accumulated: Duration::ZERO,
            running_since_ns: None,
            text: String::with_capacity(8),
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self.running_since_ns {
            Some(since) => {
                let delta = (self.clock.now_ns() - since).max(0) as u64;
                self.accumulated + Duration::from_nanos(delta)
            }
            None => self.accumulated,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since_ns.is_some()
    }

    /// Zero the elapsed time. A running stopwatch keeps running from zero.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        if self.running_since_ns.is_some() {
            self.running_since_ns = Some(self.clock.now_ns());
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn write_readout(out: &mut String, elapsed: Duration) {
        use std::fmt::Write;
        let centis = elapsed.as_millis() / 10;
        let minutes = centis / 6000;
        let seconds = (centis / 100) % 60;
        out.clear();
        let _ = write!(out, "{:02}:{:02}.{:02}", minutes, seconds, centis % 100);
    }
}

impl RasterContent for Stopwatch {
    fn kind(&self) -> &'static str {
        "stopwatch"
    }

    fn preferred_frame_rate(&self) -> u32 {
        30
    }

    fn start(&mut self) {
        if self.running_since_ns.is_none() {
            self.running_since_ns = Some(self.clock.now_ns());
        }
    }

    fn stop(&mut self) {
        self.accumulated = self.elapsed();
        self.running_since_ns = None;
    }

    fn layout(&mut self) {
        let elapsed = self.elapsed();
        Self::write_readout(&mut self.text, elapsed);
    }

    fn bounds(&self) -> ContentSize {
        self.size
    }

    fn draw(&self, canvas: &mut Canvas<'_>) {
        canvas.clear(Color::BLACK);
        canvas.draw_text_centered(&self.text, 0.8, Color::rgb(255, 196, 0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clocks::ManualClock;

    fn stopwatch() -> (Arc<ManualClock>, Stopwatch) {
        let clock = Arc::new(ManualClock::new(0));
        let watch = Stopwatch::with_clock(ContentSize::new(160.0, 90.0), clock.clone());
        (clock, watch)
    }

    #[test]
    fn test_restart_resumes_accumulated_time() {
        let (clock, mut watch) = stopwatch();
        watch.start();
        clock.advance(Duration::from_millis(1500));
        watch.stop();

        clock.advance(Duration::from_secs(10));
        assert_eq!(watch.elapsed(), Duration::from_millis(1500));

        watch.start();
        clock.advance(Duration::from_millis(500));
        assert_eq!(watch.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn test_start_is_idempotent() {
        let (clock, mut watch) = stopwatch();
        watch.start();
        clock.advance(Duration::from_secs(1));
        watch.start();
        clock.advance(Duration::from_secs(1));
        assert_eq!(watch.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn test_reset_and_layout() {
        let (clock, mut watch) = stopwatch();
        watch.start();
        clock.advance(Duration::from_millis(61_230));
        watch.layout();
        assert_eq!(watch.text(), "01:01.23");

        watch.reset();
        clock.advance(Duration::from_millis(40));
        watch.layout();
        assert_eq!(watch.text(), "00:00.04");
    }
}
