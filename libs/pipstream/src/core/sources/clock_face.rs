// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use chrono::{Local, NaiveTime};

use super::{ContentSize, RasterContent};
use crate::core::render::{Canvas, Color};

type TimeSource = Box<dyn Fn() -> NaiveTime + Send>;

/// Wall-clock readout (`HH:MM:SS`, local time).
///
/// Stateless across restarts: every layout reads the current time.
pub struct ClockFace {
    size: ContentSize,
    foreground: Color,
    background: Color,
    now: TimeSource,
    text: String,
}

impl ClockFace {
    pub fn new(size: ContentSize) -> Self {
        Self::with_time_source(size, Box::new(|| Local::now().time()))
    }

    /// Clock face reading time from `now` instead of the system clock.
    pub fn with_time_source(size: ContentSize, now: TimeSource) -> Self {
        Self {
            size,
            foreground: Color::WHITE,
            background: Color::BLACK,
            now,
            text: String::with_capacity(8),
        }
    }

    pub fn with_colors(mut self, foreground: Color, background: Color) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }

    pub fn resize(&mut self, size: ContentSize) {
        self.size = size;
    }

    /// Text drawn by the last layout pass.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl RasterContent for ClockFace {
    fn kind(&self) -> &'static str {
        "clock"
    }

    fn preferred_frame_rate(&self) -> u32 {
        // Seconds resolution; a few frames per second keeps the tick edge crisp.
        4
    }

    fn layout(&mut self) {
        use std::fmt::Write;
        self.text.clear();
        let _ = write!(self.text, "{}", (self.now)().format("%H:%M:%S"));
    }

    fn bounds(&self) -> ContentSize {
        self.size
    }

    fn draw(&self, canvas: &mut Canvas<'_>) {
        canvas.clear(self.background);
        canvas.draw_text_centered(&self.text, 0.8, self.foreground);
    }
}
