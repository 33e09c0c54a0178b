// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Frame pacing across the whole supported rate range, driven by a simulated
//! 60 Hz display link on a manual clock.

use std::sync::Arc;

use pipstream::{
    Canvas, Color, ContentSize, FrameSource, ManualClock, MemoryDisplaySink, PacingController,
    PipelineConfig, RasterContent, StreamPipeline, TickOutcome,
};

const REFRESH_HZ: i64 = 60;
const START_NS: i64 = 5_000_000;

struct Checker;

impl RasterContent for Checker {
    fn kind(&self) -> &'static str {
        "checker"
    }

    fn layout(&mut self) {}

    fn bounds(&self) -> ContentSize {
        ContentSize::new(16.0, 16.0)
    }

    fn draw(&self, canvas: &mut Canvas<'_>) {
        canvas.clear(Color::BLACK);
    }
}

fn tick_time(index: i64) -> i64 {
    START_NS + index * 1_000_000_000 / REFRESH_HZ
}

/// Run `seconds` of display-link ticks at `rate` and return what reached the
/// surface.
fn stream_at(rate: u32, seconds: i64) -> (u32, Vec<i64>) {
    let clock = Arc::new(ManualClock::new(START_NS));
    let mut pipeline =
        StreamPipeline::with_clock(PipelineConfig::default(), clock.clone()).unwrap();
    let sink = Arc::new(MemoryDisplaySink::new());
    pipeline.bind(sink.clone());

    pipeline.start(FrameSource::rasterizable(Checker), rate).unwrap();
    let effective = pipeline.stats().frame_rate;

    for index in 0..seconds * REFRESH_HZ {
        let now = tick_time(index);
        clock.set_ns(now);
        pipeline.tick(now);
    }
    pipeline.stop();
    (effective, sink.presentation_times())
}

#[test]
fn test_presentation_deltas_respect_interval_at_every_rate() {
    let tolerance = PipelineConfig::default().jitter_tolerance().as_nanos() as i64;

    for rate in 1..=60 {
        let (effective, times) = stream_at(rate, 2);
        assert_eq!(effective, rate);
        assert!(!times.is_empty(), "{} fps produced no frames", rate);

        let interval = PacingController::interval_for(rate);
        for pair in times.windows(2) {
            let delta = pair[1] - pair[0];
            assert!(
                delta >= interval - tolerance,
                "{} fps: delta {}ns below interval {}ns",
                rate,
                delta,
                interval
            );
        }
        let max_frames = 2_000_000_000 / (interval - tolerance) + 1;
        assert!(
            times.len() as i64 <= max_frames,
            "{} fps: {} frames in 2s",
            rate,
            times.len()
        );
    }
}

#[test]
fn test_ten_fps_on_sixty_hz_link_emits_every_sixth_tick() {
    let (_, times) = stream_at(10, 3);
    assert_eq!(times.len(), 30);
    assert_eq!(times[0], START_NS);
    assert_eq!(times[1], tick_time(6));
}

#[test]
fn test_sixty_fps_emits_on_every_tick() {
    let (_, times) = stream_at(60, 1);
    assert_eq!(times.len(), 60);
}

#[test]
fn test_out_of_range_rates_are_clamped() {
    assert_eq!(stream_at(0, 1).0, 1);
    assert_eq!(stream_at(240, 1).0, 60);
}

#[test]
fn test_rate_change_takes_effect_without_restart() {
    let clock = Arc::new(ManualClock::new(START_NS));
    let mut pipeline =
        StreamPipeline::with_clock(PipelineConfig::default(), clock.clone()).unwrap();
    let sink = Arc::new(MemoryDisplaySink::new());
    pipeline.bind(sink.clone());
    pipeline.start(FrameSource::rasterizable(Checker), 5).unwrap();

    let mut emitted = 0;
    for index in 0..60 {
        let now = tick_time(index);
        clock.set_ns(now);
        if pipeline.tick(now) == TickOutcome::Emitted {
            emitted += 1;
        }
    }
    assert_eq!(emitted, 5);

    assert_eq!(pipeline.set_frame_rate(30), 30);
    assert_eq!(sink.preferred_frame_rate(), 30);
    emitted = 0;
    for index in 60..120 {
        let now = tick_time(index);
        clock.set_ns(now);
        if pipeline.tick(now) == TickOutcome::Emitted {
            emitted += 1;
        }
    }
    assert_eq!(emitted, 30);
}
