// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Usage sessions recorded around stream start and stop.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use pipstream::{
    Canvas, ClockFace, ContentSize, FrameSource, ManualClock, MemoryDisplaySink, OpenSession,
    PipelineConfig, RasterContent, SessionRecord, StreamPipeline, UsageTracker,
};

struct Blank;

impl RasterContent for Blank {
    fn kind(&self) -> &'static str {
        "blank"
    }

    fn layout(&mut self) {}

    fn bounds(&self) -> ContentSize {
        ContentSize::new(8.0, 8.0)
    }

    fn draw(&self, _canvas: &mut Canvas<'_>) {}
}

fn pipeline(usage: Arc<UsageTracker>) -> StreamPipeline {
    let mut pipeline =
        StreamPipeline::with_clock(PipelineConfig::default(), Arc::new(ManualClock::new(0)))
            .unwrap()
            .with_observer(usage);
    pipeline.bind(Arc::new(MemoryDisplaySink::new()));
    pipeline
}

#[test]
fn test_each_stream_is_one_session() {
    let usage = Arc::new(UsageTracker::new());
    let mut pipeline = pipeline(usage.clone());

    pipeline.start(FrameSource::rasterizable(Blank), 30).unwrap();
    assert_eq!(usage.open_session().unwrap().provider, "blank");
    pipeline.stop();
    assert!(usage.open_session().is_none());

    pipeline
        .start(
            FrameSource::rasterizable(ClockFace::new(ContentSize::new(120.0, 40.0))),
            4,
        )
        .unwrap();
    // Switching sources closes the running session first.
    pipeline.start(FrameSource::rasterizable(Blank), 30).unwrap();
    drop(pipeline);

    let providers: Vec<String> = usage.records().into_iter().map(|r| r.provider).collect();
    assert_eq!(providers, vec!["blank", "clock", "blank"]);
    assert!(usage.records().iter().all(|r| r.duration_ms >= 0 && !r.recovered));
}

#[test]
fn test_stop_without_start_records_nothing() {
    let usage = Arc::new(UsageTracker::new());
    let mut pipeline = pipeline(usage.clone());
    assert!(pipeline.stop().is_none());
    assert!(usage.records().is_empty());
}

#[test]
fn test_unterminated_session_is_recovered_at_next_launch() {
    let started_at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let tracker = UsageTracker::with_unterminated(OpenSession {
        provider: "camera".into(),
        started_at,
    });

    let relaunch = started_at + Duration::minutes(5);
    let record = tracker.recover_unterminated(relaunch).unwrap();
    assert!(record.recovered);
    assert_eq!(record.duration_ms, 5 * 60 * 1000);
    assert!(tracker.recover_unterminated(relaunch).is_none());
    assert_eq!(tracker.total_ms("camera"), 300_000);
}

#[test]
fn test_sessions_survive_json_round_trip() {
    let tracker = UsageTracker::new();
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    tracker.start_at("playback", start);
    tracker.stop_at("playback", start + Duration::seconds(42));

    let json = tracker.to_json().unwrap();
    let restored: Vec<SessionRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, tracker.records());
    assert_eq!(restored[0].duration_ms, 42_000);
}
