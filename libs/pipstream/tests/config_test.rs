// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Loading `pipstream.yaml` from disk.

use std::fs;

use pipstream::{PipelineConfig, StreamError, StreamPipeline};
use tempfile::TempDir;

fn write_config(dir: &TempDir, yaml: &str) {
    fs::write(dir.path().join(PipelineConfig::FILE_NAME), yaml).unwrap();
}

#[test]
fn test_load_full_config() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "frame_rate: 24\n\
         scale_factor: 3.0\n\
         pool_capacity: 4\n\
         jitter_tolerance_ms: 1.5\n\
         display_refresh_hz: 120.0\n",
    );

    let config = PipelineConfig::load(dir.path()).unwrap();
    assert_eq!(config.frame_rate, 24);
    assert_eq!(config.scale_factor, 3.0);
    assert_eq!(config.pool_capacity, 4);
    assert_eq!(config.jitter_tolerance().as_micros(), 1_500);
    assert_eq!(config.display_refresh_hz, 120.0);
}

#[test]
fn test_missing_file_is_an_error_for_load_only() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        PipelineConfig::load(dir.path()),
        Err(StreamError::Configuration(_))
    ));
    assert_eq!(
        PipelineConfig::load_or_default(dir.path()),
        PipelineConfig::default()
    );
}

#[test]
fn test_invalid_values_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "frame_rate: 0\n");
    assert!(matches!(
        PipelineConfig::load(dir.path()),
        Err(StreamError::Configuration(_))
    ));
    assert_eq!(
        PipelineConfig::load_or_default(dir.path()),
        PipelineConfig::default()
    );

    write_config(&dir, "pool_capacity: [1, 2\n");
    assert!(PipelineConfig::load(dir.path()).is_err());
}

#[test]
fn test_pipeline_rejects_invalid_config() {
    let config = PipelineConfig {
        pool_capacity: 1,
        ..Default::default()
    };
    assert!(matches!(
        StreamPipeline::new(config),
        Err(StreamError::Configuration(_))
    ));
}

#[test]
fn test_scale_factor_from_config_drives_buffer_size() {
    use std::sync::Arc;

    use pipstream::{
        Canvas, ContentSize, FrameSource, ManualClock, MemoryDisplaySink, RasterContent,
    };

    struct Card;

    impl RasterContent for Card {
        fn kind(&self) -> &'static str {
            "card"
        }
        fn layout(&mut self) {}
        fn bounds(&self) -> ContentSize {
            ContentSize::new(200.0, 100.0)
        }
        fn draw(&self, _canvas: &mut Canvas<'_>) {}
    }

    let dir = TempDir::new().unwrap();
    write_config(&dir, "scale_factor: 3.0\n");
    let config = PipelineConfig::load(dir.path()).unwrap();

    let mut pipeline =
        StreamPipeline::with_clock(config, Arc::new(ManualClock::new(0))).unwrap();
    let sink = Arc::new(MemoryDisplaySink::new());
    pipeline.bind(sink.clone());
    pipeline.start(FrameSource::rasterizable(Card), 30).unwrap();
    pipeline.tick(0);

    let record = sink.last_record().unwrap();
    assert_eq!((record.buffer.width, record.buffer.height), (600, 300));
}
