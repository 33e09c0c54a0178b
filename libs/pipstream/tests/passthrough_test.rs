// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Hardware-decoded sources: buffers reach the surface untouched.

use std::sync::Arc;

use parking_lot::Mutex;
use pipstream::{
    DecodedContent, FrameDelivery, FrameSource, HostPixelBuffer, ManualClock, MemoryDisplaySink,
    PipelineConfig, PixelFormat, RhiPixelBuffer, StreamError, StreamPipeline, TickOutcome,
};

/// Decoded source that hands its delivery handle to the test.
#[derive(Clone, Default)]
struct ExternalDecoder {
    delivery: Arc<Mutex<Option<FrameDelivery>>>,
    fail_start: bool,
}

impl ExternalDecoder {
    fn delivery(&self) -> FrameDelivery {
        self.delivery.lock().clone().expect("decoder not started")
    }
}

impl DecodedContent for ExternalDecoder {
    fn kind(&self) -> &'static str {
        "external"
    }

    fn start(&mut self, delivery: FrameDelivery) -> pipstream::Result<()> {
        if self.fail_start {
            return Err(StreamError::DeviceUnavailable("decoder offline".into()));
        }
        *self.delivery.lock() = Some(delivery);
        Ok(())
    }

    fn stop(&mut self) {
        self.delivery.lock().take();
    }
}

fn decoded_buffer(width: u32, height: u32) -> RhiPixelBuffer {
    RhiPixelBuffer::from_buffer(HostPixelBuffer::new(width, height, PixelFormat::Bgra32).unwrap())
}

fn pipeline() -> (Arc<ManualClock>, Arc<MemoryDisplaySink>, StreamPipeline) {
    let clock = Arc::new(ManualClock::new(2_000_000));
    let mut pipeline =
        StreamPipeline::with_clock(PipelineConfig::default(), clock.clone()).unwrap();
    let sink = Arc::new(MemoryDisplaySink::new());
    pipeline.bind(sink.clone());
    (clock, sink, pipeline)
}

#[test]
fn test_decoded_buffer_reaches_surface_without_copy() {
    let (_clock, sink, mut pipeline) = pipeline();
    let decoder = ExternalDecoder::default();
    pipeline
        .start(FrameSource::hardware_decoded(decoder.clone()), 30)
        .unwrap();

    let buffer = decoded_buffer(1280, 720);
    assert!(decoder.delivery().deliver(buffer.clone()));

    let record = sink.last_record().unwrap();
    assert!(record.buffer.ptr_eq(&buffer));
    assert_eq!(record.presentation_ns, 2_000_000);
    assert_eq!(record.duration_ns, 33_333_333);
    assert_eq!(pipeline.stats().frames_passed_through, 1);
    assert!(pipeline.pools().active_pool().is_none());
}

#[test]
fn test_ticks_do_not_render_for_decoded_sources() {
    let (_clock, sink, mut pipeline) = pipeline();
    pipeline
        .start(FrameSource::hardware_decoded(ExternalDecoder::default()), 30)
        .unwrap();

    for t in 0..10 {
        assert_eq!(pipeline.tick(t * 16_666_667), TickOutcome::SourceDriven);
    }
    assert_eq!(sink.enqueued_count(), 0);
}

#[test]
fn test_presentation_times_follow_delivery_order() {
    let (clock, sink, mut pipeline) = pipeline();
    let decoder = ExternalDecoder::default();
    pipeline
        .start(FrameSource::hardware_decoded(decoder.clone()), 30)
        .unwrap();
    let delivery = decoder.delivery();

    for _ in 0..5 {
        delivery.deliver(decoded_buffer(64, 36));
        clock.advance(std::time::Duration::from_millis(33));
    }

    let records = sink.records();
    assert_eq!(records.len(), 5);
    for pair in records.windows(2) {
        assert!(pair[1].presentation_ns > pair[0].presentation_ns);
        assert_eq!(pair[1].frame_number, pair[0].frame_number + 1);
    }
}

#[test]
fn test_non_bgra_buffers_are_skipped() {
    let (_clock, sink, mut pipeline) = pipeline();
    let decoder = ExternalDecoder::default();
    pipeline
        .start(FrameSource::hardware_decoded(decoder.clone()), 30)
        .unwrap();

    let rgba =
        RhiPixelBuffer::from_buffer(HostPixelBuffer::new(16, 16, PixelFormat::Rgba32).unwrap());
    assert!(!decoder.delivery().deliver(rgba));
    assert_eq!(sink.enqueued_count(), 0);
    assert_eq!(pipeline.stats().render_failed, 1);

    assert!(decoder.delivery().deliver(decoded_buffer(16, 16)));
    assert_eq!(sink.enqueued_count(), 1);
}

#[test]
fn test_delivery_after_stop_is_dropped() {
    let (_clock, sink, mut pipeline) = pipeline();
    let decoder = ExternalDecoder::default();
    pipeline
        .start(FrameSource::hardware_decoded(decoder.clone()), 30)
        .unwrap();
    let delivery = decoder.delivery();
    assert!(delivery.deliver(decoded_buffer(8, 8)));

    pipeline.stop();
    assert!(!delivery.is_running());
    assert!(!delivery.deliver(decoded_buffer(8, 8)));
    assert_eq!(sink.enqueued_count(), 1);
    assert_eq!(pipeline.stats().dropped_after_stop, 1);
}

#[test]
fn test_failed_source_start_leaves_pipeline_stopped() {
    let (_clock, sink, mut pipeline) = pipeline();
    let decoder = ExternalDecoder {
        fail_start: true,
        ..Default::default()
    };

    let err = pipeline
        .start(FrameSource::hardware_decoded(decoder), 30)
        .unwrap_err();
    assert!(matches!(err, StreamError::DeviceUnavailable(_)));
    assert!(!pipeline.is_running());
    assert!(pipeline.timebase().is_none());
    assert_eq!(sink.enqueued_count(), 0);
}
