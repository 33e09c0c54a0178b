// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use super::delivery::PipelineShared;
use super::{FrameDelivery, PipelineStats, StopHandle};
use crate::core::clocks::{Clock, HostClock, Timebase};
use crate::core::config::PipelineConfig;
use crate::core::render::RasterizingRenderer;
use crate::core::rhi::{BufferAllocator, BufferPoolManager, HostBufferAllocator};
use crate::core::scheduling::{FrameTrigger, PacingController, TickDecision};
use crate::core::session::SessionObserver;
use crate::core::sinks::{EnqueueOutcome, TimedDisplaySink};
use crate::core::sources::FrameSource;
use crate::core::{Result, StreamError};

/// What one call to [`StreamPipeline::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    NotRunning,
    /// The source delivers its own frames; the tick only applied sink signals.
    SourceDriven,
    /// Surface is not visible; nothing rendered.
    Hidden,
    /// Too early for the next frame.
    Paced,
    Emitted,
    /// A frame was due but skipped (pool exhausted, render or sink failure,
    /// back-pressure).
    Dropped,
}

/// One stream: a source rendered or passed through, paced, stamped on its
/// own timebase and pushed to the bound display surface.
///
/// The pipeline is owned by whoever drives the stream; there is no global
/// instance. Per-frame errors never escape [`tick`](Self::tick).
pub struct StreamPipeline {
    config: PipelineConfig,
    clock: Arc<dyn Clock>,
    shared: Arc<PipelineShared>,
    source: Option<FrameSource>,
    renderer: Option<RasterizingRenderer>,
    pools: BufferPoolManager,
    pacing: PacingController,
    observer: Option<Arc<dyn SessionObserver>>,
    visible: bool,
    pool_exhausted: u64,
    render_failed: u64,
}

impl StreamPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(HostClock::new()))
    }

    /// Pipeline whose timebases read `clock`.
    pub fn with_clock(config: PipelineConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pools: BufferPoolManager::new(Arc::new(HostBufferAllocator), config.pool_capacity),
            pacing: PacingController::new(config.jitter_tolerance()),
            clock,
            shared: Arc::new(PipelineShared::default()),
            source: None,
            renderer: None,
            observer: None,
            visible: true,
            pool_exhausted: 0,
            render_failed: 0,
            config,
        })
    }

    /// Allocate pooled buffers through `allocator` instead of host memory.
    pub fn with_allocator(mut self, allocator: Arc<dyn BufferAllocator>) -> Self {
        self.pools = BufferPoolManager::new(allocator, self.config.pool_capacity);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Start streaming `source` at `frame_rate` (clamped to 1..=60).
    ///
    /// A running stream is stopped first. The new stream gets a fresh
    /// timebase that is shared with the bound surface.
    pub fn start(&mut self, mut source: FrameSource, frame_rate: u32) -> Result<()> {
        if self.source.is_some() || self.pacing.is_running() {
            self.stop();
        }

        let rate = self.pacing.start(frame_rate);
        let timebase = Timebase::new(Arc::clone(&self.clock));
        {
            let mut output = self.shared.output.lock();
            output.adapter.set_timebase(Some(Arc::clone(&timebase)));
            output.adapter.set_frame_rate(rate);
            output.adapter.flush();
            output.timebase = Some(timebase);
            output.frame_duration_ns = PacingController::interval_for(rate);
            output.next_frame_number = 0;
            output.passthrough.invalidate();
            output.running = true;
        }

        let started = match &mut source {
            FrameSource::Rasterizable(content) => {
                content.start();
                self.renderer = Some(RasterizingRenderer::new(self.config.scale_factor));
                Ok(())
            }
            FrameSource::HardwareDecoded(content) => content.start(self.delivery()),
        };
        if let Err(e) = started {
            tracing::warn!("StreamPipeline: '{}' failed to start: {}", source.kind(), e);
            self.shared.halt();
            self.pacing.stop();
            self.renderer = None;
            return Err(e);
        }

        let kind = source.kind();
        self.source = Some(source);
        if let Some(observer) = &self.observer {
            observer.stream_started(kind);
        }
        tracing::info!("StreamPipeline: started '{}' at {} fps", kind, rate);
        Ok(())
    }

    /// Drive one trigger tick at host time `now_ns`.
    pub fn tick(&mut self, now_ns: i64) -> TickOutcome {
        if !self.pacing.is_running() {
            return TickOutcome::NotRunning;
        }
        let wants_frame = {
            let mut output = self.shared.output.lock();
            if !output.running {
                // Halted through a StopHandle; finish the teardown here.
                drop(output);
                self.stop();
                return TickOutcome::NotRunning;
            }
            output.adapter.drain_signals();
            output.adapter.wants_frame()
        };

        let content = match self.source.as_mut() {
            Some(FrameSource::Rasterizable(content)) => content,
            Some(FrameSource::HardwareDecoded(content)) => {
                if wants_frame {
                    let delivery = FrameDelivery::new(Arc::clone(&self.shared));
                    content.refresh(&delivery);
                }
                return TickOutcome::SourceDriven;
            }
            None => return TickOutcome::SourceDriven,
        };
        if !self.visible {
            return TickOutcome::Hidden;
        }
        if self.pacing.tick(now_ns) == TickDecision::Skip {
            return TickOutcome::Paced;
        }
        let Some(renderer) = self.renderer else {
            return TickOutcome::Dropped;
        };

        let rendered = match renderer.render(&mut **content, &mut self.pools) {
            Ok(rendered) => rendered,
            Err(StreamError::PoolExhausted) => {
                self.pool_exhausted += 1;
                tracing::debug!("StreamPipeline: pool exhausted, skipping frame");
                return TickOutcome::Dropped;
            }
            Err(e) => {
                self.render_failed += 1;
                tracing::debug!("StreamPipeline: skipping frame: {}", e);
                return TickOutcome::Dropped;
            }
        };

        let mut output = self.shared.output.lock();
        if !output.running {
            return TickOutcome::Dropped;
        }
        match output.submit(rendered) {
            Ok(EnqueueOutcome::Enqueued) => {
                output.frames_rendered += 1;
                tracing::trace!("StreamPipeline: frame enqueued at {}ns", now_ns);
                TickOutcome::Emitted
            }
            Ok(_) => TickOutcome::Dropped,
            Err(e) => {
                tracing::debug!("StreamPipeline: skipping frame: {}", e);
                TickOutcome::Dropped
            }
        }
    }

    /// Stop the stream. Idempotent.
    ///
    /// Invalidates the trigger and clears the running flag before anything
    /// else, so no frame is enqueued after this returns. Then stops the
    /// source, releases renderer and pools, and notifies the session
    /// observer. Returns the source so the owner can restart it later.
    pub fn stop(&mut self) -> Option<FrameSource> {
        self.shared.halt();
        self.pacing.stop();

        let mut source = self.source.take();
        match &mut source {
            Some(FrameSource::Rasterizable(content)) => content.stop(),
            Some(FrameSource::HardwareDecoded(content)) => content.stop(),
            None => {}
        }

        self.renderer = None;
        self.pools.release_all();

        if let Some(source) = &source {
            if let Some(observer) = &self.observer {
                observer.stream_stopped(source.kind());
            }
            tracing::info!("StreamPipeline: stopped '{}'", source.kind());
        }
        source
    }

    /// Drive the pipeline from `trigger` until the stream stops.
    ///
    /// Blocks the calling thread, which becomes the producer context.
    pub fn run(&mut self, trigger: Arc<dyn FrameTrigger>) -> Result<()> {
        if !self.is_running() {
            return Err(StreamError::Runtime("start the pipeline before running it".into()));
        }

        *self.shared.trigger.lock() = Some(Arc::clone(&trigger));
        if let Err(e) = trigger.start() {
            self.shared.trigger.lock().take();
            return Err(e);
        }
        // A stop that raced the attach above has already cleared the flag.
        if !self.shared.is_running() {
            trigger.stop();
        }

        while let Some(tick_ns) = trigger.wait_for_tick() {
            if self.tick(tick_ns) == TickOutcome::NotRunning {
                break;
            }
        }

        trigger.stop();
        self.stop();
        Ok(())
    }

    /// Replace the display surface.
    ///
    /// A running stream moves to the new surface with the same timebase and
    /// frame rate; the old surface is detached and flushed, and the next tick
    /// emits immediately.
    pub fn bind(&mut self, surface: Arc<dyn TimedDisplaySink>) {
        let previous = self.shared.output.lock().adapter.bind(surface);
        if previous.is_some() && self.pacing.is_running() {
            self.pacing.rearm();
            tracing::debug!("StreamPipeline: rebound running stream");
        }
    }

    /// Change the target frame rate. Returns the effective (clamped) rate.
    pub fn set_frame_rate(&mut self, frame_rate: u32) -> u32 {
        let rate = self.pacing.set_frame_rate(frame_rate);
        let mut output = self.shared.output.lock();
        output.adapter.set_frame_rate(rate);
        output.frame_duration_ns = PacingController::interval_for(rate);
        rate
    }

    /// Report whether the surface is on screen. Rendering pauses while it is
    /// hidden and resumes with an immediate frame.
    pub fn set_surface_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.pacing.rearm();
        }
        tracing::debug!("StreamPipeline: surface visible = {}", visible);
    }

    pub fn is_running(&self) -> bool {
        self.pacing.is_running() && self.shared.is_running()
    }

    /// Delivery handle bound to this pipeline.
    pub fn delivery(&self) -> FrameDelivery {
        FrameDelivery::new(Arc::clone(&self.shared))
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(Arc::clone(&self.shared))
    }

    /// Timebase of the running stream.
    pub fn timebase(&self) -> Option<Arc<Timebase>> {
        self.shared.output.lock().timebase.clone()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn pools(&self) -> &BufferPoolManager {
        &self.pools
    }

    pub fn stats(&self) -> PipelineStats {
        let output = self.shared.output.lock();
        PipelineStats {
            running: output.running,
            frame_rate: self.pacing.frame_rate(),
            frames_rendered: output.frames_rendered,
            frames_passed_through: output.frames_passed_through,
            pool_exhausted: self.pool_exhausted,
            render_failed: self.render_failed + output.passthrough_failed,
            dropped_after_stop: output.dropped_after_stop,
            sink_state: output.adapter.state(),
            sink: output.adapter.stats(),
        }
    }
}

impl Drop for StreamPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for StreamPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamPipeline")
            .field("source", &self.source)
            .field("running", &self.is_running())
            .field("frame_rate", &self.pacing.frame_rate())
            .field("visible", &self.visible)
            .field("pools", &self.pools)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clocks::ManualClock;
    use crate::core::render::{Canvas, Color};
    use crate::core::sinks::{MemoryDisplaySink, SinkState, SurfaceStatus};
    use crate::core::sources::{ContentSize, RasterContent};
    use std::time::Duration;

    struct Solid;

    impl RasterContent for Solid {
        fn kind(&self) -> &'static str {
            "solid"
        }
        fn layout(&mut self) {}
        fn bounds(&self) -> ContentSize {
            ContentSize::new(32.0, 16.0)
        }
        fn draw(&self, canvas: &mut Canvas<'_>) {
            canvas.clear(Color::WHITE);
        }
    }

    fn pipeline() -> (Arc<ManualClock>, Arc<MemoryDisplaySink>, StreamPipeline) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let mut pipeline =
            StreamPipeline::with_clock(PipelineConfig::default(), clock.clone()).unwrap();
        let sink = Arc::new(MemoryDisplaySink::new());
        pipeline.bind(sink.clone());
        (clock, sink, pipeline)
    }

    fn step(clock: &ManualClock, pipeline: &mut StreamPipeline, ms: u64) -> TickOutcome {
        let now = clock.advance(Duration::from_millis(ms));
        pipeline.tick(now)
    }

    #[test]
    fn test_tick_before_start_does_nothing() {
        let (_clock, sink, mut pipeline) = pipeline();
        assert_eq!(pipeline.tick(0), TickOutcome::NotRunning);
        assert_eq!(sink.enqueued_count(), 0);
    }

    #[test]
    fn test_start_shares_timebase_with_surface() {
        let (_clock, sink, mut pipeline) = pipeline();
        pipeline.start(FrameSource::rasterizable(Solid), 10).unwrap();

        let timebase = pipeline.timebase().unwrap();
        assert!(Arc::ptr_eq(&sink.control_timebase().unwrap(), &timebase));
        assert_eq!(sink.preferred_frame_rate(), 10);
    }

    #[test]
    fn test_frames_are_paced_and_scaled() {
        let (clock, sink, mut pipeline) = pipeline();
        pipeline.start(FrameSource::rasterizable(Solid), 10).unwrap();

        assert_eq!(step(&clock, &mut pipeline, 0), TickOutcome::Emitted);
        assert_eq!(step(&clock, &mut pipeline, 50), TickOutcome::Paced);
        assert_eq!(step(&clock, &mut pipeline, 50), TickOutcome::Emitted);

        let last = sink.last_record().unwrap();
        assert_eq!((last.buffer.width, last.buffer.height), (64, 32));
        assert_eq!(sink.presentation_times(), vec![1_000_000, 101_000_000]);
    }

    #[test]
    fn test_failed_surface_is_flushed_and_stream_recovers() {
        let (clock, sink, mut pipeline) = pipeline();
        pipeline.start(FrameSource::rasterizable(Solid), 10).unwrap();
        step(&clock, &mut pipeline, 0);

        sink.set_status(SurfaceStatus::Failed);
        assert_eq!(step(&clock, &mut pipeline, 100), TickOutcome::Dropped);
        assert_eq!(pipeline.stats().sink_state, SinkState::Failed);

        assert_eq!(step(&clock, &mut pipeline, 100), TickOutcome::Emitted);
        assert_eq!(pipeline.stats().sink_state, SinkState::ReadyForData);
    }

    #[test]
    fn test_hidden_surface_pauses_rendering() {
        let (clock, sink, mut pipeline) = pipeline();
        pipeline.start(FrameSource::rasterizable(Solid), 10).unwrap();
        pipeline.set_surface_visible(false);
        assert_eq!(step(&clock, &mut pipeline, 0), TickOutcome::Hidden);
        pipeline.set_surface_visible(true);
        assert_eq!(step(&clock, &mut pipeline, 1), TickOutcome::Emitted);
        assert_eq!(sink.enqueued_count(), 1);
    }

    #[test]
    fn test_stop_returns_source_and_releases_pools() {
        let (clock, _sink, mut pipeline) = pipeline();
        pipeline.start(FrameSource::rasterizable(Solid), 10).unwrap();
        step(&clock, &mut pipeline, 0);
        assert!(pipeline.pools().active_pool().is_some());

        let source = pipeline.stop();
        assert_eq!(source.map(|s| s.kind()), Some("solid"));
        assert!(pipeline.pools().active_pool().is_none());
        assert!(pipeline.timebase().is_none());
        assert!(pipeline.stop().is_none());
    }

    #[test]
    fn test_stop_handle_halts_then_tick_tears_down() {
        let (clock, sink, mut pipeline) = pipeline();
        pipeline.start(FrameSource::rasterizable(Solid), 10).unwrap();
        step(&clock, &mut pipeline, 0);

        assert!(pipeline.stop_handle().stop());
        assert_eq!(step(&clock, &mut pipeline, 200), TickOutcome::NotRunning);
        assert!(!pipeline.is_running());
        assert_eq!(sink.enqueued_count(), 1);
    }

    #[test]
    fn test_oversized_content_is_skipped_not_fatal() {
        struct Billboard;

        impl RasterContent for Billboard {
            fn kind(&self) -> &'static str {
                "billboard"
            }
            fn layout(&mut self) {}
            fn bounds(&self) -> ContentSize {
                ContentSize::new(2e9, 2e9)
            }
            fn draw(&self, _canvas: &mut Canvas<'_>) {}
        }

        let (clock, sink, mut pipeline) = pipeline();
        pipeline.start(FrameSource::rasterizable(Billboard), 10).unwrap();

        assert_eq!(step(&clock, &mut pipeline, 0), TickOutcome::Dropped);
        assert_eq!(step(&clock, &mut pipeline, 100), TickOutcome::Dropped);
        assert_eq!(pipeline.stats().render_failed, 2);
        assert!(pipeline.pools().active_pool().is_none());
        assert!(pipeline.is_running());
        assert_eq!(sink.enqueued_count(), 0);
    }

    #[test]
    fn test_set_frame_rate_clamps() {
        let (_clock, sink, mut pipeline) = pipeline();
        pipeline.start(FrameSource::rasterizable(Solid), 10).unwrap();
        assert_eq!(pipeline.set_frame_rate(500), 60);
        assert_eq!(sink.preferred_frame_rate(), 60);
        assert_eq!(pipeline.stats().frame_rate, 60);
    }
}
