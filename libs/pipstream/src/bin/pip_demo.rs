// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Streams a clock face or a stopwatch into an in-memory surface for a few
//! seconds and logs what reached it.
//!
//! ```text
//! pip_demo [clock|stopwatch] [seconds]
//! ```
//!
//! Reads `pipstream.yaml` from the working directory when present. Set
//! `RUST_LOG=pipstream=debug` to watch pacing and sink decisions.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use pipstream::{
    Clock, ClockFace, ContentSize, DisplayLinkDriver, FrameSource, HostClock, MemoryDisplaySink,
    PipelineConfig, Stopwatch, StreamPipeline, UsageTracker,
};

const CONTENT_SIZE: ContentSize = ContentSize::new(240.0, 80.0);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let source_kind = args.next().unwrap_or_else(|| "clock".to_string());
    let seconds: u64 = match args.next() {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid duration '{}'", arg))?,
        None => 3,
    };

    let cwd = std::env::current_dir().context("cannot read working directory")?;
    let config = PipelineConfig::load_or_default(&cwd);
    tracing::info!("[pip_demo] config: {:?}", config);

    let clock: Arc<dyn Clock> = Arc::new(HostClock::new());
    let source = match source_kind.as_str() {
        "clock" => FrameSource::rasterizable(ClockFace::new(CONTENT_SIZE)),
        "stopwatch" => {
            FrameSource::rasterizable(Stopwatch::with_clock(CONTENT_SIZE, Arc::clone(&clock)))
        }
        other => bail!("unknown source '{}', expected 'clock' or 'stopwatch'", other),
    };

    let usage = Arc::new(UsageTracker::new());
    let surface = Arc::new(MemoryDisplaySink::with_name("demo surface"));
    let mut pipeline = StreamPipeline::with_clock(config.clone(), Arc::clone(&clock))?
        .with_observer(usage.clone());
    pipeline.bind(surface.clone());

    let rate = source.preferred_frame_rate().min(config.frame_rate);
    pipeline.start(source, rate)?;

    let trigger = Arc::new(DisplayLinkDriver::new(clock, config.display_refresh_hz)?);
    let stop = pipeline.stop_handle();
    let timer = std::thread::Builder::new()
        .name("pip-demo-timer".into())
        .spawn(move || {
            std::thread::sleep(Duration::from_secs(seconds));
            stop.stop();
        })?;

    tracing::info!("[pip_demo] streaming '{}' for {}s at {} fps", source_kind, seconds, rate);
    pipeline.run(trigger)?;
    if timer.join().is_err() {
        tracing::warn!("[pip_demo] timer thread panicked");
    }

    let stats = pipeline.stats();
    tracing::info!(
        "[pip_demo] enqueued {} frames ({} pool-exhausted, {} stalled, {} failed)",
        stats.frames_enqueued(),
        stats.pool_exhausted,
        stats.sink.stalled_skips,
        stats.sink.failed_skips
    );
    if let Some(last) = surface.last_record() {
        tracing::info!(
            "[pip_demo] last frame #{} {}x{} at {}ns",
            last.frame_number,
            last.buffer.width,
            last.buffer.height,
            last.presentation_ns
        );
    }
    tracing::info!("[pip_demo] sessions: {}", usage.to_json()?);
    Ok(())
}
