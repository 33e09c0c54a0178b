// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Periodic, display-synchronized frame triggers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::core::clocks::Clock;
use crate::core::{Result, StreamError};

/// Host periodic trigger (display link, vsync callback).
///
/// The producer loop blocks in [`wait_for_tick`](Self::wait_for_tick);
/// [`stop`](Self::stop) may be called from any thread and wakes it.
pub trait FrameTrigger: Send + Sync {
    fn start(&self) -> Result<()>;

    /// Block until the next tick and return its host time in nanoseconds.
    /// Returns `None` once the trigger is stopped.
    fn wait_for_tick(&self) -> Option<i64>;

    /// Invalidate the trigger. When this returns no further tick is
    /// delivered.
    fn stop(&self);

    fn is_running(&self) -> bool;

    fn nominal_refresh_period(&self) -> Duration;
}

struct Ticker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
    ticks: Receiver<i64>,
}

/// Portable display link: a dedicated thread firing at the display refresh
/// rate on absolute deadlines.
///
/// Ticks coalesce: when the consumer is behind, undelivered ticks are dropped
/// rather than queued, the way a vsync flag is overwritten.
pub struct DisplayLinkDriver {
    clock: Arc<dyn Clock>,
    period: Duration,
    running: AtomicBool,
    ticker: Mutex<Option<Ticker>>,
}

impl DisplayLinkDriver {
    pub fn new(clock: Arc<dyn Clock>, refresh_hz: f64) -> Result<Self> {
        if !(refresh_hz.is_finite() && refresh_hz >= 1.0) {
            return Err(StreamError::Configuration(format!(
                "display refresh rate must be at least 1 Hz, got {}",
                refresh_hz
            )));
        }
        Ok(Self {
            clock,
            period: Duration::from_secs_f64(1.0 / refresh_hz),
            running: AtomicBool::new(false),
            ticker: Mutex::new(None),
        })
    }

    fn run(clock: Arc<dyn Clock>, period: Duration, ticks: Sender<i64>, stop_rx: Receiver<()>) {
        let mut deadline = Instant::now() + period;
        loop {
            match stop_rx.recv_deadline(deadline) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }

            // Full channel means the consumer hasn't taken the last tick yet.
            let _ = ticks.try_send(clock.now_ns());

            deadline = next_deadline(deadline + period, Instant::now(), period);
        }
    }
}

/// First deadline on the `deadline + k * period` grid that is still ahead of
/// `now`. Missed refreshes are skipped, not replayed.
fn next_deadline(deadline: Instant, now: Instant, period: Duration) -> Instant {
    if deadline > now {
        return deadline;
    }
    let behind = now - deadline;
    let into_period = behind.as_nanos() % period.as_nanos().max(1);
    tracing::trace!(
        "DisplayLinkDriver: missed {} refresh deadlines",
        behind.as_nanos() / period.as_nanos().max(1) + 1
    );
    // `into_period` is below `period`, so it fits whenever `period` does.
    let remaining = u64::try_from(into_period)
        .map(|ns| period.saturating_sub(Duration::from_nanos(ns)))
        .unwrap_or(period);
    now + remaining
}

impl FrameTrigger for DisplayLinkDriver {
    fn start(&self) -> Result<()> {
        let mut ticker = self.ticker.lock();
        if ticker.is_some() {
            return Ok(());
        }

        let (tick_tx, tick_rx) = crossbeam_channel::bounded(1);
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        let clock = Arc::clone(&self.clock);
        let period = self.period;
        let handle = std::thread::Builder::new()
            .name("pipstream-display-link".into())
            .spawn(move || Self::run(clock, period, tick_tx, stop_rx))?;

        *ticker = Some(Ticker {
            stop_tx,
            handle,
            ticks: tick_rx,
        });
        self.running.store(true, Ordering::Release);
        tracing::debug!("DisplayLinkDriver: started at {:?} per refresh", self.period);
        Ok(())
    }

    fn wait_for_tick(&self) -> Option<i64> {
        let ticks = self.ticker.lock().as_ref().map(|t| t.ticks.clone())?;
        let tick = ticks.recv().ok()?;
        // A tick buffered before stop() must not leak out after it.
        self.running.load(Ordering::Acquire).then_some(tick)
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Release);
        let Some(ticker) = self.ticker.lock().take() else {
            return;
        };
        let _ = ticker.stop_tx.try_send(());
        if ticker.handle.join().is_err() {
            tracing::error!("DisplayLinkDriver: ticker thread panicked");
        }
        tracing::debug!("DisplayLinkDriver: stopped");
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn nominal_refresh_period(&self) -> Duration {
        self.period
    }
}

impl Drop for DisplayLinkDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
