// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Media playback through a decoder that yields hardware buffers.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;

use super::DecodedContent;
use crate::core::pipeline::FrameDelivery;
use crate::core::rhi::RhiPixelBuffer;
use crate::core::{Result, StreamError};

/// Platform decoder output, one buffer per call.
pub trait DecodedFrameReader: Send {
    /// Native frame rate of the media.
    fn frame_rate(&self) -> u32;

    /// Next decoded buffer, `None` at end of media.
    fn next_frame(&mut self) -> Result<Option<RhiPixelBuffer>>;

    /// Seek back to the first frame.
    fn rewind(&mut self) -> Result<()>;
}

/// The reader lives here while no worker is playing it. The worker takes it
/// when it starts and puts it back when it exits.
type ReaderSlot = Arc<Mutex<Option<Box<dyn DecodedFrameReader>>>>;

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Delivers decoded media frames at the media's own rate from a worker thread.
///
/// Restarting resumes from the current media position.
pub struct PlaybackSource {
    reader: ReaderSlot,
    worker: Option<Worker>,
    looping: bool,
}

impl PlaybackSource {
    pub fn new(reader: Box<dyn DecodedFrameReader>) -> Self {
        Self {
            reader: Arc::new(Mutex::new(Some(reader))),
            worker: None,
            looping: false,
        }
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn is_playing(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Worker entry point. Dropping it without running leaves the reader in
    /// `slot`.
    fn worker(
        slot: ReaderSlot,
        delivery: FrameDelivery,
        stop_rx: Receiver<()>,
        looping: bool,
    ) -> impl FnOnce() + Send + 'static {
        move || {
            let Some(reader) = slot.lock().take() else {
                tracing::warn!("PlaybackSource: no reader to play");
                return;
            };
            let reader = Self::run(reader, delivery, stop_rx, looping);
            *slot.lock() = Some(reader);
        }
    }

    fn run(
        mut reader: Box<dyn DecodedFrameReader>,
        delivery: FrameDelivery,
        stop_rx: Receiver<()>,
        looping: bool,
    ) -> Box<dyn DecodedFrameReader> {
        let rate = reader.frame_rate().clamp(1, 120);
        let interval = Duration::from_secs_f64(1.0 / rate as f64);
        let mut deadline = Instant::now();
        let mut rewound = false;

        loop {
            match reader.next_frame() {
                Ok(Some(buffer)) => {
                    rewound = false;
                    delivery.deliver(buffer);
                }
                Ok(None) if looping => {
                    if rewound {
                        tracing::warn!("PlaybackSource: media has no frames, not looping");
                        break;
                    }
                    if let Err(e) = reader.rewind() {
                        tracing::warn!("PlaybackSource: rewind failed: {}", e);
                        break;
                    }
                    rewound = true;
                    match stop_rx.try_recv() {
                        Err(TryRecvError::Empty) => continue,
                        Ok(()) | Err(TryRecvError::Disconnected) => break,
                    }
                }
                Ok(None) => {
                    tracing::debug!("PlaybackSource: end of media");
                    break;
                }
                Err(e) => {
                    tracing::warn!("PlaybackSource: decode failed: {}", e);
                    break;
                }
            }

            deadline += interval;
            let now = Instant::now();
            if deadline < now {
                // Fell behind; don't burst to catch up.
                deadline = now;
            }
            match stop_rx.recv_deadline(deadline) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        reader
    }
}

impl DecodedContent for PlaybackSource {
    fn kind(&self) -> &'static str {
        "playback"
    }

    fn preferred_frame_rate(&self) -> u32 {
        self.reader.lock().as_ref().map_or(30, |reader| reader.frame_rate())
    }

    fn start(&mut self, delivery: FrameDelivery) -> Result<()> {
        if self.is_playing() {
            return Ok(());
        }
        // Reap a worker that ran off the end of the media.
        self.stop();
        if self.reader.lock().is_none() {
            return Err(StreamError::Runtime("playback reader was lost".into()));
        }

        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        let looping = self.looping;
        let handle = std::thread::Builder::new()
            .name("pipstream-playback".into())
            .spawn(Self::worker(Arc::clone(&self.reader), delivery, stop_rx, looping))?;

        self.worker = Some(Worker { stop_tx, handle });
        tracing::info!("PlaybackSource: started (looping: {})", looping);
        Ok(())
    }

    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = worker.stop_tx.try_send(());
        drop(worker.stop_tx);
        if worker.handle.join().is_err() {
            tracing::error!("PlaybackSource: worker panicked, reader dropped");
        }
        tracing::debug!("PlaybackSource: stopped");
    }
}

impl Drop for PlaybackSource {
    fn drop(&mut self) {
        self.stop();
    }
}
