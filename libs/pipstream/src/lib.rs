// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! View-to-video-stream pipeline.
//!
//! Turns renderable content or hardware-decoded buffers into a paced sequence
//! of timed pixel buffers for a timed-image display surface (a
//! picture-in-picture layer, a compositor video plane).
//!
//! ```text
//! FrameTrigger ─tick─▶ StreamPipeline ─▶ PacingController
//!                           │
//!          ┌────────────────┴─────────────────┐
//!   RasterizingRenderer              FrameDelivery ◀─ decode thread
//!   (BufferPoolManager)              (PassthroughRenderer)
//!          └────────────────┬─────────────────┘
//!                     Timebase stamp
//!                           ▼
//!                 SinkAdapter ─▶ TimedDisplaySink
//! ```

#![allow(clippy::type_complexity)] // Callback and trait-object types are clear in context

pub mod core;

pub use core::{
    media_clock::MediaClock, AuthorizationStatus, BufferAllocator, BufferPoolManager,
    CameraSource, CameraState, Canvas, CaptureDevice, Clock, ClockFace, Color, ContentSize,
    DecodedContent, DecodedFrameReader, DisplayLinkDriver, EnqueueOutcome, FormatDescription,
    FrameCallback, FrameDelivery, FrameRecord, FrameSource, FrameTrigger, HardwareBuffer,
    HostBufferAllocator, HostClock, HostPixelBuffer, ManualClock, MemoryDisplaySink,
    OpenSession, PacingController, PacingState, PassthroughRenderer, PipelineConfig,
    PipelineStats, PixelBufferDescriptor, PixelBufferPool, PixelBufferPoolId,
    PixelBufferPoolStats, PixelFormat, PlaceholderReason, PlaybackSource, PoolHandle,
    PooledPixelBuffer, RasterContent, RasterizingRenderer, Rect, RenderedFrame, Result,
    RhiPixelBuffer, SessionObserver, SessionRecord, SinkAdapter, SinkEvent, SinkSignals,
    SinkState, SinkStats, StopHandle, Stopwatch, StreamError, StreamPipeline, SurfaceStatus,
    TickDecision, TickOutcome, TimedDisplaySink, TimedFrame, Timebase, UsageTracker,
};
