// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Frame sources.
//!
//! A source is either content the pipeline rasterizes itself, or a producer of
//! buffers that are already hardware decoded. The two are disjoint variants of
//! [`FrameSource`], so decoded content can never end up on the rasterizing path.

mod camera;
mod clock_face;
mod playback;
mod stopwatch;

pub use camera::{
    AuthorizationStatus, CameraSource, CameraState, CaptureDevice, FrameCallback, PlaceholderReason,
};
pub use clock_face::ClockFace;
pub use playback::{DecodedFrameReader, PlaybackSource};
pub use stopwatch::Stopwatch;

use crate::core::Result;
use crate::core::pipeline::FrameDelivery;
use crate::core::render::Canvas;

/// Lowest frame rate a source may ask for.
pub const MIN_FRAME_RATE: u32 = 1;
/// Highest frame rate a source may ask for.
pub const MAX_FRAME_RATE: u32 = 60;

/// Size of rasterizable content in logical points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContentSize {
    pub width: f64,
    pub height: f64,
}

impl ContentSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True for zero, negative or non-finite extents.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// Content the pipeline draws into pooled buffers.
pub trait RasterContent: Send {
    /// Provider tag reported to the session observer.
    fn kind(&self) -> &'static str;

    fn preferred_frame_rate(&self) -> u32 {
        30
    }

    /// Called when a stream starts. May be called again after [`stop`](Self::stop);
    /// each provider documents whether accumulated state survives.
    fn start(&mut self) {}

    fn stop(&mut self) {}

    /// Bring geometry and displayed values up to date. Called immediately
    /// before every draw.
    fn layout(&mut self);

    fn bounds(&self) -> ContentSize;

    fn draw(&self, canvas: &mut Canvas<'_>);
}

/// Producer of hardware-decoded buffers (camera capture, media decode).
///
/// Buffers are pushed through the [`FrameDelivery`] handle, usually from a
/// background thread, and reach the sink without any pixel copy.
pub trait DecodedContent: Send {
    fn kind(&self) -> &'static str;

    fn preferred_frame_rate(&self) -> u32 {
        30
    }

    fn start(&mut self, delivery: FrameDelivery) -> Result<()>;

    /// Stop delivering. Must not return while a delivery callback is running
    /// on another thread of this source.
    fn stop(&mut self);

    /// The surface lost or skipped the last delivered frame: a new surface
    /// was bound, or back-pressure cleared after a skip. Sources that do not
    /// deliver continuously re-deliver their current frame here. Called on
    /// the producer context while the stream runs.
    fn refresh(&mut self, _delivery: &FrameDelivery) {}
}

/// A source bound to one rendering strategy.
pub enum FrameSource {
    Rasterizable(Box<dyn RasterContent>),
    HardwareDecoded(Box<dyn DecodedContent>),
}

impl FrameSource {
    pub fn rasterizable<C: RasterContent + 'static>(content: C) -> Self {
        Self::Rasterizable(Box::new(content))
    }

    pub fn hardware_decoded<C: DecodedContent + 'static>(content: C) -> Self {
        Self::HardwareDecoded(Box::new(content))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rasterizable(content) => content.kind(),
            Self::HardwareDecoded(content) => content.kind(),
        }
    }

    /// Preferred frame rate clamped to the supported range.
    pub fn preferred_frame_rate(&self) -> u32 {
        let rate = match self {
            Self::Rasterizable(content) => content.preferred_frame_rate(),
            Self::HardwareDecoded(content) => content.preferred_frame_rate(),
        };
        rate.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE)
    }

    pub fn is_rasterizable(&self) -> bool {
        matches!(self, Self::Rasterizable(_))
    }
}

impl std::fmt::Debug for FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self {
            Self::Rasterizable(_) => "Rasterizable",
            Self::HardwareDecoded(_) => "HardwareDecoded",
        };
        f.debug_tuple(variant).field(&self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_size_is_empty() {
        assert!(ContentSize::new(0.0, 10.0).is_empty());
        assert!(ContentSize::new(10.0, -1.0).is_empty());
        assert!(ContentSize::new(f64::NAN, 10.0).is_empty());
        assert!(!ContentSize::new(200.0, 100.0).is_empty());
    }

    #[test]
    fn test_preferred_rate_is_clamped() {
        struct Greedy;
        impl RasterContent for Greedy {
            fn kind(&self) -> &'static str {
                "greedy"
            }
            fn preferred_frame_rate(&self) -> u32 {
                240
            }
            fn layout(&mut self) {}
            fn bounds(&self) -> ContentSize {
                ContentSize::new(1.0, 1.0)
            }
            fn draw(&self, _canvas: &mut Canvas<'_>) {}
        }

        let source = FrameSource::rasterizable(Greedy);
        assert_eq!(source.preferred_frame_rate(), MAX_FRAME_RATE);
        assert!(source.is_rasterizable());
        assert_eq!(source.kind(), "greedy");
    }
}
