// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Live camera capture.
//!
//! Capture delivers decoded buffers straight to the pipeline. Authorization and
//! device failures are terminal for the source instance: it switches to a
//! placeholder frame and keeps the stream alive instead of failing it.

use super::DecodedContent;
use crate::core::pipeline::FrameDelivery;
use crate::core::rhi::{HardwareBuffer, HostPixelBuffer, PixelFormat, RhiPixelBuffer};
use crate::core::{Result, StreamError};

/// Camera access authorization as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Authorized,
    Denied,
    Restricted,
}

/// Frame callback handed to a [`CaptureDevice`].
pub type FrameCallback = Box<dyn FnMut(RhiPixelBuffer) + Send>;

/// Platform capture session.
///
/// `open` starts capture and invokes the callback on the device's own
/// delivery thread for every frame. `close` must not return while the
/// callback is executing.
pub trait CaptureDevice: Send {
    fn name(&self) -> &str;

    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the user for access. Returns whether access was granted.
    fn request_access(&mut self) -> bool;

    fn open(&mut self, on_frame: FrameCallback) -> Result<()>;

    fn close(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderReason {
    PermissionDenied,
    DeviceUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Capturing,
    Placeholder(PlaceholderReason),
}

pub struct CameraSource {
    device: Box<dyn CaptureDevice>,
    state: CameraState,
    placeholder_size: (u32, u32),
    placeholder: Option<RhiPixelBuffer>,
    frame_rate: u32,
}

impl CameraSource {
    pub fn new(device: Box<dyn CaptureDevice>) -> Self {
        Self {
            device,
            state: CameraState::Idle,
            placeholder_size: (320, 180),
            placeholder: None,
            frame_rate: 30,
        }
    }

    pub fn with_placeholder_size(mut self, width: u32, height: u32) -> Self {
        self.placeholder_size = (width, height);
        self.placeholder = None;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Leave the placeholder state so the next `start` tries the device again,
    /// e.g. after the user granted access in system settings.
    pub fn clear_placeholder(&mut self) {
        if matches!(self.state, CameraState::Placeholder(_)) {
            self.state = CameraState::Idle;
        }
    }

    fn authorize(&mut self) -> Result<()> {
        match self.device.authorization_status() {
            AuthorizationStatus::Authorized => Ok(()),
            AuthorizationStatus::NotDetermined => {
                if self.device.request_access() {
                    Ok(())
                } else {
                    Err(StreamError::PermissionDenied(format!(
                        "access to '{}' was declined",
                        self.device.name()
                    )))
                }
            }
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                Err(StreamError::PermissionDenied(format!(
                    "access to '{}' is not authorized",
                    self.device.name()
                )))
            }
        }
    }

    fn enter_placeholder(&mut self, err: &StreamError, delivery: &FrameDelivery) {
        let reason = match err {
            StreamError::PermissionDenied(_) => PlaceholderReason::PermissionDenied,
            _ => PlaceholderReason::DeviceUnavailable,
        };
        tracing::warn!("CameraSource: {}, showing placeholder", err);
        self.state = CameraState::Placeholder(reason);
        self.deliver_placeholder(delivery);
    }

    /// Deliver the placeholder frame, drawing it on first use.
    fn deliver_placeholder(&mut self, delivery: &FrameDelivery) {
        if self.placeholder.is_none() {
            match Self::draw_placeholder(self.placeholder_size) {
                Ok(buffer) => self.placeholder = Some(buffer),
                Err(e) => {
                    tracing::warn!("CameraSource: cannot create placeholder: {}", e);
                    return;
                }
            }
        }
        if let Some(buffer) = &self.placeholder {
            delivery.deliver(buffer.clone());
        }
    }

    fn draw_placeholder((width, height): (u32, u32)) -> Result<RhiPixelBuffer> {
        let buffer = HostPixelBuffer::new(width, height, PixelFormat::Bgra32)?;
        buffer.lock_base_address_mut(&mut |bytes| {
            for px in bytes.chunks_exact_mut(4) {
                px.copy_from_slice(&[48, 48, 48, 255]);
            }
        })?;
        Ok(RhiPixelBuffer::from_buffer(buffer))
    }
}

impl DecodedContent for CameraSource {
    fn kind(&self) -> &'static str {
        "camera"
    }

    fn preferred_frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Never fails: authorization and device errors put the source into its
    /// placeholder state, which persists across restarts until
    /// [`CameraSource::clear_placeholder`].
    fn start(&mut self, delivery: FrameDelivery) -> Result<()> {
        match self.state {
            CameraState::Capturing => return Ok(()),
            CameraState::Placeholder(_) => {
                self.deliver_placeholder(&delivery);
                return Ok(());
            }
            CameraState::Idle => {}
        }

        if let Err(e) = self.authorize() {
            self.enter_placeholder(&e, &delivery);
            return Ok(());
        }

        let sink = delivery.clone();
        match self.device.open(Box::new(move |buffer| {
            sink.deliver(buffer);
        })) {
            Ok(()) => {
                tracing::info!("CameraSource: capturing from '{}'", self.device.name());
                self.state = CameraState::Capturing;
            }
            Err(e) => self.enter_placeholder(&e, &delivery),
        }
        Ok(())
    }

    /// Only the placeholder needs re-delivery; live capture sends a new
    /// frame on its own.
    fn refresh(&mut self, delivery: &FrameDelivery) {
        if matches!(self.state, CameraState::Placeholder(_)) {
            self.deliver_placeholder(delivery);
        }
    }

    fn stop(&mut self) {
        if self.state == CameraState::Capturing {
            self.device.close();
            self.state = CameraState::Idle;
            tracing::debug!("CameraSource: closed '{}'", self.device.name());
        }
    }
}
