// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Buffer pool exhausted: no free buffer for this frame")]
    PoolExhausted,

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Display sink failed: {0}")]
    SinkFailed(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Buffer operation failed: {0}")]
    BufferError(String),

    #[error("Clock synchronization error: {0}")]
    ClockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StreamError {
    /// Per-frame errors that are absorbed by skipping the frame.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::PoolExhausted | Self::RenderFailed(_) | Self::SinkFailed(_)
        )
    }

    /// Errors that leave a provider instance in its placeholder state until
    /// the user intervenes.
    pub fn is_terminal_for_provider(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::DeviceUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;
