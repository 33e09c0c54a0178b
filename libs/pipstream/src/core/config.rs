// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Pipeline configuration via `pipstream.yaml`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::sources::{MAX_FRAME_RATE, MIN_FRAME_RATE};
use crate::core::{Result, StreamError};

/// Pipeline tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Target frame rate when a source does not state a preference.
    pub frame_rate: u32,

    /// Device scale factor (pixels per point) for rasterized content.
    pub scale_factor: f64,

    /// Buffers per pool. The display surface holds one, the renderer needs
    /// at least one more.
    pub pool_capacity: usize,

    /// Ticks landing this early before the frame interval still emit.
    pub jitter_tolerance_ms: f64,

    /// Rate of the portable display link.
    pub display_refresh_hz: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            scale_factor: 2.0,
            pool_capacity: 3,
            jitter_tolerance_ms: 2.0,
            display_refresh_hz: 60.0,
        }
    }
}

impl PipelineConfig {
    /// Configuration file name.
    pub const FILE_NAME: &'static str = "pipstream.yaml";

    /// Load configuration from a directory. Returns error if the file is
    /// missing, cannot be parsed, or holds invalid values.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            StreamError::Configuration(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            StreamError::Configuration(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;
        config.validate()?;

        tracing::info!("Loaded pipeline config from {}", config_path.display());
        Ok(config)
    }

    /// Load configuration from a directory, returning defaults if the file is
    /// missing or unusable.
    pub fn load_or_default(dir: &Path) -> Self {
        if !dir.join(Self::FILE_NAME).exists() {
            tracing::debug!(
                "No {} found in {}, using defaults",
                Self::FILE_NAME,
                dir.display()
            );
            return Self::default();
        }

        match Self::load(dir) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_FRAME_RATE..=MAX_FRAME_RATE).contains(&self.frame_rate) {
            return Err(StreamError::Configuration(format!(
                "frame_rate must be within {}..={}, got {}",
                MIN_FRAME_RATE, MAX_FRAME_RATE, self.frame_rate
            )));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(StreamError::Configuration(format!(
                "scale_factor must be positive, got {}",
                self.scale_factor
            )));
        }
        if self.pool_capacity < 2 {
            return Err(StreamError::Configuration(format!(
                "pool_capacity must be at least 2, got {}",
                self.pool_capacity
            )));
        }
        let max_tolerance = 1000.0 / MAX_FRAME_RATE as f64 / 2.0;
        if !(0.0..=max_tolerance).contains(&self.jitter_tolerance_ms) {
            return Err(StreamError::Configuration(format!(
                "jitter_tolerance_ms must be within 0..={:.2}, got {}",
                max_tolerance, self.jitter_tolerance_ms
            )));
        }
        if !(self.display_refresh_hz.is_finite() && self.display_refresh_hz >= 1.0) {
            return Err(StreamError::Configuration(format!(
                "display_refresh_hz must be at least 1, got {}",
                self.display_refresh_hz
            )));
        }
        Ok(())
    }

    pub fn jitter_tolerance(&self) -> Duration {
        Duration::from_secs_f64(self.jitter_tolerance_ms.max(0.0) / 1000.0)
    }
}
