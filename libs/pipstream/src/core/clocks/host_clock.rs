// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::Clock;
use crate::core::media_clock::MediaClock;

/// The hardware host clock every production timebase is bound to.
pub struct HostClock {
    description: String,
}

impl HostClock {
    pub fn new() -> Self {
        Self::with_description("Host Clock".to_string())
    }

    pub fn with_description(description: String) -> Self {
        Self { description }
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for HostClock {
    fn now_ns(&self) -> i64 {
        MediaClock::now_ns()
    }

    fn description(&self) -> &str {
        &self.description
    }
}
