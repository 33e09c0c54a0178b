// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::SessionObserver;
use crate::core::{Result, StreamError};

/// A session that has started but not ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSession {
    pub provider: String,
    pub started_at: DateTime<Utc>,
}

/// A completed streaming session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub provider: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_ms: i64,
    /// End time was synthesized for a session left open by a previous run.
    #[serde(default)]
    pub recovered: bool,
}

impl SessionRecord {
    fn close(open: OpenSession, ended_at: DateTime<Utc>, recovered: bool) -> Self {
        // Wall clocks can step backwards; never record a negative session.
        let ended_at = ended_at.max(open.started_at);
        Self {
            duration_ms: (ended_at - open.started_at).num_milliseconds(),
            provider: open.provider,
            started_at: open.started_at,
            ended_at,
            recovered,
        }
    }
}

#[derive(Default)]
struct TrackerState {
    open: Option<OpenSession>,
    records: Vec<SessionRecord>,
}

/// In-memory session log. Persisting it is up to the host.
#[derive(Default)]
pub struct UsageTracker {
    state: Mutex<TrackerState>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume with the open session a previous run left behind.
    ///
    /// Call [`recover_unterminated`](Self::recover_unterminated) before the
    /// first new session to close it.
    pub fn with_unterminated(open: OpenSession) -> Self {
        Self {
            state: Mutex::new(TrackerState {
                open: Some(open),
                records: Vec::new(),
            }),
        }
    }

    /// Close a session left open at startup, ending it at `now`.
    pub fn recover_unterminated(&self, now: DateTime<Utc>) -> Option<SessionRecord> {
        let mut state = self.state.lock();
        let open = state.open.take()?;
        tracing::info!(
            "UsageTracker: closing unterminated '{}' session from {}",
            open.provider,
            open.started_at
        );
        let record = SessionRecord::close(open, now, true);
        state.records.push(record.clone());
        Some(record)
    }

    pub fn start_at(&self, provider: &str, at: DateTime<Utc>) {
        let mut state = self.state.lock();
        if let Some(previous) = state.open.take() {
            tracing::warn!(
                "UsageTracker: '{}' session still open, ending it before '{}'",
                previous.provider,
                provider
            );
            state.records.push(SessionRecord::close(previous, at, false));
        }
        state.open = Some(OpenSession {
            provider: provider.to_string(),
            started_at: at,
        });
    }

    pub fn stop_at(&self, provider: &str, at: DateTime<Utc>) -> Option<SessionRecord> {
        let mut state = self.state.lock();
        let Some(open) = state.open.take() else {
            tracing::debug!("UsageTracker: stop for '{}' without an open session", provider);
            return None;
        };
        if open.provider != provider {
            tracing::warn!(
                "UsageTracker: stop for '{}' closes '{}' session",
                provider,
                open.provider
            );
        }
        let record = SessionRecord::close(open, at, false);
        state.records.push(record.clone());
        Some(record)
    }

    pub fn open_session(&self) -> Option<OpenSession> {
        self.state.lock().open.clone()
    }

    pub fn records(&self) -> Vec<SessionRecord> {
        self.state.lock().records.clone()
    }

    /// Total recorded time for `provider`, in milliseconds.
    pub fn total_ms(&self, provider: &str) -> i64 {
        self.state
            .lock()
            .records
            .iter()
            .filter(|record| record.provider == provider)
            .map(|record| record.duration_ms)
            .sum()
    }

    /// Completed sessions as JSON, for the host to persist.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.state.lock().records)
            .map_err(|e| StreamError::Runtime(format!("Failed to serialize sessions: {}", e)))
    }
}

impl SessionObserver for UsageTracker {
    fn stream_started(&self, provider: &str) {
        self.start_at(provider, Utc::now());
    }

    fn stream_stopped(&self, provider: &str) {
        self.stop_at(provider, Utc::now());
    }
}
