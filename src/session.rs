//! Short-lived memory of the last generated document per conversation and mode.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::cache::TtlStore;
use crate::clock::Clock;
use crate::mode::CallerMode;
use crate::scheduler::Sweep;

/// How long a generated document stays available for edits
pub const SESSION_RETENTION_MINUTES: i64 = 30;

/// The last successfully generated document for a session key
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    /// Document returned by the previous turn
    pub previous_document: String,
    /// When the document was stored
    pub created_at: DateTime<Utc>,
}

/// Builds the composite key scoping a conversation to one caller mode.
///
/// Returns `None` for an empty session identifier, which disables memory.
pub fn session_key(session_id: &str, mode: CallerMode) -> Option<String> {
    if session_id.is_empty() {
        return None;
    }
    Some(format!("{session_id}-{mode}"))
}

/// Store of [`SessionRecord`]s with read-time and sweep-time expiry
///
/// Concurrent writes to the same key are not serialized; the last write wins.
pub struct SessionStore {
    records: TtlStore<String>,
}

impl SessionStore {
    /// Creates a store with the default 30 minute retention window
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_retention(Duration::minutes(SESSION_RETENTION_MINUTES), clock)
    }

    /// Creates a store with a custom retention window
    pub fn with_retention(retention: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: TtlStore::new(retention, clock),
        }
    }

    /// Returns the live record for `key`, evicting it when expired
    pub async fn get(&self, key: &str) -> Option<SessionRecord> {
        self.records.get(key).await.map(|entry| SessionRecord {
            previous_document: entry.value,
            created_at: entry.created_at,
        })
    }

    /// Stores `document` under `key`, replacing any previous record
    pub async fn put(&self, key: &str, document: &str) {
        self.records.insert(key, document.to_string()).await;
    }

    /// Number of live records
    pub async fn len(&self) -> usize {
        self.records.len().await
    }

    /// Whether no live records are held
    pub async fn is_empty(&self) -> bool {
        self.records.is_empty().await
    }
}

#[async_trait]
impl Sweep for SessionStore {
    async fn sweep(&self) -> usize {
        self.records.sweep().await
    }
}
