use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tracing::debug;

use super::{RepositoryFetcher, RepositoryMetadata};
use crate::cache::TtlStore;
use crate::clock::Clock;
use crate::error::FetchError;
use crate::reference::RepoReference;
use crate::scheduler::Sweep;

/// Memoizes successful lookups of an inner fetcher for a bounded duration
///
/// Failures are never cached, so a miss always behaves like the inner
/// fetcher.
pub struct CachedFetcher {
    inner: Arc<dyn RepositoryFetcher>,
    entries: TtlStore<RepositoryMetadata>,
}

impl CachedFetcher {
    /// Wraps `inner` with a cache whose entries live for `ttl`
    pub fn new(inner: Arc<dyn RepositoryFetcher>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            entries: TtlStore::new(ttl, clock),
        }
    }

    /// Number of cached repositories
    pub async fn len(&self) -> usize {
        self.entries.len().await
    }

    /// Whether nothing is cached
    pub async fn is_empty(&self) -> bool {
        self.entries.is_empty().await
    }
}

#[async_trait]
impl RepositoryFetcher for CachedFetcher {
    async fn fetch(&self, reference: &RepoReference) -> Result<RepositoryMetadata, FetchError> {
        let key = reference.cache_key();
        if let Some(entry) = self.entries.get(&key).await {
            debug!(%reference, "repository cache hit");
            return Ok(entry.value);
        }

        let metadata = self.inner.fetch(reference).await?;
        self.entries.insert(&key, metadata.clone()).await;
        Ok(metadata)
    }
}

#[async_trait]
impl Sweep for CachedFetcher {
    async fn sweep(&self) -> usize {
        self.entries.sweep().await
    }
}
