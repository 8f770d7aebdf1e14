//! In-memory caches of the Groove façade
//!
//! - [`SongCache`]: raw song pages by source URL, never expired
//! - [`CategoryCache`]: albums per category, with a TTL and a fallback on the
//!   stale entry when a refresh fails
//!
//! Both caches are shared between concurrent operations and cheap to clone.

use crate::models::SongDetailsResponse;
use groovesource::Album;
use moka::future::Cache as MokaCache;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Song pages as returned by the worker API
///
/// Payloads are kept unconverted so that presentation settings are applied on
/// every read. Entries are never evicted: the cache lives as long as the
/// extension and grows with the number of songs visited.
#[derive(Clone)]
pub struct SongCache {
    songs: Arc<MokaCache<String, SongDetailsResponse>>,
}

impl SongCache {
    pub fn new() -> Self {
        Self {
            songs: Arc::new(MokaCache::builder().build()),
        }
    }

    pub async fn get(&self, url: &str) -> Option<SongDetailsResponse> {
        self.songs.get(url).await
    }

    pub async fn put(&self, url: String, response: SongDetailsResponse) {
        self.songs.insert(url, response).await;
    }
}

impl Default for SongCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Albums of one category, stamped with their fetch time
#[derive(Debug, Clone)]
pub struct CategoryCacheEntry {
    pub fetched_at: Instant,
    pub category_name: String,
    pub albums: Vec<Album>,
}

impl CategoryCacheEntry {
    pub fn new(category_name: impl Into<String>, albums: Vec<Album>) -> Self {
        Self {
            fetched_at: Instant::now(),
            category_name: category_name.into(),
            albums,
        }
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    /// True while the age does not exceed `ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() <= ttl
    }
}

/// Category listings keyed by the configured category URL
///
/// A stale entry is kept: it is the fallback when a refresh fails or comes
/// back empty.
#[derive(Debug, Clone)]
pub struct CategoryCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CategoryCacheEntry>>>,
}

impl CategoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Entry for `url`, fresh or not
    pub async fn get(&self, url: &str) -> Option<CategoryCacheEntry> {
        self.entries.read().await.get(url).cloned()
    }

    /// Albums of `url` while the entry is fresh
    pub async fn fresh(&self, url: &str) -> Option<Vec<Album>> {
        self.get(url)
            .await
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.albums)
    }

    /// Albums of `url` whatever their age
    pub async fn any(&self, url: &str) -> Option<Vec<Album>> {
        self.get(url).await.map(|entry| entry.albums)
    }

    /// Replaces the entry of `url`
    pub async fn store(&self, url: impl Into<String>, category_name: &str, albums: Vec<Album>) {
        self.entries
            .write()
            .await
            .insert(url.into(), CategoryCacheEntry::new(category_name, albums));
    }
}
