//! Cache store abstraction and the in-memory default.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Response};
use bytes::Bytes;
use dashmap::DashMap;
use thiserror::Error;
use tokio::time::Instant;

use crate::cache::CacheKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// A stored response.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CacheEntry {
    /// Replay as a 200 response with the stored headers verbatim.
    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.headers_mut() = self.headers;
        response
    }
}

/// Key-value response store with per-entry TTL.
///
/// Implementations are shared by every request and synchronise internally.
/// `set` fully replaces any previous entry under the key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    async fn set(&self, key: &CacheKey, ttl: Duration, entry: CacheEntry) -> Result<(), CacheError>;
}

struct StoredEntry {
    entry: CacheEntry,
    expires_at: Instant,
}

/// Bounded in-process store.
///
/// Expired entries are dropped when read. When full, expired entries are
/// purged first, then the entry closest to expiry is evicted.
pub struct MemoryCacheStore {
    entries: DashMap<CacheKey, StoredEntry>,
    max_entries: usize,
}

impl MemoryCacheStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&self, now: Instant) {
        self.entries.retain(|_, stored| stored.expires_at > now);
        if self.entries.len() < self.max_entries {
            return;
        }

        let soonest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().expires_at)
            .map(|e| e.key().clone());
        if let Some(key) = soonest {
            tracing::debug!(cache_key = %key, "Evicting cache entry");
            self.entries.remove(&key);
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let now = Instant::now();
        if let Some(stored) = self.entries.get(key) {
            if stored.expires_at > now {
                return Ok(Some(stored.entry.clone()));
            }
        } else {
            return Ok(None);
        }
        // Guard released above; re-check so a fresh concurrent set survives.
        self.entries.remove_if(key, |_, stored| stored.expires_at <= now);
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, ttl: Duration, entry: CacheEntry) -> Result<(), CacheError> {
        let now = Instant::now();
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.make_room(now);
        }
        self.entries.insert(
            key.clone(),
            StoredEntry {
                entry,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}
