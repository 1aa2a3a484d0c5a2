//! Process-local page cache
//!
//! Whole response bodies keyed by request path and query, each with a fixed
//! time to live. There is no partial invalidation: content changes show up
//! when an entry expires or after `clear`.

use crate::metrics::PAGE_CACHE_EVENTS;
use actix_web::web::Bytes;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedPage {
    body: Bytes,
    expires_at: Instant,
}

impl CachedPage {
    #[inline]
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

pub struct PageCache {
    pages: DashMap<String, CachedPage>,
    ttl: Duration,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        debug!(ttl_secs = ttl.as_secs(), "Initializing page cache");
        Self {
            pages: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A live entry for `key`. Expired entries are dropped on the way.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        if let Some(entry) = self.pages.get(key) {
            if !entry.is_expired() {
                PAGE_CACHE_EVENTS.with_label_values(&["hit"]).inc();
                debug!(key, "page cache hit");
                return Some(entry.body.clone());
            }
        }

        // Entry guard must be released before removing.
        self.pages.remove_if(key, |_, entry| entry.is_expired());
        PAGE_CACHE_EVENTS.with_label_values(&["miss"]).inc();
        debug!(key, "page cache miss");
        None
    }

    pub fn insert(&self, key: impl Into<String>, body: Bytes) {
        if self.ttl.is_zero() {
            return;
        }
        let entry = CachedPage {
            body,
            expires_at: Instant::now() + self.ttl,
        };
        self.pages.insert(key.into(), entry);
        PAGE_CACHE_EVENTS.with_label_values(&["store"]).inc();
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let dropped = self.pages.len();
        self.pages.clear();
        PAGE_CACHE_EVENTS.with_label_values(&["clear"]).inc();
        debug!(dropped, "page cache cleared");
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
