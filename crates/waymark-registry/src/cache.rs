//! Cached route lists and utilities

use crate::record::RouteRecord;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Key under which the full active route list is cached
pub const ROUTE_LIST_KEY: &str = "routes.list";

/// Cache key for a route search
pub fn search_key(method: &str, route_type: Option<u8>) -> String {
    match route_type {
        Some(code) => format!("{}.{}.{}", ROUTE_LIST_KEY, method.to_ascii_uppercase(), code),
        None => format!("{}.{}.all", ROUTE_LIST_KEY, method.to_ascii_uppercase()),
    }
}

/// A cached route list with metadata
#[derive(Debug, Clone)]
pub struct CachedRoutes {
    pub routes: Vec<RouteRecord>,

    /// When the list was stored
    pub saved_at: DateTime<Utc>,

    /// How long the list stays fresh
    pub ttl: Duration,
}

impl CachedRoutes {
    pub fn new(routes: Vec<RouteRecord>, ttl: Duration) -> Self {
        Self {
            routes,
            saved_at: Utc::now(),
            ttl,
        }
    }

    /// Check if the cached list is stale
    pub fn is_stale(&self) -> bool {
        self.age() >= self.ttl
    }

    /// Get the age of the cached list
    pub fn age(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.saved_at)
            .to_std()
            .unwrap_or(Duration::from_secs(0))
    }
}

/// Statistics for the route list cache
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of cached lists
    pub entry_count: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Keyed TTL cache of route lists
///
/// Stale entries are dropped on read. A zero TTL stores nothing.
#[derive(Default)]
pub struct RouteListCache {
    entries: RwLock<HashMap<String, CachedRoutes>>,
    stats: RwLock<CacheStats>,
}

impl RouteListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a fresh cached list by key
    pub async fn fetch(&self, key: &str) -> Option<Vec<RouteRecord>> {
        let fresh = {
            let mut entries = self.entries.write().await;
            if entries.get(key).is_some_and(CachedRoutes::is_stale) {
                entries.remove(key);
            }
            entries.get(key).map(|cached| cached.routes.clone())
        };

        let mut stats = self.stats.write().await;
        if fresh.is_some() {
            stats.hits += 1;
            tracing::trace!(key, "route list cache hit");
        } else {
            stats.misses += 1;
            tracing::trace!(key, "route list cache miss");
        }

        fresh
    }

    /// Store a list under `key` for `ttl`
    pub async fn save(&self, key: &str, routes: Vec<RouteRecord>, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }

        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CachedRoutes::new(routes, ttl));
    }

    pub async fn delete(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Delete every entry whose key starts with `prefix`
    pub async fn delete_prefix(&self, prefix: &str) {
        let mut entries = self.entries.write().await;
        entries.retain(|key, _| !key.starts_with(prefix));
    }

    /// Clear all entries and reset stats
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        *self.stats.write().await = CacheStats::default();
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().await.clone();
        stats.entry_count = self.entries.read().await.len();
        stats
    }
}
