//! In-memory storage backend for route records

use crate::record::{RouteFilter, RouteRecord, RouteStatus};
use crate::storage::RouteStorage;
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage backend
///
/// Keeps routes in a Vec so listings come back in insertion order.
/// Fast but non-persistent - routes are lost on restart.
#[derive(Clone)]
pub struct MemoryRouteStorage {
    routes: Arc<RwLock<Vec<RouteRecord>>>,
}

impl MemoryRouteStorage {
    /// Create a new memory storage backend
    pub fn new() -> Self {
        Self {
            routes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get number of stored routes
    pub async fn size(&self) -> usize {
        self.routes.read().await.len()
    }

    /// Apply `update` to the route stored under `(method, pattern)`
    async fn update_route<F>(&self, method: &str, pattern: &str, update: F) -> bool
    where
        F: FnOnce(&mut RouteRecord),
    {
        let mut routes = self.routes.write().await;
        match routes.iter_mut().find(|route| route.is(method, pattern)) {
            Some(route) => {
                update(route);
                true
            }
            None => false,
        }
    }
}

impl Default for MemoryRouteStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RouteStorage for MemoryRouteStorage {
    async fn add_route(&self, route: RouteRecord) -> Result<()> {
        let mut routes = self.routes.write().await;
        if routes.iter().any(|r| r.is(&route.method, &route.pattern)) {
            bail!("route {} {} is already stored", route.method, route.pattern);
        }
        routes.push(route);
        Ok(())
    }

    async fn has_route(&self, method: &str, pattern: &str) -> Result<bool> {
        let routes = self.routes.read().await;
        Ok(routes.iter().any(|r| r.is(method, pattern)))
    }

    async fn get_route(&self, method: &str, pattern: &str) -> Result<Option<RouteRecord>> {
        let routes = self.routes.read().await;
        Ok(routes.iter().find(|r| r.is(method, pattern)).cloned())
    }

    async fn delete_route(&self, method: &str, pattern: &str) -> Result<bool> {
        let mut routes = self.routes.write().await;
        let before = routes.len();
        routes.retain(|r| !r.is(method, pattern));
        Ok(routes.len() != before)
    }

    async fn delete_routes(&self, filter: &RouteFilter) -> Result<usize> {
        let mut routes = self.routes.write().await;
        let before = routes.len();
        routes.retain(|r| !filter.matches(r));
        Ok(before - routes.len())
    }

    async fn get_routes(&self, filter: &RouteFilter) -> Result<Vec<RouteRecord>> {
        let routes = self.routes.read().await;
        Ok(routes.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn set_routes_status(&self, filter: &RouteFilter, status: RouteStatus) -> Result<usize> {
        let mut routes = self.routes.write().await;
        let mut updated = 0;
        for route in routes.iter_mut().filter(|r| filter.matches(r)) {
            route.status = status;
            updated += 1;
        }
        Ok(updated)
    }

    async fn save_redirect_url(&self, method: &str, pattern: &str, url: Option<String>) -> Result<bool> {
        Ok(self
            .update_route(method, pattern, |route| route.redirect_url = url)
            .await)
    }

    async fn save_route_options(&self, method: &str, pattern: &str, options: Map<String, Value>) -> Result<bool> {
        Ok(self
            .update_route(method, pattern, |route| route.options.extend(options))
            .await)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
