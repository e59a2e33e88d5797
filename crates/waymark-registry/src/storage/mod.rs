//! Storage backends for route records

use crate::record::{RouteFilter, RouteKind, RouteRecord, RouteStatus};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod memory;

pub use memory::MemoryRouteStorage;

/// Trait for route storage backends
///
/// Routes are keyed by `(method, pattern)`; methods compare case-insensitively.
#[async_trait]
pub trait RouteStorage: Send + Sync {
    /// Persist a new route; fails if `(method, pattern)` is taken
    async fn add_route(&self, route: RouteRecord) -> Result<()>;

    /// Check if a route exists
    async fn has_route(&self, method: &str, pattern: &str) -> Result<bool>;

    /// Get a route by key
    async fn get_route(&self, method: &str, pattern: &str) -> Result<Option<RouteRecord>>;

    /// Delete a route, returning whether it existed
    async fn delete_route(&self, method: &str, pattern: &str) -> Result<bool>;

    /// Delete every route matching the filter, returning how many went
    async fn delete_routes(&self, filter: &RouteFilter) -> Result<usize>;

    /// Routes matching the filter, in insertion order
    async fn get_routes(&self, filter: &RouteFilter) -> Result<Vec<RouteRecord>>;

    /// Active routes for a method, optionally restricted to one kind
    async fn search_routes(&self, method: &str, route_type: Option<RouteKind>) -> Result<Vec<RouteRecord>> {
        let mut filter = RouteFilter::active().with_method(method);
        filter.route_type = route_type;
        self.get_routes(&filter).await
    }

    /// Set the status of every route matching the filter
    async fn set_routes_status(&self, filter: &RouteFilter, status: RouteStatus) -> Result<usize>;

    /// Set or clear a route's redirect URL, returning whether the route exists
    async fn save_redirect_url(&self, method: &str, pattern: &str, url: Option<String>) -> Result<bool>;

    /// Merge options into a route's option map, returning whether the route exists
    async fn save_route_options(&self, method: &str, pattern: &str, options: Map<String, Value>) -> Result<bool>;

    /// The first active home page route
    async fn get_home_page_route(&self) -> Result<Option<RouteRecord>> {
        let filter = RouteFilter::active().with_route_type(RouteKind::HomePage);
        Ok(self.get_routes(&filter).await?.into_iter().next())
    }

    /// Get storage backend name
    fn name(&self) -> &'static str;
}
