//! # Waymark Registry
//!
//! The registration layer on top of `waymark-router`:
//!
//! - **Route records**: page, home page, template and API routes
//! - **Validation**: template errors, placeholder regex errors and conflicts
//!   with already registered routes are rejected before anything is stored
//! - **Pluggable storage**: async [`RouteStorage`] trait, in-memory backend
//! - **Cached listings**: active route lists kept for `cache.save_time` seconds
//! - **Middleware resolution**: handlers declare middleware ids, a pool
//!   constructs each middleware once
//!
//! ## Example
//!
//! ```rust
//! use waymark_registry::{ApiRoute, PageRoute, RegistryConfig, RegistryContext, RouteRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = RouteRegistry::in_memory(RegistryConfig::default(), RegistryContext::default());
//!
//!     let page = registry
//!         .add_page_route(PageRoute::new("/blog", "BlogController"))
//!         .await
//!         .unwrap();
//!     assert_eq!(page.pattern, "/blog[/{language:[a-z]{2}}]");
//!
//!     registry
//!         .add_api_route(ApiRoute::new("POST", "/api/posts", "PostApi"))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(registry.get_all_routes().await.unwrap().len(), 2);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod record;
pub mod registry;
pub mod storage;
pub mod validate;

pub use cache::{CacheStats, CachedRoutes, RouteListCache, ROUTE_LIST_KEY};
pub use config::{CacheConfig, RegistryConfig, RoutingConfig};
pub use error::{RegistryError, Result};
pub use middleware::{
    HandlerDescriptor, HandlerId, HandlerRegistry, Middleware, MiddlewareId, MiddlewarePool,
    RegistryContext, StaticHandler,
};
pub use record::{
    ApiRoute, PageRoute, RouteFilter, RouteKind, RouteRecord, RouteStatus, TemplateRoute,
    DEFAULT_TEMPLATE_HANDLER_METHOD, PAGE_METHOD,
};
pub use registry::{language_pattern, RouteRegistry};
pub use storage::{MemoryRouteStorage, RouteStorage};
pub use validate::{find_conflict, ValidatedPattern};
