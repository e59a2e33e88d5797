//! Route registry - validates, stores and lists routes

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use waymark_router::{classify, install_page_url, is_valid_api_pattern, RouteCategory};

use crate::cache::{search_key, RouteListCache, ROUTE_LIST_KEY};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::middleware::{HandlerId, Middleware, MiddlewareId, RegistryContext};
use crate::record::{
    ApiRoute, PageRoute, RouteFilter, RouteKind, RouteRecord, RouteStatus, TemplateRoute,
    DEFAULT_TEMPLATE_HANDLER_METHOD, PAGE_METHOD,
};
use crate::storage::{MemoryRouteStorage, RouteStorage};
use crate::validate::{find_conflict, ValidatedPattern};

/// Optional language segment appended to page route patterns
///
/// Empty when the pattern already ends with an optional segment.
///
/// # Examples
///
/// ```
/// use waymark_registry::language_pattern;
///
/// assert_eq!(language_pattern("/blog"), "[/{language:[a-z]{2}}]");
/// assert_eq!(language_pattern("/"), "[{language:[a-z]{2}}/]");
/// assert_eq!(language_pattern("/blog[/{slug}]"), "");
/// ```
pub fn language_pattern(pattern: &str) -> &'static str {
    if pattern.ends_with(']') {
        ""
    } else if pattern.ends_with('/') {
        "[{language:[a-z]{2}}/]"
    } else {
        "[/{language:[a-z]{2}}]"
    }
}

/// Route registry
///
/// Cloning is cheap; clones share storage, cache, context and the
/// registration lock.
#[derive(Clone)]
pub struct RouteRegistry {
    config: RegistryConfig,
    storage: Arc<dyn RouteStorage>,
    cache: Arc<RouteListCache>,
    context: Arc<RegistryContext>,
    /// Held from the existence checks until the new route is stored
    registration: Arc<Mutex<()>>,
}

impl RouteRegistry {
    pub fn new(
        config: RegistryConfig,
        storage: Arc<dyn RouteStorage>,
        context: Arc<RegistryContext>,
    ) -> Self {
        debug!(backend = storage.name(), "creating route registry");
        Self {
            config,
            storage,
            cache: Arc::new(RouteListCache::new()),
            context,
            registration: Arc::new(Mutex::new(())),
        }
    }

    /// Registry over a fresh in-memory backend
    pub fn in_memory(config: RegistryConfig, context: RegistryContext) -> Self {
        Self::new(
            config,
            Arc::new(MemoryRouteStorage::new()),
            Arc::new(context),
        )
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn cache(&self) -> &RouteListCache {
        &self.cache
    }

    pub fn context(&self) -> &RegistryContext {
        &self.context
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Register a GET page route
    ///
    /// The language segment is appended when `route.with_language` is set.
    /// Fails if the pattern is taken with or without the language segment.
    pub async fn add_page_route(&self, route: PageRoute) -> Result<RouteRecord> {
        self.add_page_route_as(route, RouteKind::Page).await
    }

    /// Register a GET home page route
    pub async fn add_home_page_route(&self, route: PageRoute) -> Result<RouteRecord> {
        self.add_page_route_as(route, RouteKind::HomePage).await
    }

    async fn add_page_route_as(&self, route: PageRoute, kind: RouteKind) -> Result<RouteRecord> {
        ValidatedPattern::compile(&route.pattern).map_err(rejected)?;
        let _registration = self.registration.lock().await;

        let suffix = language_pattern(&route.pattern);
        let with_suffix = format!("{}{}", route.pattern, suffix);
        if self.has(PAGE_METHOD, &with_suffix).await? || self.has(PAGE_METHOD, &route.pattern).await? {
            return Err(rejected(already_exists(&route.pattern)));
        }

        let pattern = if route.with_language { with_suffix } else { route.pattern };

        let mut record = RouteRecord::new(PAGE_METHOD, pattern, route.handler_class, kind);
        record.handler_method = route.handler_method;
        record.extension_name = route.extension_name;
        record.page_name = route.page_name;
        record.auth = route.auth;
        record.name = route.name;

        self.insert(record).await
    }

    /// Register a GET route rendered from a named template
    ///
    /// With `replace`, existing routes for the pattern (and the home page
    /// route, for home page templates) are deleted first.
    pub async fn save_template_route(&self, route: TemplateRoute) -> Result<RouteRecord> {
        let suffix = language_pattern(&route.pattern);
        let with_suffix = format!("{}{}", route.pattern, suffix);
        let _registration = self.registration.lock().await;

        if route.replace {
            self.delete(PAGE_METHOD, &route.pattern).await?;
            self.delete(PAGE_METHOD, &with_suffix).await?;
            if route.route_type == RouteKind::HomePage {
                self.delete_home_page().await?;
            }
        }

        if self.has(PAGE_METHOD, &route.pattern).await? {
            return Err(rejected(already_exists(&route.pattern)));
        }
        ValidatedPattern::compile(&route.pattern).map_err(rejected)?;

        let pattern = if route.with_language { with_suffix } else { route.pattern };
        if self.has(PAGE_METHOD, &pattern).await? {
            return Err(rejected(already_exists(&pattern)));
        }

        let mut record = RouteRecord::new(PAGE_METHOD, pattern, route.handler_class, route.route_type);
        record.handler_method = Some(
            route
                .handler_method
                .unwrap_or_else(|| DEFAULT_TEMPLATE_HANDLER_METHOD.to_string()),
        );
        record.template_name = Some(route.template_name);
        record.page_name = route.page_name;
        record.auth = route.auth;
        record.redirect_url = route.redirect_url;

        self.insert(record).await
    }

    /// Register an API route; the pattern must start with `/api`
    pub async fn add_api_route(&self, route: ApiRoute) -> Result<RouteRecord> {
        ValidatedPattern::compile(&route.pattern).map_err(rejected)?;

        if !is_valid_api_pattern(&route.pattern) {
            return Err(rejected(RegistryError::InvalidApiPattern(route.pattern)));
        }

        let _registration = self.registration.lock().await;
        if self.has(&route.method, &route.pattern).await? {
            return Err(rejected(RegistryError::AlreadyExists {
                method: route.method.to_ascii_uppercase(),
                pattern: route.pattern,
            }));
        }

        let mut record = RouteRecord::new(route.method, route.pattern, route.handler_class, RouteKind::Api);
        record.handler_method = route.handler_method;
        record.extension_name = route.extension_name;
        record.auth = route.auth;

        self.insert(record).await
    }

    /// Resolve middleware, check for conflicts with active routes and persist
    ///
    /// Callers hold the registration lock.
    async fn insert(&self, mut record: RouteRecord) -> Result<RouteRecord> {
        let validated = ValidatedPattern::compile(&record.pattern).map_err(rejected)?;
        record.variants = validated.match_strings();
        record.middlewares = self.resolve_middlewares(&record.handler_class);

        self.invalidate().await;

        let active = self.get_all_routes().await?;
        if let Some(existing) = find_conflict(&record.method, &validated, &active) {
            return Err(rejected(RegistryError::Conflict {
                method: record.method.clone(),
                pattern: record.pattern.clone(),
                existing: existing.pattern.clone(),
            }));
        }

        self.storage.add_route(record.clone()).await?;
        self.invalidate().await;

        info!(
            method = %record.method,
            pattern = %record.pattern,
            kind = ?record.route_type,
            "route registered"
        );
        Ok(record)
    }

    // ------------------------------------------------------------------------
    // Storage delegation
    // ------------------------------------------------------------------------

    pub async fn has(&self, method: &str, pattern: &str) -> Result<bool> {
        Ok(self.storage.has_route(method, pattern).await?)
    }

    /// Delete a route, returning whether it existed
    pub async fn delete(&self, method: &str, pattern: &str) -> Result<bool> {
        let deleted = self.storage.delete_route(method, pattern).await?;
        if deleted {
            self.invalidate().await;
            info!(method, pattern, "route deleted");
        }
        Ok(deleted)
    }

    pub async fn delete_routes(&self, filter: &RouteFilter) -> Result<usize> {
        let deleted = self.storage.delete_routes(filter).await?;
        if deleted > 0 {
            self.invalidate().await;
            info!(count = deleted, "routes deleted");
        }
        Ok(deleted)
    }

    pub async fn delete_home_page(&self) -> Result<usize> {
        self.delete_routes(&RouteFilter::new().with_route_type(RouteKind::HomePage))
            .await
    }

    pub async fn get_route(&self, method: &str, pattern: &str) -> Result<Option<RouteRecord>> {
        Ok(self.storage.get_route(method, pattern).await?)
    }

    /// Routes matching `filter`, uncached
    pub async fn get_routes(&self, filter: &RouteFilter) -> Result<Vec<RouteRecord>> {
        Ok(self.storage.get_routes(filter).await?)
    }

    pub async fn get_home_page_route(&self) -> Result<Option<RouteRecord>> {
        Ok(self.storage.get_home_page_route().await?)
    }

    pub async fn set_routes_status(&self, filter: &RouteFilter, status: RouteStatus) -> Result<usize> {
        let updated = self.storage.set_routes_status(filter, status).await?;
        self.invalidate().await;
        info!(count = updated, ?status, "route status changed");
        Ok(updated)
    }

    pub async fn set_redirect_url(&self, method: &str, pattern: &str, url: Option<String>) -> Result<bool> {
        let saved = self.storage.save_redirect_url(method, pattern, url).await?;
        self.invalidate().await;
        Ok(saved)
    }

    pub async fn save_route_options(
        &self,
        method: &str,
        pattern: &str,
        options: Map<String, Value>,
    ) -> Result<bool> {
        let saved = self.storage.save_route_options(method, pattern, options).await?;
        self.invalidate().await;
        Ok(saved)
    }

    // ------------------------------------------------------------------------
    // Cached listings
    // ------------------------------------------------------------------------

    /// All active routes
    pub async fn get_all_routes(&self) -> Result<Vec<RouteRecord>> {
        if let Some(routes) = self.cache.fetch(ROUTE_LIST_KEY).await {
            return Ok(routes);
        }

        let routes = self.storage.get_routes(&RouteFilter::active()).await?;
        self.cache
            .save(ROUTE_LIST_KEY, routes.clone(), self.config.cache_ttl())
            .await;
        Ok(routes)
    }

    /// Active routes for a method, optionally restricted to one kind
    pub async fn search_routes(&self, method: &str, route_type: Option<RouteKind>) -> Result<Vec<RouteRecord>> {
        let key = search_key(method, route_type.map(RouteKind::code));
        if let Some(routes) = self.cache.fetch(&key).await {
            return Ok(routes);
        }

        let routes = self.storage.search_routes(method, route_type).await?;
        self.cache.save(&key, routes.clone(), self.config.cache_ttl()).await;
        Ok(routes)
    }

    async fn invalidate(&self) {
        self.cache.delete_prefix(ROUTE_LIST_KEY).await;
    }

    // ------------------------------------------------------------------------
    // Classification and middleware
    // ------------------------------------------------------------------------

    /// Classify a request path against the configured base path
    pub fn classify_request(&self, path: &str) -> RouteCategory {
        classify(path, &self.config.routing.base_path)
    }

    pub fn install_page_url(&self) -> String {
        install_page_url(&self.config.routing.domain, &self.config.routing.base_path)
    }

    /// Middleware declared by a handler; empty when unknown
    pub fn resolve_middlewares(&self, handler_class: &str) -> Vec<MiddlewareId> {
        self.context
            .handlers
            .middlewares(&HandlerId(handler_class.to_string()))
            .unwrap_or_default()
    }

    /// Pooled middleware instances for a stored route
    ///
    /// Ids with no registered factory are skipped.
    pub async fn middleware_instances(&self, route: &RouteRecord) -> Vec<Arc<dyn Middleware>> {
        let mut instances = Vec::with_capacity(route.middlewares.len());
        for id in &route.middlewares {
            match self.context.middlewares.get_or_create(id).await {
                Some(instance) => instances.push(instance),
                None => warn!(middleware = %id, pattern = %route.pattern, "no factory for middleware"),
            }
        }
        instances
    }
}

fn already_exists(pattern: &str) -> RegistryError {
    RegistryError::AlreadyExists {
        method: PAGE_METHOD.to_string(),
        pattern: pattern.to_string(),
    }
}

fn rejected(err: RegistryError) -> RegistryError {
    warn!(error = %err, "route registration rejected");
    err
}
