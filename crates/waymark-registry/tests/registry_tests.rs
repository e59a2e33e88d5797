//! Integration tests for waymark-registry
//!
//! Tests are organized by feature area and cover:
//! - Page, home page, template and API registration
//! - Rejections (invalid templates, duplicates, conflicts)
//! - Cached route listings
//! - Middleware resolution
//! - Configuration loading

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Map};
use std::sync::Arc;
use tempfile::TempDir;
use waymark_registry::*;
use waymark_router::RouteCategory;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn registry() -> RouteRegistry {
    init_tracing();
    RouteRegistry::in_memory(RegistryConfig::default(), RegistryContext::default())
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_page_route_gets_language_segment() {
    let registry = registry();

    let record = registry
        .add_page_route(PageRoute::new("/blog", "Blog").with_page_name("blog.index"))
        .await
        .unwrap();

    assert_eq!(record.method, "GET");
    assert_eq!(record.pattern, "/blog[/{language:[a-z]{2}}]");
    assert_eq!(record.route_type, RouteKind::Page);
    assert_eq!(record.page_name.as_deref(), Some("blog.index"));
    assert_eq!(
        record.variants,
        vec!["/blog".to_string(), "/blog/([a-z]{2})".to_string()]
    );
    assert!(registry.has("get", "/blog[/{language:[a-z]{2}}]").await.unwrap());
}

#[tokio::test]
async fn test_page_route_without_language() {
    let registry = registry();

    let record = registry
        .add_page_route(PageRoute::new("/about", "About").without_language())
        .await
        .unwrap();

    assert_eq!(record.pattern, "/about");
    assert_eq!(record.variants, vec!["/about".to_string()]);
}

#[tokio::test]
async fn test_duplicate_page_route_is_rejected() {
    let registry = registry();
    registry
        .add_page_route(PageRoute::new("/blog", "Blog"))
        .await
        .unwrap();

    let err = registry
        .add_page_route(PageRoute::new("/blog", "Other").without_language())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists { .. }));
}

#[tokio::test]
async fn test_home_page_route() {
    let registry = registry();
    assert!(registry.get_home_page_route().await.unwrap().is_none());

    registry
        .add_home_page_route(PageRoute::new("/", "Home"))
        .await
        .unwrap();

    let home = registry.get_home_page_route().await.unwrap().unwrap();
    assert_eq!(home.pattern, "/[{language:[a-z]{2}}/]");
    assert_eq!(home.route_type, RouteKind::HomePage);

    assert_eq!(registry.delete_home_page().await.unwrap(), 1);
    assert!(registry.get_home_page_route().await.unwrap().is_none());
}

#[tokio::test]
async fn test_template_route_defaults() {
    let registry = registry();

    let record = registry
        .save_template_route(TemplateRoute::new("/contact", "Pages", "contact.html"))
        .await
        .unwrap();

    assert_eq!(record.handler_method.as_deref(), Some(DEFAULT_TEMPLATE_HANDLER_METHOD));
    assert_eq!(record.template_name.as_deref(), Some("contact.html"));
}

#[tokio::test]
async fn test_template_route_replace() {
    let registry = registry();
    registry
        .save_template_route(TemplateRoute::new("/contact", "Pages", "old.html"))
        .await
        .unwrap();

    let err = registry
        .save_template_route(TemplateRoute::new("/contact", "Pages", "new.html"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists { .. }));

    let record = registry
        .save_template_route(
            TemplateRoute::new("/contact", "Pages", "new.html")
                .replacing()
                .with_redirect_url("/thanks"),
        )
        .await
        .unwrap();
    assert_eq!(record.template_name.as_deref(), Some("new.html"));
    assert_eq!(record.redirect_url.as_deref(), Some("/thanks"));
    assert_eq!(registry.get_all_routes().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_template_home_page_replaces_previous_home() {
    let registry = registry();
    registry
        .add_home_page_route(PageRoute::new("/", "Home"))
        .await
        .unwrap();

    registry
        .save_template_route(
            TemplateRoute::new("/start", "Landing", "landing.html")
                .as_home_page()
                .replacing(),
        )
        .await
        .unwrap();

    let homes = registry
        .get_routes(&RouteFilter::new().with_route_type(RouteKind::HomePage))
        .await
        .unwrap();
    assert_eq!(homes.len(), 1);
    assert_eq!(homes[0].handler_class, "Landing");
}

#[tokio::test]
async fn test_api_route() {
    let registry = registry();

    let record = registry
        .add_api_route(
            ApiRoute::new("post", "/api/posts/{id:[0-9]+}", "PostApi")
                .with_handler_method("update")
                .with_extension("blog"),
        )
        .await
        .unwrap();

    assert_eq!(record.method, "POST");
    assert_eq!(record.route_type, RouteKind::Api);
    assert_eq!(record.variants, vec!["/api/posts/([0-9]+)".to_string()]);
    assert_eq!(record.extension_name.as_deref(), Some("blog"));
}

// ============================================================================
// Rejections
// ============================================================================

#[rstest]
#[case("/posts")]
#[case("posts/api")]
#[case("/v1/api/posts")]
#[tokio::test]
async fn test_api_route_requires_api_prefix(#[case] pattern: &str) {
    let err = registry()
        .add_api_route(ApiRoute::new("GET", pattern, "Api"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidApiPattern(p) if p == pattern));
}

#[rstest]
#[case("/api/a[b")]
#[case("/api/a]b")]
#[case("/api/{}")]
#[case("/api/[]")]
#[tokio::test]
async fn test_invalid_template_is_rejected(#[case] pattern: &str) {
    let err = registry()
        .add_api_route(ApiRoute::new("GET", pattern, "Api"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidPattern { .. }), "{:?}", err);
}

#[tokio::test]
async fn test_invalid_placeholder_regex_is_rejected() {
    let err = registry()
        .add_page_route(PageRoute::new("/items/{id:[0-9}", "Items"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidRegex { .. }));
}

#[tokio::test]
async fn test_duplicate_api_route_is_rejected() {
    let registry = registry();
    registry
        .add_api_route(ApiRoute::new("GET", "/api/posts", "PostApi"))
        .await
        .unwrap();

    let err = registry
        .add_api_route(ApiRoute::new("get", "/api/posts", "PostApi"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::AlreadyExists { ref method, .. } if method == "GET"
    ));
}

#[tokio::test]
async fn test_conflicting_routes() {
    let registry = registry();
    registry
        .add_api_route(ApiRoute::new("GET", "/api/users/{id}", "Users"))
        .await
        .unwrap();

    let err = registry
        .add_api_route(ApiRoute::new("GET", "/api/users/{name}", "Users"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Conflict { ref existing, .. } if existing == "/api/users/{id}"
    ));

    let err = registry
        .add_api_route(ApiRoute::new("GET", "/api/users/me", "Me"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Conflict { .. }));

    // Other methods do not collide
    registry
        .add_api_route(ApiRoute::new("DELETE", "/api/users/{name}", "Users"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_disabled_routes_do_not_conflict() {
    let registry = registry();
    let users = registry
        .add_page_route(PageRoute::new("/users/{id}", "Users"))
        .await
        .unwrap();

    assert!(registry
        .add_page_route(PageRoute::new("/users/new", "NewUser"))
        .await
        .is_err());

    let disabled = registry
        .set_routes_status(
            &RouteFilter::new().with_pattern(users.pattern.clone()),
            RouteStatus::Disabled,
        )
        .await
        .unwrap();
    assert_eq!(disabled, 1);

    registry
        .add_page_route(PageRoute::new("/users/new", "NewUser"))
        .await
        .unwrap();
}

/// Memory storage that yields to the scheduler on lookups, listings and inserts
struct YieldingStorage(MemoryRouteStorage);

#[async_trait::async_trait]
impl RouteStorage for YieldingStorage {
    async fn add_route(&self, route: RouteRecord) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        self.0.add_route(route).await
    }

    async fn has_route(&self, method: &str, pattern: &str) -> anyhow::Result<bool> {
        tokio::task::yield_now().await;
        self.0.has_route(method, pattern).await
    }

    async fn get_route(&self, method: &str, pattern: &str) -> anyhow::Result<Option<RouteRecord>> {
        self.0.get_route(method, pattern).await
    }

    async fn delete_route(&self, method: &str, pattern: &str) -> anyhow::Result<bool> {
        self.0.delete_route(method, pattern).await
    }

    async fn delete_routes(&self, filter: &RouteFilter) -> anyhow::Result<usize> {
        self.0.delete_routes(filter).await
    }

    async fn get_routes(&self, filter: &RouteFilter) -> anyhow::Result<Vec<RouteRecord>> {
        tokio::task::yield_now().await;
        self.0.get_routes(filter).await
    }

    async fn set_routes_status(&self, filter: &RouteFilter, status: RouteStatus) -> anyhow::Result<usize> {
        self.0.set_routes_status(filter, status).await
    }

    async fn save_redirect_url(&self, method: &str, pattern: &str, url: Option<String>) -> anyhow::Result<bool> {
        self.0.save_redirect_url(method, pattern, url).await
    }

    async fn save_route_options(
        &self,
        method: &str,
        pattern: &str,
        options: Map<String, serde_json::Value>,
    ) -> anyhow::Result<bool> {
        self.0.save_route_options(method, pattern, options).await
    }

    fn name(&self) -> &'static str {
        "yielding"
    }
}

fn yielding_registry() -> RouteRegistry {
    init_tracing();
    RouteRegistry::new(
        RegistryConfig::default(),
        Arc::new(YieldingStorage(MemoryRouteStorage::new())),
        Arc::new(RegistryContext::default()),
    )
}

#[tokio::test]
async fn test_concurrent_conflicting_registrations() {
    let registry = yielding_registry();
    let other = registry.clone();

    let (first, second) = tokio::join!(
        registry.add_api_route(ApiRoute::new("GET", "/api/users/{id}", "Users")),
        other.add_api_route(ApiRoute::new("GET", "/api/users/{name}", "Users")),
    );

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let err = first.err().or(second.err()).unwrap();
    assert!(matches!(err, RegistryError::Conflict { .. }), "{:?}", err);
    assert_eq!(registry.get_routes(&RouteFilter::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_duplicate_page_registrations() {
    let registry = yielding_registry();

    let (first, second) = tokio::join!(
        registry.add_page_route(PageRoute::new("/blog", "Blog")),
        registry.save_template_route(TemplateRoute::new("/blog", "Blog", "blog.html")),
    );

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let err = first.err().or(second.err()).unwrap();
    assert!(matches!(err, RegistryError::AlreadyExists { .. }), "{:?}", err);
    assert_eq!(registry.get_routes(&RouteFilter::new()).await.unwrap().len(), 1);
}

// ============================================================================
// Listings and cache
// ============================================================================

#[tokio::test]
async fn test_search_routes() {
    let registry = registry();
    registry
        .add_page_route(PageRoute::new("/a", "A"))
        .await
        .unwrap();
    registry
        .add_home_page_route(PageRoute::new("/", "Home"))
        .await
        .unwrap();
    registry
        .add_api_route(ApiRoute::new("POST", "/api/a", "A"))
        .await
        .unwrap();

    assert_eq!(registry.search_routes("GET", None).await.unwrap().len(), 2);
    assert_eq!(
        registry
            .search_routes("GET", Some(RouteKind::Page))
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        registry
            .search_routes("post", Some(RouteKind::Api))
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(registry.search_routes("PUT", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_route_lists_are_cached() {
    init_tracing();
    let storage = Arc::new(MemoryRouteStorage::new());
    let registry = RouteRegistry::new(
        RegistryConfig::default().with_cache_save_time(60),
        storage.clone(),
        Arc::new(RegistryContext::default()),
    );

    registry
        .add_page_route(PageRoute::new("/a", "A"))
        .await
        .unwrap();
    assert_eq!(registry.get_all_routes().await.unwrap().len(), 1);

    // Written behind the registry's back: not visible until invalidated
    storage
        .add_route(RouteRecord::new("GET", "/b", "B", RouteKind::Page))
        .await
        .unwrap();
    assert_eq!(registry.get_all_routes().await.unwrap().len(), 1);
    assert!(registry.cache().stats().await.hits >= 1);

    assert!(registry.delete("GET", "/a[/{language:[a-z]{2}}]").await.unwrap());
    let routes = registry.get_all_routes().await.unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].pattern, "/b");
}

#[tokio::test]
async fn test_zero_save_time_disables_cache() {
    init_tracing();
    let storage = Arc::new(MemoryRouteStorage::new());
    let registry = RouteRegistry::new(
        RegistryConfig::default().with_cache_save_time(0),
        storage.clone(),
        Arc::new(RegistryContext::default()),
    );

    assert!(registry.get_all_routes().await.unwrap().is_empty());
    storage
        .add_route(RouteRecord::new("GET", "/b", "B", RouteKind::Page))
        .await
        .unwrap();
    assert_eq!(registry.get_all_routes().await.unwrap().len(), 1);
    assert_eq!(registry.cache().stats().await.entry_count, 0);
}

#[tokio::test]
async fn test_redirect_and_options() {
    let registry = registry();
    let record = registry
        .add_page_route(PageRoute::new("/old", "Old").without_language())
        .await
        .unwrap();

    assert!(registry
        .set_redirect_url("GET", &record.pattern, Some("/new".to_string()))
        .await
        .unwrap());

    let mut options = Map::new();
    options.insert("cache".to_string(), json!(true));
    assert!(registry
        .save_route_options("GET", &record.pattern, options)
        .await
        .unwrap());
    assert!(!registry
        .save_route_options("GET", "/missing", Map::new())
        .await
        .unwrap());

    let stored = registry.get_route("GET", "/old").await.unwrap().unwrap();
    assert_eq!(stored.redirect_url.as_deref(), Some("/new"));
    assert_eq!(stored.options["cache"], json!(true));
}

#[tokio::test]
async fn test_delete_routes_by_extension() {
    let registry = registry();
    registry
        .add_page_route(PageRoute::new("/shop", "Shop").with_extension("shop"))
        .await
        .unwrap();
    registry
        .add_api_route(ApiRoute::new("GET", "/api/shop", "ShopApi").with_extension("shop"))
        .await
        .unwrap();
    registry
        .add_page_route(PageRoute::new("/blog", "Blog").with_extension("blog"))
        .await
        .unwrap();

    let deleted = registry
        .delete_routes(&RouteFilter::new().with_extension("shop"))
        .await
        .unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(registry.get_all_routes().await.unwrap().len(), 1);
}

// ============================================================================
// Middleware
// ============================================================================

struct Named(MiddlewareId);

impl Middleware for Named {
    fn id(&self) -> &MiddlewareId {
        &self.0
    }
}

#[tokio::test]
async fn test_middleware_resolution() {
    init_tracing();
    let handlers = HandlerRegistry::new()
        .with_handler("Admin", Arc::new(StaticHandler::new(["auth", "csrf"])));
    let pool = MiddlewarePool::new().with_factory("auth", || {
        Arc::new(Named(MiddlewareId::from("auth"))) as Arc<dyn Middleware>
    });
    let registry = RouteRegistry::in_memory(
        RegistryConfig::default(),
        RegistryContext::new(handlers, pool),
    );

    let admin = registry
        .add_page_route(PageRoute::new("/dashboard", "Admin"))
        .await
        .unwrap();
    assert_eq!(
        admin.middlewares,
        vec![MiddlewareId::from("auth"), MiddlewareId::from("csrf")]
    );

    let plain = registry
        .add_page_route(PageRoute::new("/about", "Unknown"))
        .await
        .unwrap();
    assert!(plain.middlewares.is_empty());

    // csrf has no factory and is skipped
    let first = registry.middleware_instances(&admin).await;
    let second = registry.middleware_instances(&admin).await;
    assert_eq!(first.len(), 1);
    assert!(Arc::ptr_eq(&first[0], &second[0]));
    assert_eq!(registry.context().middlewares.size().await, 1);
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_registry_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("waymark.toml");
    std::fs::write(
        &path,
        "[routing]\nbase_path = \"/portal\"\ndomain = \"https://example.com\"\n",
    )
    .unwrap();

    let config = RegistryConfig::load(&path).unwrap();
    let registry = RouteRegistry::in_memory(config, RegistryContext::default());

    assert_eq!(registry.classify_request("/portal/admin"), RouteCategory::AdminPage);
    assert_eq!(registry.classify_request("/portal/api/admin/x"), RouteCategory::AdminApi);
    assert_eq!(
        registry.install_page_url(),
        "https://example.com/portal/admin/install"
    );
}
