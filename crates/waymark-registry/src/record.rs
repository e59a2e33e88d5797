//! Route records and registration requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::middleware::MiddlewareId;

/// HTTP method used for page routes
pub const PAGE_METHOD: &str = "GET";

/// Handler method used by template routes that do not name one
pub const DEFAULT_TEMPLATE_HANDLER_METHOD: &str = "pageLoad";

/// What a stored route serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Page,
    Api,
    HomePage,
}

impl RouteKind {
    /// Stable storage code: `Page` → 1, `Api` → 2, `HomePage` → 3
    pub fn code(self) -> u8 {
        match self {
            RouteKind::Page => 1,
            RouteKind::Api => 2,
            RouteKind::HomePage => 3,
        }
    }
}

/// Whether a stored route takes part in matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Disabled,
    #[default]
    Active,
}

/// A persisted route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub method: String,
    /// Final template, including any appended language segment
    pub pattern: String,
    pub handler_class: String,
    pub handler_method: Option<String>,
    pub auth: Option<String>,
    pub route_type: RouteKind,
    pub extension_name: Option<String>,
    pub page_name: Option<String>,
    pub template_name: Option<String>,
    pub name: Option<String>,
    pub redirect_url: Option<String>,
    /// Match string of each variant, shortest variant first
    pub variants: Vec<String>,
    pub middlewares: Vec<MiddlewareId>,
    pub status: RouteStatus,
    #[serde(default)]
    pub options: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl RouteRecord {
    /// Creates an active record with no optional fields set
    pub fn new(
        method: impl Into<String>,
        pattern: impl Into<String>,
        handler_class: impl Into<String>,
        route_type: RouteKind,
    ) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            pattern: pattern.into(),
            handler_class: handler_class.into(),
            handler_method: None,
            auth: None,
            route_type,
            extension_name: None,
            page_name: None,
            template_name: None,
            name: None,
            redirect_url: None,
            variants: Vec::new(),
            middlewares: Vec::new(),
            status: RouteStatus::Active,
            options: Map::new(),
            created_at: Utc::now(),
        }
    }

    /// True if this record is stored under `method` and `pattern`
    pub fn is(&self, method: &str, pattern: &str) -> bool {
        self.method.eq_ignore_ascii_case(method) && self.pattern == pattern
    }

    pub fn is_active(&self) -> bool {
        self.status == RouteStatus::Active
    }
}

/// Selects stored routes; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteFilter {
    pub method: Option<String>,
    pub pattern: Option<String>,
    pub route_type: Option<RouteKind>,
    pub status: Option<RouteStatus>,
    pub extension_name: Option<String>,
}

impl RouteFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active() -> Self {
        Self::default().with_status(RouteStatus::Active)
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_route_type(mut self, route_type: RouteKind) -> Self {
        self.route_type = Some(route_type);
        self
    }

    pub fn with_status(mut self, status: RouteStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_extension(mut self, extension_name: impl Into<String>) -> Self {
        self.extension_name = Some(extension_name.into());
        self
    }

    pub fn matches(&self, route: &RouteRecord) -> bool {
        self.method
            .as_deref()
            .map_or(true, |m| route.method.eq_ignore_ascii_case(m))
            && self.pattern.as_deref().map_or(true, |p| route.pattern == p)
            && self.route_type.map_or(true, |t| route.route_type == t)
            && self.status.map_or(true, |s| route.status == s)
            && self
                .extension_name
                .as_deref()
                .map_or(true, |e| route.extension_name.as_deref() == Some(e))
    }
}

/// Request to register a page (or home page) route
#[derive(Debug, Clone, PartialEq)]
pub struct PageRoute {
    pub pattern: String,
    pub handler_class: String,
    pub handler_method: Option<String>,
    pub extension_name: Option<String>,
    pub page_name: Option<String>,
    pub auth: Option<String>,
    pub name: Option<String>,
    /// Append the optional language segment to the pattern
    pub with_language: bool,
}

impl PageRoute {
    pub fn new(pattern: impl Into<String>, handler_class: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            handler_class: handler_class.into(),
            handler_method: None,
            extension_name: None,
            page_name: None,
            auth: None,
            name: None,
            with_language: true,
        }
    }

    pub fn with_handler_method(mut self, method: impl Into<String>) -> Self {
        self.handler_method = Some(method.into());
        self
    }

    pub fn with_extension(mut self, extension_name: impl Into<String>) -> Self {
        self.extension_name = Some(extension_name.into());
        self
    }

    pub fn with_page_name(mut self, page_name: impl Into<String>) -> Self {
        self.page_name = Some(page_name.into());
        self
    }

    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn without_language(mut self) -> Self {
        self.with_language = false;
        self
    }
}

/// Request to register a route rendered from a named template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRoute {
    pub pattern: String,
    pub handler_class: String,
    /// Defaults to [`DEFAULT_TEMPLATE_HANDLER_METHOD`]
    pub handler_method: Option<String>,
    pub template_name: String,
    pub page_name: Option<String>,
    pub auth: Option<String>,
    /// Delete existing routes for this pattern first
    pub replace: bool,
    pub redirect_url: Option<String>,
    pub route_type: RouteKind,
    pub with_language: bool,
}

impl TemplateRoute {
    pub fn new(
        pattern: impl Into<String>,
        handler_class: impl Into<String>,
        template_name: impl Into<String>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            handler_class: handler_class.into(),
            handler_method: None,
            template_name: template_name.into(),
            page_name: None,
            auth: None,
            replace: false,
            redirect_url: None,
            route_type: RouteKind::Page,
            with_language: true,
        }
    }

    pub fn with_handler_method(mut self, method: impl Into<String>) -> Self {
        self.handler_method = Some(method.into());
        self
    }

    pub fn with_page_name(mut self, page_name: impl Into<String>) -> Self {
        self.page_name = Some(page_name.into());
        self
    }

    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }

    pub fn as_home_page(mut self) -> Self {
        self.route_type = RouteKind::HomePage;
        self
    }

    pub fn without_language(mut self) -> Self {
        self.with_language = false;
        self
    }
}

/// Request to register an API route
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRoute {
    pub method: String,
    pub pattern: String,
    pub handler_class: String,
    pub handler_method: Option<String>,
    pub extension_name: Option<String>,
    pub auth: Option<String>,
}

impl ApiRoute {
    pub fn new(
        method: impl Into<String>,
        pattern: impl Into<String>,
        handler_class: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            pattern: pattern.into(),
            handler_class: handler_class.into(),
            handler_method: None,
            extension_name: None,
            auth: None,
        }
    }

    pub fn with_handler_method(mut self, method: impl Into<String>) -> Self {
        self.handler_method = Some(method.into());
        self
    }

    pub fn with_extension(mut self, extension_name: impl Into<String>) -> Self {
        self.extension_name = Some(extension_name.into());
        self
    }

    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_method_is_uppercased() {
        let record = RouteRecord::new("post", "/api/x", "Handler", RouteKind::Api);
        assert_eq!(record.method, "POST");
        assert!(record.is("Post", "/api/x"));
        assert!(record.is_active());
    }

    #[test]
    fn test_filter_matches() {
        let mut record = RouteRecord::new("GET", "/blog", "Blog", RouteKind::Page);
        record.extension_name = Some("blog".to_string());

        assert!(RouteFilter::new().matches(&record));
        assert!(RouteFilter::active().matches(&record));
        assert!(RouteFilter::new().with_method("get").matches(&record));
        assert!(RouteFilter::new().with_extension("blog").matches(&record));
        assert!(!RouteFilter::new().with_extension("shop").matches(&record));
        assert!(!RouteFilter::new().with_route_type(RouteKind::Api).matches(&record));

        record.status = RouteStatus::Disabled;
        assert!(!RouteFilter::active().matches(&record));
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(RouteKind::Page.code(), 1);
        assert_eq!(RouteKind::Api.code(), 2);
        assert_eq!(RouteKind::HomePage.code(), 3);
    }

    #[test]
    fn test_record_serializes() {
        let record = RouteRecord::new("GET", "/", "Home", RouteKind::HomePage);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["route_type"], "home_page");
        assert_eq!(json["status"], "active");

        let back: RouteRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
