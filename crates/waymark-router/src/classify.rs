//! Request path classification
//!
//! Buckets a concrete request path into a [`RouteCategory`] by looking at
//! segment positions only. Classification never fails.

use crate::path::{normalize_path, strip_base_prefix, PathSegments};

/// Path of the installer page, relative to the base path
pub const INSTALL_PAGE_PATH: &str = "admin/install";

const SYSTEM_API_PREFIX: &str = "/core/api/";
const ADMIN_PREFIX: &str = "/admin";
const API_PATTERN_PREFIX: &str = "/api";
const API_INSTALL_SUFFIX: &str = "core/api/install/";

/// Category of an incoming request path
///
/// # Examples
///
/// ```
/// use waymark_router::{classify, RouteCategory};
///
/// assert_eq!(classify("/core/api/users", ""), RouteCategory::SystemApi);
/// assert_eq!(classify("/api/admin/widgets", ""), RouteCategory::AdminApi);
/// assert_eq!(classify("/en", ""), RouteCategory::HomePage);
/// ```
///
/// # Codes
///
/// Each category has a stable numeric code for storage:
/// `Unknown` → 0, `HomePage` → 1, `AdminPage` → 2, `SystemApi` → 3,
/// `Api` → 4, `AdminApi` → 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RouteCategory {
    /// Nothing matched
    #[default]
    Unknown,
    /// `/` or a bare two-letter language segment such as `/en`
    HomePage,
    /// `/admin` and one level below it
    AdminPage,
    /// `/core/api/...`
    SystemApi,
    /// `/api/...`
    Api,
    /// `/api/admin/...` or `/api/<x>/admin/...`
    AdminApi,
}

impl RouteCategory {
    pub fn code(self) -> u8 {
        match self {
            RouteCategory::Unknown => 0,
            RouteCategory::HomePage => 1,
            RouteCategory::AdminPage => 2,
            RouteCategory::SystemApi => 3,
            RouteCategory::Api => 4,
            RouteCategory::AdminApi => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(RouteCategory::Unknown),
            1 => Some(RouteCategory::HomePage),
            2 => Some(RouteCategory::AdminPage),
            3 => Some(RouteCategory::SystemApi),
            4 => Some(RouteCategory::Api),
            5 => Some(RouteCategory::AdminApi),
            _ => None,
        }
    }

    /// True for `Api`, `AdminApi` and `SystemApi`
    pub fn is_api(self) -> bool {
        matches!(
            self,
            RouteCategory::Api | RouteCategory::AdminApi | RouteCategory::SystemApi
        )
    }
}

/// Classifies a request path (pure function)
///
/// The path is normalized with [`normalize_path`], split on `/`, and the
/// first matching rule wins:
///
/// 1. `/core/api...` → `SystemApi`
/// 2. `/api...` → `AdminApi` when segment 2 or 3 is `admin`, else `Api`
/// 3. `/admin` with at most 3 segments → `AdminPage`
/// 4. 1 or 2 segments that are either empty or end in a two-letter
///    segment → `HomePage`
/// 5. otherwise `Unknown`
///
/// Segments past the end of the path read as `""`.
pub fn classify(path: &str, base_prefix: &str) -> RouteCategory {
    let normalized = normalize_path(path, base_prefix);
    let segments = PathSegments::new(normalized);
    let count = segments.len();

    if segments.get(1) == "core" && segments.get(2) == "api" {
        return RouteCategory::SystemApi;
    }

    if segments.get(1) == "api" {
        return if segments.get(3) == "admin" || segments.get(2) == "admin" {
            RouteCategory::AdminApi
        } else {
            RouteCategory::Api
        };
    }

    if segments.get(1) == "admin" && count <= 3 {
        return RouteCategory::AdminPage;
    }

    if count == 1 || count == 2 {
        if segments.get(1).is_empty() && segments.get(2).is_empty() {
            return RouteCategory::HomePage;
        }
        if is_language_segment(&[segments.get(0), segments.get(1)]) {
            return RouteCategory::HomePage;
        }
    }

    RouteCategory::Unknown
}

/// True if the last segment is exactly two bytes long
///
/// A coarse language-code heuristic: `/ab` counts as well as `/en`.
pub fn is_language_segment(segments: &[&str]) -> bool {
    segments.last().map_or(false, |last| last.len() == 2)
}

/// True if the path, with the base prefix removed, starts with `/core/api/`
pub fn is_system_api_path(path: &str, base_prefix: &str) -> bool {
    strip_base_prefix(path, base_prefix).starts_with(SYSTEM_API_PREFIX)
}

/// True if the path, with the base prefix removed, starts with `/admin`
pub fn is_admin_path(path: &str, base_prefix: &str) -> bool {
    strip_base_prefix(path, base_prefix).starts_with(ADMIN_PREFIX)
}

/// True if a route template is acceptable for an API route
///
/// Checked at registration time against the template, not a request path.
pub fn is_valid_api_pattern(pattern: &str) -> bool {
    pattern.starts_with(API_PATTERN_PREFIX)
}

/// True if the request URI points at the installer page
pub fn is_install_page(request_uri: &str) -> bool {
    request_uri.ends_with(INSTALL_PAGE_PATH)
}

/// True if the request URI is the installer API endpoint
pub fn is_api_install_request(request_uri: &str) -> bool {
    request_uri.ends_with(API_INSTALL_SUFFIX)
}

/// Absolute URL of the installer page
///
/// # Examples
///
/// ```
/// use waymark_router::install_page_url;
///
/// assert_eq!(
///     install_page_url("https://example.com", "/site"),
///     "https://example.com/site/admin/install"
/// );
/// ```
pub fn install_page_url(domain: &str, base_path: &str) -> String {
    format!("{}{}/{}", domain, base_path, INSTALL_PAGE_PATH)
}
