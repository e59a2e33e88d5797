//! # Waymark Router
//!
//! A pure route template compiler and request path classifier:
//! - Static routes (`/about`)
//! - Placeholders (`/users/{id}`)
//! - Typed placeholders (`/users/{id:[0-9]+}`)
//! - Trailing optional segments (`/blog[/{year:[0-9]{4}}[/{slug}]]`)
//! - Path classification (home page, admin page, API, admin API, system API)
//!
//! ## Functional Programming Approach
//!
//! Every function in this crate is pure:
//! - No I/O, no caching, no global state
//! - Same template → structurally identical output, every time
//! - Zero-copy slicing for path normalization and segment splitting
//! - Fold-based accumulation for variant expansion
//!
//! ## Templates
//!
//! A template with `k` trailing optional segments compiles to `k + 1`
//! variants. Optional segments must be right-nested: `a[b[c]]` is valid,
//! `a[b]c` and `[a]b` are not. Placeholder bodies are opaque to the
//! optional-segment scanner, so `{id:[0-9]+}` never opens an optional part.
//!
//! ## Example
//!
//! ```
//! use waymark_router::{build_regex, classify, parse, RouteCategory};
//!
//! let variants = parse("/user/{name}[/{id:[0-9]+}]").unwrap();
//! assert_eq!(variants.len(), 2);
//! assert_eq!(build_regex(&variants[0]).regex, "/user/([^/]+)");
//! assert_eq!(build_regex(&variants[1]).regex, "/user/([^/]+)/([0-9]+)");
//!
//! assert_eq!(classify("/api/widgets", ""), RouteCategory::Api);
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod classify;
mod error;
pub mod path;
pub mod route;

// Re-export public types
pub use classify::{
    classify, install_page_url, is_admin_path, is_api_install_request, is_install_page,
    is_language_segment, is_system_api_path, is_valid_api_pattern, RouteCategory,
    INSTALL_PAGE_PATH,
};
pub use error::PatternError;
pub use path::{normalize_path, strip_base_prefix, PathSegments};
pub use route::{
    build_regex, compile, create_regex, is_static, parse, parse_placeholders,
    regex_has_capturing_groups, CompiledRegex, CompiledRoute, RouteToken, RouteVariant,
    DEFAULT_PLACEHOLDER_PATTERN,
};
