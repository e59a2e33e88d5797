//! Path utilities for classification
//!
//! All functions are **pure**: given same input, always produce same output with no side effects.

pub mod segments;
pub use segments::PathSegments;

/// Removes a deployment prefix from the start of a path
///
/// An empty prefix, or a path that does not start with it, is returned as-is.
///
/// # Examples
///
/// ```
/// use waymark_router::path::strip_base_prefix;
///
/// assert_eq!(strip_base_prefix("/app/admin", "/app"), "/admin");
/// assert_eq!(strip_base_prefix("/admin", "/app"), "/admin");
/// assert_eq!(strip_base_prefix("/admin", ""), "/admin");
/// ```
pub fn strip_base_prefix<'a>(path: &'a str, base_prefix: &str) -> &'a str {
    if base_prefix.is_empty() {
        return path;
    }
    path.strip_prefix(base_prefix).unwrap_or(path)
}

/// Normalize a path for classification
///
/// Strips `base_prefix` from the start, then trims a single trailing `/`.
/// Zero-copy: the result is always a slice of `path`.
///
/// # Examples
///
/// ```
/// use waymark_router::path::normalize_path;
///
/// assert_eq!(normalize_path("/app/api/users/", "/app"), "/api/users");
/// assert_eq!(normalize_path("/", ""), "");
/// assert_eq!(normalize_path("/a//", ""), "/a/");
/// ```
pub fn normalize_path<'a>(path: &'a str, base_prefix: &str) -> &'a str {
    let stripped = strip_base_prefix(path, base_prefix);
    stripped.strip_suffix('/').unwrap_or(stripped)
}
