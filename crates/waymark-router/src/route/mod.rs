//! Route template compilation
//!
//! Contains pure functional components for turning templates into variants
//! and variants into match strings:
//! - `pattern` scans placeholders into tokens
//! - `parser` expands trailing optional segments
//! - `compile` renders variants into regexes

pub mod compile;
pub mod parser;
pub mod pattern;

// Re-export commonly used types
pub use compile::{
    build_regex, compile, create_regex, is_static, regex_has_capturing_groups, CompiledRegex,
    CompiledRoute,
};
pub use parser::parse;
pub use pattern::{parse_placeholders, RouteToken, RouteVariant, DEFAULT_PLACEHOLDER_PATTERN};
