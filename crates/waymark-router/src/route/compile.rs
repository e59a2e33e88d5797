//! Regex rendering for route variants
//!
//! Turns token sequences into match strings. Placeholders become capturing
//! groups; literals are escaped. Nothing here is cached.

use super::parser::parse;
use super::pattern::{RouteToken, RouteVariant};
use crate::PatternError;

/// The regex view of a single variant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledRegex {
    /// Concatenated regex, not anchored
    pub regex: String,
    /// Names that received a capturing group, in first-seen order
    pub variables: Vec<String>,
}

/// A variant together with everything derived from it
///
/// This is the shape a route store persists for each variant of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRoute {
    pub variant: RouteVariant,
    /// Literal text for static variants, regex otherwise
    pub match_string: String,
    pub variables: Vec<String>,
    pub is_static: bool,
}

/// Returns true if the variant is a single literal token
///
/// # Examples
///
/// ```
/// use waymark_router::{is_static, parse};
///
/// assert!(is_static(&parse("/users").unwrap()[0]));
/// assert!(!is_static(&parse("/users/{id}").unwrap()[0]));
/// ```
pub fn is_static(variant: &RouteVariant) -> bool {
    matches!(variant.tokens(), [RouteToken::Literal(_)])
}

/// Renders a variant into a regex string plus its captured variable names
///
/// - Literal → escaped literal
/// - Placeholder seen before in this variant → nothing (first occurrence wins)
/// - Placeholder whose pattern has its own capturing group → nothing
/// - Any other placeholder → `(pattern)`
///
/// # Examples
///
/// ```
/// use waymark_router::{build_regex, parse};
///
/// let variants = parse("/user/{name}[/{id:[0-9]+}]").unwrap();
/// let compiled = build_regex(&variants[1]);
/// assert_eq!(compiled.regex, "/user/([^/]+)/([0-9]+)");
/// assert_eq!(compiled.variables, vec!["name", "id"]);
/// ```
pub fn build_regex(variant: &RouteVariant) -> CompiledRegex {
    variant
        .tokens()
        .iter()
        .fold(CompiledRegex::default(), |mut acc, token| {
            match token {
                RouteToken::Literal(text) => acc.regex.push_str(&regex::escape(text)),
                RouteToken::Placeholder { name, pattern } => {
                    if acc.variables.iter().any(|seen| seen == name) {
                        tracing::trace!(name = %name, "skipping repeated placeholder");
                    } else if regex_has_capturing_groups(pattern) {
                        tracing::trace!(name = %name, pattern = %pattern, "placeholder pattern has its own capturing group");
                    } else {
                        acc.variables.push(name.clone());
                        acc.regex.push('(');
                        acc.regex.push_str(pattern);
                        acc.regex.push(')');
                    }
                }
            }
            acc
        })
}

/// Returns the literal for static variants, the rendered regex otherwise
///
/// # Examples
///
/// ```
/// use waymark_router::{create_regex, parse};
///
/// assert_eq!(create_regex(&parse("/users").unwrap()[0]), "/users");
/// assert_eq!(create_regex(&parse("/users/{id:\\d+}").unwrap()[0]), "/users/(\\d+)");
/// ```
pub fn create_regex(variant: &RouteVariant) -> String {
    match variant.tokens() {
        [RouteToken::Literal(text)] => text.clone(),
        _ => build_regex(variant).regex,
    }
}

/// Parses a template and renders every variant (pure function)
///
/// # Errors
///
/// Any [`PatternError`] from [`parse`].
pub fn compile(template: &str) -> Result<Vec<CompiledRoute>, PatternError> {
    Ok(parse(template)?
        .into_iter()
        .map(|variant| {
            let is_static = is_static(&variant);
            let CompiledRegex { regex, variables } = if is_static {
                CompiledRegex {
                    regex: create_regex(&variant),
                    variables: Vec::new(),
                }
            } else {
                build_regex(&variant)
            };

            CompiledRoute {
                variant,
                match_string: regex,
                variables,
                is_static,
            }
        })
        .collect())
}

/// Returns true if `pattern` opens a capturing group of its own
///
/// Skips character classes (`[...]`, honouring backslash escapes inside),
/// escaped characters and conditional openers `(?(`. An `(` counts as
/// capturing unless it is followed by `*` (verbs) or by `?` introducing
/// anything other than a named group (`?<name>`, `?P<name>`, `?'name'`).
/// Lookbehinds `(?<=` and `(?<!` are not named groups.
///
/// # Examples
///
/// ```
/// use waymark_router::regex_has_capturing_groups;
///
/// assert!(regex_has_capturing_groups("(foo|bar)"));
/// assert!(!regex_has_capturing_groups("(?:foo|bar)"));
/// assert!(!regex_has_capturing_groups("[(]+"));
/// assert!(!regex_has_capturing_groups("\\(x\\)"));
/// ```
pub fn regex_has_capturing_groups(pattern: &str) -> bool {
    if !pattern.contains('(') {
        return false;
    }

    let bytes = pattern.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'[' => match class_end(bytes, i) {
                Some(end) => i = end + 1,
                None => i += 1,
            },
            b'(' => {
                let rest = &bytes[i + 1..];
                if rest.starts_with(b"?(") {
                    i += 3;
                    continue;
                }
                if opens_capturing_group(rest) {
                    return true;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    false
}

/// Offset of the `]` closing the class opened at `open`, if any
fn class_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut j = open + 1;
    while j < bytes.len() {
        match bytes[j] {
            b']' => return Some(j),
            b'\\' => j += 2,
            _ => j += 1,
        }
    }
    None
}

/// Decides whether the text after an unescaped `(` starts a capturing group
fn opens_capturing_group(rest: &[u8]) -> bool {
    match rest {
        [b'*', ..] => false,
        [b'?', b'<', b'!' | b'=', ..] => false,
        [b'?', b'<', ..] | [b'?', b'P', b'<', ..] | [b'?', b'\'', ..] => true,
        [b'?', ..] => false,
        _ => true,
    }
}
