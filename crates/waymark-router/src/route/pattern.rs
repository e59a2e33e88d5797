//! Placeholder scanning for route templates
//!
//! Pure functional scanning of `{name}` / `{name:regex}` placeholders into typed
//! tokens. All functions are **pure**: same input → same output, no side effects.

use crate::PatternError;

/// Regex used for a placeholder that does not declare its own pattern
pub const DEFAULT_PLACEHOLDER_PATTERN: &str = "[^/]+";

/// A single piece of a route variant
///
/// Functional sum type for pattern matching route tokens.
///
/// # Examples
///
/// ```
/// use waymark_router::{parse_placeholders, RouteToken};
///
/// let variant = parse_placeholders("/user/{id:[0-9]+}").unwrap();
/// assert_eq!(variant.tokens()[0], RouteToken::literal("/user/"));
/// assert_eq!(variant.tokens()[1], RouteToken::placeholder("id", "[0-9]+"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteToken {
    /// Text that must appear verbatim
    Literal(String),
    /// A named dynamic part and the regex it must match
    Placeholder { name: String, pattern: String },
}

impl RouteToken {
    pub fn literal(text: impl Into<String>) -> Self {
        RouteToken::Literal(text.into())
    }

    pub fn placeholder(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        RouteToken::Placeholder {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, RouteToken::Literal(_))
    }

    /// Placeholder name, `None` for literals
    pub fn name(&self) -> Option<&str> {
        match self {
            RouteToken::Placeholder { name, .. } => Some(name),
            RouteToken::Literal(_) => None,
        }
    }
}

/// One concrete expansion of a template's optional segments
///
/// Produced by [`crate::parse`]; never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RouteVariant {
    tokens: Vec<RouteToken>,
}

impl RouteVariant {
    pub fn new(tokens: Vec<RouteToken>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[RouteToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Placeholder names in order of appearance, repeats included
    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(RouteToken::name)
    }

    pub fn into_tokens(self) -> Vec<RouteToken> {
        self.tokens
    }
}

impl<'a> IntoIterator for &'a RouteVariant {
    type Item = &'a RouteToken;
    type IntoIter = std::slice::Iter<'a, RouteToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// A placeholder located by [`scan_placeholder`]
///
/// `start` is the offset of `{`, `end` is one past the matching `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlaceholderSpan<'a> {
    pub start: usize,
    pub end: usize,
    pub name: &'a str,
    pub pattern: Option<&'a str>,
}

impl PlaceholderSpan<'_> {
    /// Converts the span into a token, applying the default pattern
    pub fn to_token(self) -> RouteToken {
        let pattern = self
            .pattern
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PLACEHOLDER_PATTERN);

        RouteToken::placeholder(self.name, pattern)
    }
}

fn is_name_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_name_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-'
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Reads the placeholder whose `{` sits at `start`
///
/// Grammar: `{ \s* name \s* ( : body )? }` where `name` is
/// `[a-zA-Z_][a-zA-Z0-9_-]*` and `body` may contain balanced `{}` pairs.
/// The body is opaque: `[`, `]` and `:` inside it carry no meaning here.
///
/// # Errors
///
/// [`PatternError::InvalidPlaceholderSyntax`] for a missing or malformed name,
/// unexpected characters after the name, or an unterminated body.
pub(crate) fn scan_placeholder(route: &str, start: usize) -> Result<PlaceholderSpan<'_>, PatternError> {
    let bytes = route.as_bytes();
    debug_assert_eq!(bytes.get(start), Some(&b'{'));

    let name_start = skip_whitespace(bytes, start + 1);
    match bytes.get(name_start) {
        None => return Err(PatternError::placeholder(start, "unterminated placeholder")),
        Some(b'}') | Some(b':') => {
            return Err(PatternError::placeholder(start, "empty placeholder name"))
        }
        Some(&b) if !is_name_start(b) => {
            return Err(PatternError::placeholder(
                name_start,
                "placeholder name must start with a letter or '_'",
            ))
        }
        Some(_) => {}
    }

    let mut name_end = name_start + 1;
    while name_end < bytes.len() && is_name_continue(bytes[name_end]) {
        name_end += 1;
    }
    let name = &route[name_start..name_end];

    let i = skip_whitespace(bytes, name_end);
    match bytes.get(i) {
        Some(b'}') => Ok(PlaceholderSpan {
            start,
            end: i + 1,
            name,
            pattern: None,
        }),
        Some(b':') => {
            let body_start = i + 1;
            let body_end = find_body_end(bytes, body_start)
                .ok_or_else(|| PatternError::placeholder(start, "unterminated placeholder"))?;

            Ok(PlaceholderSpan {
                start,
                end: body_end + 1,
                name,
                pattern: Some(&route[body_start..body_end]),
            })
        }
        Some(_) => {
            let found = route[i..].chars().next().unwrap_or_default();
            Err(PatternError::placeholder(
                i,
                format!("unexpected '{}' after placeholder name '{}'", found, name),
            ))
        }
        None => Err(PatternError::placeholder(start, "unterminated placeholder")),
    }
}

/// Offset of the `}` closing a placeholder body, skipping nested `{}` pairs
fn find_body_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &b) in bytes[from..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(from + offset),
            b'}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Parses a route string without optional segments into tokens (pure function)
///
/// Text around placeholders becomes literal tokens. A string with no
/// placeholders yields exactly one literal token, even when it is empty.
/// Nothing is appended after a trailing placeholder.
///
/// # Examples
///
/// ```
/// use waymark_router::{parse_placeholders, RouteToken};
///
/// let variant = parse_placeholders("/user/{name}").unwrap();
/// assert_eq!(
///     variant.tokens(),
///     &[RouteToken::literal("/user/"), RouteToken::placeholder("name", "[^/]+")]
/// );
///
/// let variant = parse_placeholders("/about").unwrap();
/// assert_eq!(variant.tokens(), &[RouteToken::literal("/about")]);
/// ```
///
/// # Errors
///
/// [`PatternError::InvalidPlaceholderSyntax`] for a malformed placeholder or a
/// `}` with no opening `{`.
pub fn parse_placeholders(route: &str) -> Result<RouteVariant, PatternError> {
    let bytes = route.as_bytes();
    let mut tokens = Vec::new();
    let mut offset = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                let span = scan_placeholder(route, i)?;
                if span.start > offset {
                    tokens.push(RouteToken::literal(&route[offset..span.start]));
                }
                tokens.push(span.to_token());
                i = span.end;
                offset = i;
            }
            b'}' => return Err(PatternError::placeholder(i, "unmatched '}'")),
            _ => i += 1,
        }
    }

    if tokens.is_empty() {
        return Ok(RouteVariant::new(vec![RouteToken::literal(route)]));
    }

    if offset < route.len() {
        tokens.push(RouteToken::literal(&route[offset..]));
    }

    Ok(RouteVariant::new(tokens))
}

/// Byte offsets of `needle` that lie outside any placeholder
///
/// Placeholders are skipped atomically, so a `[` or `]` inside
/// `{id:[0-9]+}` is never reported.
pub(crate) fn find_outside_placeholders(route: &str, needle: u8) -> Result<Vec<usize>, PatternError> {
    let bytes = route.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            i = scan_placeholder(route, i)?.end;
            continue;
        }
        if bytes[i] == needle {
            found.push(i);
        }
        i += 1;
    }

    Ok(found)
}
