//! Template parsing into route variants
//!
//! Pure functional parser that expands trailing optional segments.
//! All functions are **pure**: same input → same output, no side effects.

use tracing::debug;

use super::pattern::{find_outside_placeholders, parse_placeholders, RouteVariant};
use crate::PatternError;

/// Internal state accumulator for fold-based variant expansion
///
/// All mutations are local to the fold accumulator. Each step appends one
/// optional segment to the growing prefix and re-parses the whole prefix.
#[derive(Default)]
struct VariantState {
    prefix: String,
    variants: Vec<RouteVariant>,
}

impl VariantState {
    /// Appends one split segment and emits the variant for the new prefix
    fn with_segment(mut self, index: usize, segment: &str) -> Result<Self, PatternError> {
        if segment.is_empty() && index != 0 {
            return Err(PatternError::EmptyOptionalSegment { index });
        }

        self.prefix.push_str(segment);
        self.variants.push(parse_placeholders(&self.prefix)?);
        Ok(self)
    }

    fn into_variants(self) -> Vec<RouteVariant> {
        self.variants
    }
}

/// Splits a route on every `[` that is not inside a placeholder
fn split_optional_segments(route: &str) -> Result<Vec<&str>, PatternError> {
    let mut segments = Vec::new();
    let mut start = 0;

    for pos in find_outside_placeholders(route, b'[')? {
        segments.push(&route[start..pos]);
        start = pos + 1;
    }
    segments.push(&route[start..]);

    Ok(segments)
}

/// Parses a route template into its variants (pure function)
///
/// A template with `k` trailing optional segments yields exactly `k + 1`
/// variants. Variant `i` is the template cut before its `i`-th optional `[`,
/// so the first variant has no optional parts and the last has all of them.
///
/// # Algorithm
///
/// 1. Reject any `[]` outside placeholders
/// 2. Strip the trailing run of `]` and count it
/// 3. Split the rest on `[` outside placeholders
/// 4. Reject any `]` left outside placeholders, then compare split count
///    with the number of stripped closers
/// 5. Fold the segments into a growing prefix, parsing each prefix
///
/// # Examples
///
/// ```
/// use waymark_router::{parse, RouteToken};
///
/// let variants = parse("/user/{name}[/{id:[0-9]+}]").unwrap();
/// assert_eq!(variants.len(), 2);
/// assert_eq!(variants[0].len(), 2);
/// assert_eq!(variants[1].tokens()[3], RouteToken::placeholder("id", "[0-9]+"));
/// ```
///
/// # Errors
///
/// - [`PatternError::MisplacedOptionalClose`] when a `]` occurs before the end
/// - [`PatternError::UnbalancedBrackets`] when `[` and `]` counts differ
/// - [`PatternError::EmptyOptionalSegment`] for `[]` or `[[`
/// - [`PatternError::InvalidPlaceholderSyntax`] for malformed placeholders
///
/// No variants are returned when any of these is raised.
pub fn parse(template: &str) -> Result<Vec<RouteVariant>, PatternError> {
    let result = expand_variants(template);
    if let Err(ref err) = result {
        debug!(template, error = %err, "rejected route template");
    }
    result
}

/// Rejects an optional part opened and closed with nothing in between
///
/// `index` counts optional parts from 1, left to right.
fn check_empty_optionals(template: &str) -> Result<(), PatternError> {
    let bytes = template.as_bytes();
    match find_outside_placeholders(template, b'[')?
        .into_iter()
        .position(|pos| bytes.get(pos + 1) == Some(&b']'))
    {
        Some(position) => Err(PatternError::EmptyOptionalSegment { index: position + 1 }),
        None => Ok(()),
    }
}

fn expand_variants(template: &str) -> Result<Vec<RouteVariant>, PatternError> {
    check_empty_optionals(template)?;

    let without_closers = template.trim_end_matches(']');
    let num_optionals = template.len() - without_closers.len();

    let segments = split_optional_segments(without_closers)?;

    if !find_outside_placeholders(without_closers, b']')?.is_empty() {
        return Err(PatternError::MisplacedOptionalClose);
    }
    if segments.len() - 1 != num_optionals {
        return Err(PatternError::UnbalancedBrackets);
    }

    segments
        .into_iter()
        .enumerate()
        .try_fold(VariantState::default(), |state, (index, segment)| {
            state.with_segment(index, segment)
        })
        .map(VariantState::into_variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::pattern::{RouteToken, DEFAULT_PLACEHOLDER_PATTERN};

    #[test]
    fn test_split_plain() {
        assert_eq!(split_optional_segments("/a").unwrap(), vec!["/a"]);
    }

    #[test]
    fn test_split_nested_optionals() {
        assert_eq!(
            split_optional_segments("/a[/b[/c").unwrap(),
            vec!["/a", "/b", "/c"]
        );
    }

    #[test]
    fn test_split_ignores_brackets_in_placeholder() {
        assert_eq!(
            split_optional_segments("/{id:[0-9]+}[/{slug:[a-z]+}").unwrap(),
            vec!["/{id:[0-9]+}", "/{slug:[a-z]+}"]
        );
    }

    #[test]
    fn test_parse_static() {
        let variants = parse("/about").unwrap();
        assert_eq!(variants, vec![RouteVariant::new(vec![RouteToken::literal("/about")])]);
    }

    #[test]
    fn test_parse_three_levels() {
        let variants = parse("/a[/b[/c]]").unwrap();
        assert_eq!(variants.len(), 3);
        assert_eq!(variants[0].tokens(), &[RouteToken::literal("/a")]);
        assert_eq!(variants[1].tokens(), &[RouteToken::literal("/a/b")]);
        assert_eq!(variants[2].tokens(), &[RouteToken::literal("/a/b/c")]);
    }

    #[test]
    fn test_parse_leading_optional() {
        let variants = parse("[/{lang}]").unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].tokens(), &[RouteToken::literal("")]);
        assert_eq!(
            variants[1].tokens(),
            &[
                RouteToken::literal("/"),
                RouteToken::placeholder("lang", DEFAULT_PLACEHOLDER_PATTERN)
            ]
        );
    }

    #[test]
    fn test_parse_misplaced_close() {
        assert_eq!(parse("/a]b"), Err(PatternError::MisplacedOptionalClose));
        assert_eq!(parse("/a[/b]/c"), Err(PatternError::MisplacedOptionalClose));
    }

    #[test]
    fn test_parse_unbalanced() {
        assert_eq!(parse("/a[b"), Err(PatternError::UnbalancedBrackets));
        assert_eq!(parse("/a[b]]"), Err(PatternError::UnbalancedBrackets));
    }

    #[test]
    fn test_parse_empty_optional() {
        assert_eq!(
            parse("/a[]"),
            Err(PatternError::EmptyOptionalSegment { index: 1 })
        );
        assert_eq!(
            parse("/a[[/b]]"),
            Err(PatternError::EmptyOptionalSegment { index: 1 })
        );
        assert_eq!(
            parse("/a[][b]]"),
            Err(PatternError::EmptyOptionalSegment { index: 1 })
        );
        assert!(parse("/{c:[]a]+}").is_ok());
    }

    #[test]
    fn test_parse_bad_placeholder_in_optional() {
        assert!(matches!(
            parse("/a[/{}]"),
            Err(PatternError::InvalidPlaceholderSyntax { .. })
        ));
    }
}
