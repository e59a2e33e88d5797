//! Pattern validation and conflict detection

use regex::Regex;
use tracing::debug;
use waymark_router::{compile, CompiledRoute};

use crate::error::{RegistryError, Result};
use crate::record::RouteRecord;

/// A compiled pattern whose placeholder regexes are known to compile
#[derive(Debug, Clone)]
pub struct ValidatedPattern {
    pub pattern: String,
    pub routes: Vec<CompiledRoute>,
    /// Anchored matcher per dynamic variant, `None` for static ones
    matchers: Vec<Option<Regex>>,
}

impl ValidatedPattern {
    /// Compile `pattern` and every dynamic variant's regex
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidPattern`] for template errors,
    /// [`RegistryError::InvalidRegex`] when a placeholder regex is not a
    /// valid regular expression.
    pub fn compile(pattern: &str) -> Result<Self> {
        let routes = compile(pattern).map_err(|source| RegistryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let matchers = routes
            .iter()
            .map(|route| anchored(route).transpose())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|source| RegistryError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            pattern: pattern.to_string(),
            routes,
            matchers,
        })
    }

    /// Match string of each variant, shortest first
    pub fn match_strings(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|route| route.match_string.clone())
            .collect()
    }

    /// True if adding `self` next to `existing` would make a route unreachable
    ///
    /// Two variants with the same match string collide. A static variant
    /// of `self` that a dynamic variant of `existing` already matches would
    /// be shadowed.
    pub fn conflicts_with(&self, existing: &ValidatedPattern) -> bool {
        self.routes.iter().any(|route| {
            existing
                .routes
                .iter()
                .zip(&existing.matchers)
                .any(|(other, matcher)| {
                    route.match_string == other.match_string
                        || (route.is_static
                            && matcher
                                .as_ref()
                                .is_some_and(|m| m.is_match(&route.match_string)))
                })
        })
    }
}

fn anchored(route: &CompiledRoute) -> Option<std::result::Result<Regex, regex::Error>> {
    (!route.is_static).then(|| Regex::new(&format!("^(?:{})$", route.match_string)))
}

/// First active route with the same method that `candidate` conflicts with
pub fn find_conflict<'a>(
    method: &str,
    candidate: &ValidatedPattern,
    existing: &'a [RouteRecord],
) -> Option<&'a RouteRecord> {
    existing
        .iter()
        .filter(|route| route.is_active() && route.method.eq_ignore_ascii_case(method))
        .find(|route| match ValidatedPattern::compile(&route.pattern) {
            Ok(stored) => candidate.conflicts_with(&stored),
            Err(err) => {
                debug!(pattern = %route.pattern, error = %err, "skipping unparsable stored route");
                false
            }
        })
}
