//! Registration errors

use thiserror::Error;
use waymark_router::PatternError;

/// Why a route could not be registered
///
/// Every variant means "reject this registration"; none of them is fatal to
/// the registry itself.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("not a valid api route pattern: '{0}' (must start with '/api')")]
    InvalidApiPattern(String),

    #[error("placeholder regex in '{pattern}' does not compile: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("route already exists: {method} {pattern}")]
    AlreadyExists { method: String, pattern: String },

    #[error("route {method} {pattern} conflicts with existing route '{existing}'")]
    Conflict {
        method: String,
        pattern: String,
        existing: String,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
