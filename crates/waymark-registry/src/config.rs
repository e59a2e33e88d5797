// File: src/config.rs
// Purpose: Registry configuration parsing from waymark.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RegistryConfig {
    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Deployment settings used for classification and URL building
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingConfig {
    /// Prefix stripped from request paths before classification (e.g. "/app")
    #[serde(default)]
    pub base_path: String,

    /// Scheme and host used when building absolute URLs
    #[serde(default = "default_domain")]
    pub domain: String,
}

/// Route list cache settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Seconds a cached route list stays fresh; 0 disables caching
    #[serde(default = "default_save_time")]
    pub save_time: u64,
}

// Default values
fn default_domain() -> String {
    "http://localhost".to_string()
}

fn default_save_time() -> u64 {
    4
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            domain: default_domain(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            save_time: default_save_time(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: RegistryConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./waymark.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("waymark.toml")
    }

    /// Sets the base path (builder)
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.routing.base_path = base_path.into();
        self
    }

    /// Sets the cache save time in seconds (builder)
    pub fn with_cache_save_time(mut self, seconds: u64) -> Self {
        self.cache.save_time = seconds;
        self
    }

    /// How long cached route lists stay fresh
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.save_time)
    }
}
