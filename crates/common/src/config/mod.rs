//! Configuration management for editorscout
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with SCOUT__)
//! - Configuration files (config/default, config/local, or an explicit path)
//! - Default values
//!
//! The Semantic Scholar API key falls back to `S2_API_KEY` when it is not
//! set through any of the sources above.

use crate::errors::{Result, ScoutError};
use crate::{API_KEY_ENV, DEFAULT_EDITORS_URL, DEFAULT_GRAPH_BASE_URL};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Graph service (Semantic Scholar) configuration
    pub graph: GraphConfig,

    /// Editorial board scraping configuration
    pub scrape: ScrapeConfig,

    /// Citation traversal configuration
    pub traversal: TraversalConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphConfig {
    /// API base URL
    pub base_url: String,

    /// API key sent as `x-api-key` on every graph request
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Attempts per request while the service answers 429
    pub max_attempts: u32,

    /// First backoff interval in milliseconds (doubles on every retry)
    pub initial_backoff_ms: u64,

    /// Maximum external ids resolved per editor
    pub batch_size: usize,

    /// Ceiling on cumulative backoff wait for batch lookups, in seconds
    pub batch_max_wait_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Editorial board page listing the action editors
    pub editors_url: String,

    /// Heading text that precedes the editor list
    pub heading: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Provenance depth past which the BFS stops
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Enable JSON logging
    pub json_logging: bool,
}

// Default value functions
fn default_timeout() -> u64 { 30 }
fn default_max_attempts() -> u32 { 4 }
fn default_initial_backoff_ms() -> u64 { 1000 }
fn default_batch_size() -> usize { 500 }
fn default_batch_max_wait() -> u64 { 10 }
fn default_heading() -> String { "TMLR Action Editors".to_string() }
fn default_max_depth() -> usize { 2 }
fn default_log_level() -> String { "info".to_string() }

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            batch_size: default_batch_size(),
            batch_max_wait_secs: default_batch_max_wait(),
        }
    }
}

impl GraphConfig {
    /// Request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ScrapeConfig {
    /// Request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            editors_url: DEFAULT_EDITORS_URL.to_string(),
            heading: default_heading(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: false,
        }
    }
}

impl ScoutConfig {
    /// Load configuration from environment and the default config files
    pub fn load() -> std::result::Result<Self, ConfigError> {
        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with SCOUT__ prefix
            // e.g., SCOUT__TRAVERSAL__MAX_DEPTH=3
            .add_source(
                Environment::with_prefix("SCOUT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Self>().map(Self::with_env_api_key)
    }

    /// Load from a specific file
    pub fn from_file(path: &Path) -> std::result::Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix("SCOUT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Self>().map(Self::with_env_api_key)
    }

    fn with_env_api_key(mut self) -> Self {
        if self.graph.api_key.is_none() {
            self.graph.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        }
        self
    }

    /// The API key, or the fatal error the CLI reports before any network call
    pub fn require_api_key(&self) -> Result<&str> {
        self.graph
            .api_key
            .as_deref()
            .ok_or_else(|| ScoutError::MissingApiKey {
                var: API_KEY_ENV.to_string(),
            })
    }
}
