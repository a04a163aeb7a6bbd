//! Error types for editorscout
//!
//! Provides a single error enum for every crate in the workspace with:
//! - Distinct variants for each failure mode
//! - Process exit code mapping for the CLI
//! - Transient/permanent classification for logging

use thiserror::Error;

/// Result type alias using ScoutError
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Application error types
#[derive(Error, Debug)]
pub enum ScoutError {
    // Configuration errors
    #[error("You must set the environment variable {var} to your Semantic Scholar API key to run this tool. To request an API key, go here: https://www.semanticscholar.org/product/api#api-key-form")]
    MissingApiKey { var: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // Input errors
    #[error("Failed to read bibliography {path}: {message}")]
    Bibliography { path: String, message: String },

    // Scraping errors
    #[error("Scrape error: {message}")]
    Scrape { message: String },

    #[error("XML error: {message}")]
    Xml { message: String },

    // Model errors
    #[error("Provenance already set for paper {id}")]
    ProvenanceAlreadySet { id: String },

    // External service errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    // Internal errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScoutError {
    /// Process exit code for this error
    ///
    /// Unreadable input files exit with 2, everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            ScoutError::Bibliography { .. } => 2,
            _ => 1,
        }
    }

    /// Whether this error came from a remote call that could succeed later
    pub fn is_transient(&self) -> bool {
        match self {
            ScoutError::HttpClient(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl From<config::ConfigError> for ScoutError {
    fn from(err: config::ConfigError) -> Self {
        ScoutError::Configuration {
            message: err.to_string(),
        }
    }
}
