//! editorscout Common Library
//!
//! Shared code for the editorscout crates including:
//! - Paper records with single-parent provenance
//! - Semantic Scholar graph client (shared HTTP session)
//! - Rate-limit aware retry with exponential backoff
//! - Error types and handling
//! - Configuration management
//! - Metrics

pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod retry;
pub mod scholar;

// Re-export commonly used types
pub use config::ScoutConfig;
pub use errors::{Result, ScoutError};
pub use models::{Neighbors, Paper, PaperId, Provenance, Roster};
pub use scholar::GraphClient;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the Semantic Scholar API key
pub const API_KEY_ENV: &str = "S2_API_KEY";

/// Default Semantic Scholar Graph API base URL
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://api.semanticscholar.org/graph/v1";

/// Default editorial board page
pub const DEFAULT_EDITORS_URL: &str = "https://jmlr.org/tmlr/editorial-board.html";
