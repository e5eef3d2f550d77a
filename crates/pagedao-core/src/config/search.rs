//! Full-text search configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the PostgreSQL text-search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Text search configuration passed to `to_tsvector` / `to_tsquery`.
    #[serde(default = "default_language")]
    pub language: String,
    /// Seconds an index rebuild may run before it is reported as interrupted.
    #[serde(default = "default_rebuild_timeout")]
    pub rebuild_timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            rebuild_timeout_seconds: default_rebuild_timeout(),
        }
    }
}

impl SearchConfig {
    /// Rebuild timeout as a `Duration`.
    pub fn rebuild_timeout(&self) -> Duration {
        Duration::from_secs(self.rebuild_timeout_seconds)
    }
}

fn default_language() -> String {
    "english".to_string()
}

fn default_rebuild_timeout() -> u64 {
    3600
}
