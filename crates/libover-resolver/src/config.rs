//! Resolver configuration
//!
//! Loaded from TOML at startup, falls back to defaults if no config file exists.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level resolver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Edit-time validation parameters.
    pub validation: ValidationConfig,
    /// Folder walk limits.
    pub hierarchy: HierarchyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Upper bound on a retriever's version-existence check.
    pub version_timeout_ms: u64,
    /// Shown by `check_version` when the library is not known yet.
    pub defer_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Longest ancestor chain walked before giving up.
    pub max_depth: usize,
}

// ============================================================
// Defaults
// ============================================================

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            version_timeout_ms: 10_000,
            defer_message: "Cannot validate default version until after saving and reconfiguring."
                .into(),
        }
    }
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

// ============================================================
// Loading
// ============================================================

impl ResolverConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {} - using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Render the current config as TOML.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn version_timeout(&self) -> Duration {
        Duration::from_millis(self.validation.version_timeout_ms)
    }
}
