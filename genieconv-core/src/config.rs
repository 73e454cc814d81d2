//! Conversion settings, loadable from a JSON file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Conversion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Stop at the first failing effect instead of collecting all failures
    /// into the per-group report.
    pub fail_fast: bool,
    /// Maximum number of failure lines in [`crate::ConversionReport::summary_for`].
    pub report_limit: usize,
    /// Resolve groups on the rayon pool.
    pub parallel_resolution: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            report_limit: 50,
            parallel_resolution: true,
        }
    }
}

impl ConvertConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a JSON config file. Missing keys fall back to the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_json_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::debug!("Loaded conversion config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
