//! Analysis configuration: reference tables and classifier thresholds.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::ClassifierConfig;
use crate::reference::ReferenceData;

/// Everything the analysis pipeline is parameterised by.
///
/// Loaded from JSON; any section left out keeps its built-in default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub reference: ReferenceData,
    pub classifier: ClassifierConfig,
}

impl AnalysisConfig {
    /// Load a configuration file.
    ///
    /// # Arguments
    /// * `path` - Path to a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        info!(
            "Loaded analysis config from {:?}: {} tokens, {} prices, {} venues",
            path.as_ref(),
            config.reference.token_symbols.len(),
            config.reference.token_prices.len(),
            config.reference.venues.len()
        );
        Ok(config)
    }
}
