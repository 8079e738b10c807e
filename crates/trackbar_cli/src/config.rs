//! Container configuration resolution for scenario runs

use anyhow::{Context, Result};
use std::path::Path;
use trackbar_widgets::ScrollContainerConfig;

use crate::scenario::Scenario;

/// Pick the container config for a run.
///
/// A `--config` file wins over the scenario's inline `container` table,
/// which wins over the defaults.
pub fn resolve_container_config(
    config_path: Option<&Path>,
    scenario: &Scenario,
) -> Result<ScrollContainerConfig> {
    if let Some(path) = config_path {
        if !path.exists() {
            anyhow::bail!("No container config found at {}", path.display());
        }
        let config = ScrollContainerConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        tracing::debug!("using container config from {}", path.display());
        return Ok(config);
    }

    match &scenario.container {
        Some(config) => {
            config
                .validate()
                .context("Invalid container settings in scenario")?;
            Ok(config.clone())
        }
        None => Ok(ScrollContainerConfig::default()),
    }
}
