//! Configuration resolution: explicit file, then user config, then embedded defaults.

use anyhow::Context;
use include_dir::{include_dir, Dir};
use std::path::{Path, PathBuf};
use tapguard_core::TapConfig;

// Embed the configs directory at compile time
static CONFIGS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/resources/configs");

const EMBEDDED_CONFIG: &str = "tapguard.yaml";

/// Get the user config file path (`<config dir>/tapguard/config.yaml`).
pub fn user_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("tapguard").join("config.yaml"))
}

/// Load the embedded default configuration.
/// Falls back to `TapConfig::default()` if the embedded file is missing or invalid.
pub fn embedded_config() -> TapConfig {
    let Some(file) = CONFIGS_DIR.get_file(EMBEDDED_CONFIG) else {
        tracing::warn!("Embedded config {} not found, using defaults", EMBEDDED_CONFIG);
        return TapConfig::default();
    };

    let Some(content) = file.contents_utf8() else {
        tracing::error!("Embedded config {} is not valid UTF-8", EMBEDDED_CONFIG);
        return TapConfig::default();
    };

    match TapConfig::from_yaml_str(content) {
        Ok(config) => {
            tracing::debug!("Loaded embedded config: {}", EMBEDDED_CONFIG);
            config
        }
        Err(e) => {
            tracing::error!("Failed to parse embedded config {}: {}", EMBEDDED_CONFIG, e);
            TapConfig::default()
        }
    }
}

/// Resolve the effective configuration.
///
/// An explicit path must load; a broken user config is an error too, since
/// silently ignoring the user's tuning would skew the replay.
pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<TapConfig> {
    if let Some(path) = explicit {
        let config = TapConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        tracing::info!("Loaded config from {:?}", path);
        return Ok(config);
    }

    if let Some(path) = user_config_path().filter(|p| p.exists()) {
        let config = TapConfig::load(&path)
            .with_context(|| format!("failed to load user config {}", path.display()))?;
        tracing::info!("Loaded user config from {:?}", path);
        return Ok(config);
    }

    tracing::debug!("No config file given, using embedded defaults");
    Ok(embedded_config())
}
