//! Tap recognition and clickbuster tuning.

use crate::{TapError, TapResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Tolerances and windows shared by every recognizer and the suppressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapConfig {
    /// Max distance (px) the finger may travel from touchstart and still tap.
    pub move_tolerance_px: f64,

    /// A touch held longer than this (milliseconds) is not a tap.
    pub max_hold_duration_ms: u64,

    /// How long (milliseconds) after a tap its ghost click is still busted.
    pub suppression_window_ms: u64,

    /// Max distance (px) between a tap and the click it echoes.
    pub match_tolerance_px: f64,

    /// Minimum interval (milliseconds) between periodic purges.
    pub sweep_interval_ms: u64,

    /// Upper bound on live bust entries; the oldest is evicted past it.
    pub max_bust_entries: usize,

    /// Never suppress clicks reported at the viewport origin.
    pub ignore_origin_clicks: bool,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            move_tolerance_px: 12.0,
            max_hold_duration_ms: 750,
            suppression_window_ms: 2500,
            match_tolerance_px: 25.0,
            sweep_interval_ms: 1000,
            max_bust_entries: 64,
            ignore_origin_clicks: true,
        }
    }
}

impl TapConfig {
    /// Get max hold duration as Duration
    pub fn max_hold_duration(&self) -> Duration {
        Duration::from_millis(self.max_hold_duration_ms)
    }

    /// Get suppression window as Duration
    pub fn suppression_window(&self) -> Duration {
        Duration::from_millis(self.suppression_window_ms)
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Parse and validate a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(content: &str) -> TapResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> TapResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        debug!(?path, "Loaded tap config");
        Ok(config)
    }

    pub fn validate(&self) -> TapResult<()> {
        check_tolerance("move_tolerance_px", self.move_tolerance_px)?;
        check_tolerance("match_tolerance_px", self.match_tolerance_px)?;
        if self.max_hold_duration_ms == 0 {
            return Err(TapError::InvalidConfig(
                "max_hold_duration_ms must be greater than 0".into(),
            ));
        }
        if self.suppression_window_ms == 0 {
            return Err(TapError::InvalidConfig(
                "suppression_window_ms must be greater than 0".into(),
            ));
        }
        if self.max_bust_entries == 0 {
            return Err(TapError::InvalidConfig(
                "max_bust_entries must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn check_tolerance(name: &str, value: f64) -> TapResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TapError::InvalidConfig(format!(
            "{name} must be a finite, non-negative number (got {value})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TapConfig::default();
        assert_eq!(config.max_hold_duration(), Duration::from_millis(750));
        assert_eq!(config.suppression_window(), Duration::from_millis(2500));
        assert!(config.match_tolerance_px >= config.move_tolerance_px);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = TapConfig::from_yaml_str("suppression_window_ms: 1000\n").unwrap();
        assert_eq!(config.suppression_window_ms, 1000);
        assert_eq!(config.max_hold_duration_ms, 750);
        assert_eq!(config.move_tolerance_px, 12.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = TapConfig::from_yaml_str("move_tolerance_px: -3.0\n").unwrap_err();
        assert!(matches!(err, TapError::InvalidConfig(_)));

        let err = TapConfig::from_yaml_str("suppression_window_ms: 0\n").unwrap_err();
        assert!(matches!(err, TapError::InvalidConfig(_)));

        let err = TapConfig::from_yaml_str("max_bust_entries: 0\n").unwrap_err();
        assert!(matches!(err, TapError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = TapConfig::from_yaml_str("move_tolerance_px: [1, 2]\n").unwrap_err();
        assert!(matches!(err, TapError::Yaml(_)));
    }
}
