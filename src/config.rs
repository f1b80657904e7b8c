use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::PlanError;

/// Runtime configuration, read from an optional JSON file. Every field has a
/// default so a missing or partial file still yields a working plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub grid_size: usize,
    pub window_width: u32,
    pub window_height: u32,
    pub free_icon: PathBuf,
    pub occupied_icon: PathBuf,
    /// Probability that the occupancy source marks a seat occupied.
    pub occupied_ratio: f64,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            grid_size: 15,
            window_width: 500,
            window_height: 500,
            free_icon: PathBuf::from("assets/free-seat.png"),
            occupied_icon: PathBuf::from("assets/occupied-seat.png"),
            occupied_ratio: 0.5,
        }
    }
}

impl PlanConfig {
    /// Loads config from `path`; a missing file falls back to defaults, a
    /// present-but-broken file is an error rather than a silent default.
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: PlanConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = PlanConfig::load(Path::new("no/such/config.json")).unwrap();
        assert_eq!(config.grid_size, 15);
        assert_eq!(config.window_width, 500);
    }

    #[test]
    fn partial_json_keeps_defaults_for_the_rest() {
        let config: PlanConfig = serde_json::from_str(r#"{"grid_size": 20}"#).unwrap();
        assert_eq!(config.grid_size, 20);
        assert_eq!(config.window_height, 500);
        assert_eq!(config.occupied_ratio, 0.5);
    }

    #[test]
    fn broken_json_is_an_error() {
        assert!(serde_json::from_str::<PlanConfig>("{nope").is_err());
    }
}
