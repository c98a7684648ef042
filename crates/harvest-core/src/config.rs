//! Configuration loading and typed config structures for the farming task.
//!
//! The canonical configuration lives in `harvest-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file and applies
//! environment overrides. Every field has a serde default, so an empty
//! document yields [`HarvestConfig::default`].

use std::path::Path;

use serde::Deserialize;

/// Environment variable that overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "HARVEST_LOG_LEVEL";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `harvest-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HarvestConfig {
    /// Harvesting, replanting, and scanning.
    #[serde(default)]
    pub farm: FarmConfig,

    /// Inventory management and the deposit cycle.
    #[serde(default)]
    pub inventory: InventoryConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Sandbox run parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl HarvestConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `HARVEST_LOG_LEVEL` environment variable overrides
    /// `logging.level`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config
            .logging
            .apply_level_override(std::env::var(LOG_LEVEL_ENV).ok());
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Harvesting, replanting, and scan settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FarmConfig {
    /// Replant farmland and keep the bottom of column crops.
    #[serde(default = "default_true")]
    pub replant_crops: bool,

    /// Also replant nether wart on soul sand (needs `replant_crops`).
    #[serde(default)]
    pub replant_nether_wart: bool,

    /// Ticks between background scans; 0 disables rescanning.
    #[serde(default = "default_scan_interval_ticks")]
    pub scan_interval_ticks: u32,

    /// Horizontal scan radius around the player's feet.
    #[serde(default = "default_scan_radius")]
    pub scan_horizontal_radius: i32,

    /// Vertical scan radius around the player's feet.
    #[serde(default = "default_scan_radius")]
    pub scan_vertical_radius: i32,

    /// Maximum number of positions a single scan returns.
    #[serde(default = "default_scan_max_positions")]
    pub scan_max_positions: usize,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            replant_crops: true,
            replant_nether_wart: false,
            scan_interval_ticks: default_scan_interval_ticks(),
            scan_horizontal_radius: default_scan_radius(),
            scan_vertical_radius: default_scan_radius(),
            scan_max_positions: default_scan_max_positions(),
        }
    }
}

/// Inventory management settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InventoryConfig {
    /// Watch inventory fullness each tick.
    #[serde(default)]
    pub check_inventory: bool,

    /// Deposit harvested items into the stash when full, instead of stopping.
    #[serde(default)]
    pub put_drops_in_stash: bool,

    /// Head to the home waypoint after the task aborts.
    #[serde(default)]
    pub go_home: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter level when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Replace the level with `value` when it is set and non-empty.
    pub fn apply_level_override(&mut self, value: Option<String>) {
        if let Some(level) = value.filter(|v| !v.trim().is_empty()) {
            self.level = level;
        }
    }
}

/// Sandbox run parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Stop after this many ticks; 0 runs until the task ends.
    #[serde(default)]
    pub max_ticks: u64,

    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Seed for sandbox crop growth.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_ticks: 0,
            tick_interval_ms: default_tick_interval_ms(),
            seed: default_seed(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

const fn default_scan_interval_ticks() -> u32 {
    5
}

const fn default_scan_radius() -> i32 {
    10
}

const fn default_scan_max_positions() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_tick_interval_ms() -> u64 {
    50
}

const fn default_seed() -> u64 {
    42
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = HarvestConfig::default();
        assert!(config.farm.replant_crops);
        assert!(!config.farm.replant_nether_wart);
        assert_eq!(config.farm.scan_interval_ticks, 5);
        assert_eq!(config.farm.scan_max_positions, 256);
        assert!(!config.inventory.check_inventory);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.simulation.seed, 42);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
farm:
  replant_crops: false
  replant_nether_wart: true
  scan_interval_ticks: 20
  scan_horizontal_radius: 32
  scan_vertical_radius: 4
  scan_max_positions: 64

inventory:
  check_inventory: true
  put_drops_in_stash: true
  go_home: true

logging:
  level: "debug"
  json: true

simulation:
  max_ticks: 500
  tick_interval_ms: 0
  seed: 7
"#;

        let config = HarvestConfig::parse(yaml).unwrap();
        assert!(!config.farm.replant_crops);
        assert!(config.farm.replant_nether_wart);
        assert_eq!(config.farm.scan_interval_ticks, 20);
        assert_eq!(config.farm.scan_horizontal_radius, 32);
        assert_eq!(config.farm.scan_vertical_radius, 4);
        assert!(config.inventory.put_drops_in_stash);
        assert!(config.inventory.go_home);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.simulation.max_ticks, 500);
        assert_eq!(config.simulation.seed, 7);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = HarvestConfig::parse("farm:\n  scan_interval_ticks: 0\n").unwrap();
        assert_eq!(config.farm.scan_interval_ticks, 0);
        // Everything else uses defaults
        assert!(config.farm.replant_crops);
        assert_eq!(config.farm.scan_horizontal_radius, 10);
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(HarvestConfig::parse("").is_ok());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            HarvestConfig::parse("farm: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn log_level_override() {
        let mut logging = LoggingConfig::default();
        logging.apply_level_override(None);
        assert_eq!(logging.level, "info");
        logging.apply_level_override(Some("  ".to_owned()));
        assert_eq!(logging.level, "info");
        logging.apply_level_override(Some("trace".to_owned()));
        assert_eq!(logging.level, "trace");
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("harvest-config.yaml");
        if path.exists() {
            let config = HarvestConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
