//! Configuration handling for uc_modeler

use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::{Error, Result};
use crate::utils::quoting::Dialect;
use crate::warehouse::queries::Driver;

/// Environment variable overriding `warehouse.url`
pub const ENV_WAREHOUSE_URL: &str = "UC_MODELER_WAREHOUSE_URL";
/// Environment variable overriding `warehouse.catalog`
pub const ENV_CATALOG: &str = "UC_MODELER_CATALOG";
/// Environment variable overriding `warehouse.schema`
pub const ENV_SCHEMA: &str = "UC_MODELER_SCHEMA";

/// Load configuration from a TOML file, then apply environment overrides
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let mut config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    config.apply_overrides_from(|key| std::env::var(key).ok());

    Ok(config)
}

/// Represents the complete uc_modeler configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub warehouse: WarehouseConfig,
    #[serde(default)]
    pub ddl: DdlConfig,
    #[serde(default)]
    pub apply: ApplyConfig,
    #[serde(default)]
    pub diagram: DiagramConfig,
    pub logging: Option<LoggingConfig>,
}

impl Config {
    /// Override connection settings from the environment.
    ///
    /// Blank values are ignored so that an exported-but-empty variable does
    /// not wipe out the file setting.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(url) = non_blank(ENV_WAREHOUSE_URL) {
            self.warehouse.url = url;
        }
        if let Some(catalog) = non_blank(ENV_CATALOG) {
            self.warehouse.catalog = Some(catalog);
        }
        if let Some(schema) = non_blank(ENV_SCHEMA) {
            self.warehouse.schema = Some(schema);
        }
    }

    /// Check the settings a warehouse connection needs.
    ///
    /// DDL applied through a driver has to be quoted the way that database
    /// expects, so `ddl.dialect` must match `warehouse.driver`.
    pub fn validate(&self) -> Result<()> {
        if self.warehouse.url.trim().is_empty() {
            return Err(Error::ConfigError(format!(
                "warehouse.url is empty; set it in the config file or via {}",
                ENV_WAREHOUSE_URL
            )));
        }

        let driver: Driver = self.warehouse.driver.parse()?;
        if driver.dialect() != self.ddl.dialect {
            return Err(Error::ConfigError(format!(
                "ddl.dialect = \"{}\" cannot be applied through the {} driver; use \"{}\"",
                self.ddl.dialect,
                self.warehouse.driver,
                driver.dialect()
            )));
        }
        Ok(())
    }
}

/// Warehouse connection configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WarehouseConfig {
    pub driver: String,
    #[serde(default)]
    pub url: String,
    pub pool_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
    /// Default catalog used when a command does not name one
    pub catalog: Option<String>,
    /// Default schema used when a command does not name one
    pub schema: Option<String>,
}

/// DDL generation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DdlConfig {
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default = "default_true")]
    pub if_not_exists: bool,
}

impl Default for DdlConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            if_not_exists: true,
        }
    }
}

/// Settings for applying generated DDL to the warehouse
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ApplyConfig {
    /// Log the statements instead of executing them
    #[serde(default)]
    pub dry_run: bool,
}

/// ER diagram rendering settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiagramConfig {
    #[serde(default = "default_rankdir")]
    pub rankdir: String,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            rankdir: default_rankdir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stdout: bool,
}

fn default_true() -> bool {
    true
}

fn default_rankdir() -> String {
    "LR".to_string()
}
