use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::planner::{CostTable, RateTable};

/// Default data file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "midday_data.json";

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "midday.toml";

/// Written by `init`; parses to the built-in defaults.
pub const DEFAULT_CONFIG_TOML: &str = r#"# Mid-day meal configuration
data_file = "midday_data.json"

# Government subsidy per student per day
[rates]
primary = 2.59
upper_primary = 3.88

# Market price per kg for itemized costing; unlisted ingredients keep defaults
[cost_per_kg]
rice = 45.0
oil = 180.0
"#;

/// Runtime settings: built-in defaults overlaid by `midday.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_file: PathBuf,
    pub rates: RateTable,
    pub cost_per_kg: CostTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            rates: RateTable::default(),
            cost_per_kg: CostTable::default(),
        }
    }
}

/// On-disk shape; every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_file: Option<PathBuf>,
    rates: Option<RatesSection>,
    cost_per_kg: Option<CostTable>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RatesSection {
    primary: Option<f64>,
    upper_primary: Option<f64>,
}

impl Config {
    /// Parse TOML text on top of the defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        let mut config = Self::default();

        if let Some(path) = file.data_file {
            config.data_file = path;
        }
        if let Some(rates) = file.rates {
            if let Some(primary) = rates.primary {
                config.rates.primary = primary;
            }
            if let Some(upper) = rates.upper_primary {
                config.rates.upper_primary = upper;
            }
        }
        if let Some(prices) = file.cost_per_kg {
            config.cost_per_kg.merge(&prices);
        }

        config.rates.validate()?;
        config.cost_per_kg.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("{} not found, using default configuration", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        debug!(?config, "loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;
    use crate::planner::{DEFAULT_PRIMARY_RATE, DEFAULT_UPPER_PRIMARY_RATE};

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides_merge_onto_defaults() {
        let text = r#"
            data_file = "records.json"

            [rates]
            upper_primary = 5.45

            [cost_per_kg]
            rice = 50.0
        "#;
        let config = Config::from_toml(text).unwrap();
        assert_eq!(config.data_file, PathBuf::from("records.json"));
        assert_eq!(config.rates.primary, DEFAULT_PRIMARY_RATE);
        assert_ne!(config.rates.upper_primary, DEFAULT_UPPER_PRIMARY_RATE);
        assert_eq!(config.cost_per_kg.per_kg(Ingredient::Rice), 50.0);
        assert_eq!(config.cost_per_kg.per_kg(Ingredient::Oil), 180.0);
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(Config::from_toml("[rates]\nprimary = -2.0").is_err());
    }

    #[test]
    fn test_unknown_ingredient_rejected() {
        assert!(Config::from_toml("[cost_per_kg]\npaneer = 300.0").is_err());
    }

    #[test]
    fn test_default_toml_matches_defaults() {
        let config = Config::from_toml(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/midday.toml").unwrap();
        assert_eq!(config, Config::default());
    }
}
