// TOML configuration: [server], [solver], [logging] and [defaults] sections
// See config/letsprice.toml for a complete example

use crate::domain::{PricingOptimizerInput, SolverBackend, SolverConfig};
use crate::infrastructure::logging::LoggingConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub solver: SolverSettings,
    pub logging: LoggingConfig,
    /// Default pricing parameters; conversion curves are always taken from here
    pub defaults: PricingOptimizerInput,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;

        if let Some(limit) = self.solver.time_limit_secs {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: "solver.time_limit_secs",
                    reason: format!("must be a positive number of seconds, got {}", limit),
                });
            }
        }

        if let Some(gap) = self.solver.gap_tolerance {
            if !(0.0..=1.0).contains(&gap) {
                return Err(ConfigError::InvalidValue {
                    field: "solver.gap_tolerance",
                    reason: format!("must be within [0, 1], got {}", gap),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub address: String,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.address
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                field: "server.address",
                reason: e.to_string(),
            })
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:50051".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub backend: SolverBackend,
    pub time_limit_secs: Option<f64>,
    pub gap_tolerance: Option<f64>,
    pub verbose: bool,
}

impl SolverSettings {
    pub fn to_solver_config(&self) -> SolverConfig {
        SolverConfig {
            backend: self.backend,
            time_limit: self.time_limit_secs,
            gap_tolerance: self.gap_tolerance,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.address, "0.0.0.0:50051");
        assert_eq!(config.solver.backend, SolverBackend::Auto);
        assert!(config.solver.time_limit_secs.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.defaults.product_ids.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            [server]
            address = "127.0.0.1:6000"

            [solver]
            backend = "micro_lp"
            time_limit_secs = 12.5
            gap_tolerance = 0.01

            [logging]
            level = "debug"
            format = "json"

            [defaults]
            product_ids = ["product-A"]

            [[defaults.conversion_rate_curves]]
            product_id = "product-A"
            curve = [
                { price = 1.0, conversion_rate = 0.5 },
                { price = 2.0, conversion_rate = 0.2 },
            ]

            [[defaults.inventories]]
            product_id = "product-A"
            inventory = 100

            [[defaults.market_sizes]]
            product_id = "product-A"
            market_size = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.server.socket_addr().unwrap().port(), 6000);
        let solver = config.solver.to_solver_config();
        assert_eq!(solver.backend, SolverBackend::MicroLp);
        assert_eq!(solver.time_limit, Some(12.5));
        assert_eq!(solver.gap_tolerance, Some(0.01));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.defaults.conversion_rate_curves[0].curve.len(), 2);
        assert_eq!(config.defaults.inventories[0].inventory, 100);
        assert!(config.defaults.adhoc_constraints.is_empty());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_toml_str("[server]\naddress = \"not an address\""),
            Err(ConfigError::InvalidValue { field: "server.address", .. })
        ));
        assert!(matches!(
            Config::from_toml_str("[solver]\ntime_limit_secs = -1.0"),
            Err(ConfigError::InvalidValue { field: "solver.time_limit_secs", .. })
        ));
        assert!(matches!(
            Config::from_toml_str("[solver]\ngap_tolerance = 2.0"),
            Err(ConfigError::InvalidValue { field: "solver.gap_tolerance", .. })
        ));
        assert!(matches!(
            Config::from_toml_str("[solver]\nbackend = \"gurobi\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
