// Logging configuration and initialization

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

/// Log level filter and output format (`pretty` or `json`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Installs the global tracing subscriber. `RUST_LOG` overrides `level` when set.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: LoggingConfig = toml::from_str("level = \"debug\"").unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, "pretty");
    }
}
