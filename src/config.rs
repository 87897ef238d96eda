//! Configuration management for the risk assessment service

use crate::types::RiskLevelThresholds;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub risk_levels: RiskLevelThresholds,
    #[serde(default)]
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind, e.g. "127.0.0.1:8080"
    pub bind_addr: String,
    /// Allow cross-origin requests from any origin (for a separately hosted form)
    #[serde(default)]
    pub allow_any_origin: bool,
}

/// Model artifact locations
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// JSON manifest with classifier, scaler and feature order
    pub model_path: String,
    /// JSON table of per-feature interquartile ranges
    pub normal_ranges_path: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Periodic metrics summary
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between summaries; 0 disables the reporter
    pub report_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 300,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        let app: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        self.risk_levels
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid [risk_levels] section")?;
        anyhow::ensure!(
            self.artifacts.onnx_threads > 0,
            "artifacts.onnx_threads must be at least 1"
        );
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "127.0.0.1:8080".to_string(),
                allow_any_origin: false,
            },
            artifacts: ArtifactsConfig {
                model_path: "artifacts/breast_cancer_model.json".to_string(),
                normal_ranges_path: "artifacts/normal_ranges.json".to_string(),
                onnx_threads: 1,
            },
            risk_levels: RiskLevelThresholds::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.risk_levels.moderate, 0.30);
        assert_eq!(config.risk_levels.high, 0.70);
        assert_eq!(config.artifacts.onnx_threads, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/config.toml");
        let config = AppConfig::load_from_path(path).unwrap();
        assert_eq!(config.artifacts.model_path, "artifacts/breast_cancer_model.json");
        assert_eq!(config.risk_levels, RiskLevelThresholds::default());
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[server]
bind_addr = "127.0.0.1:0"

[artifacts]
model_path = "m.json"
normal_ranges_path = "r.json"

[risk_levels]
moderate = 0.8
high = 0.4

[logging]
level = "info"
format = "pretty"
"#
        )
        .unwrap();

        assert!(AppConfig::load_from_path(file.path()).is_err());
    }
}
