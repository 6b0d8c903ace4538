use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_SCHEMA;
use crate::error::{IntakeError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub export: ExportConfig,
    pub import: ImportConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload body, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("candidates.db"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Source schema used when an upload does not name one
    pub default_schema: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_schema: DEFAULT_SCHEMA.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9898,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    /// Load `config.toml` if present, otherwise defaults, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        let config = if path.exists() {
            Self::load_from(path)?
        } else {
            Self::default()
        };
        config.with_env_overrides()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            IntakeError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// `PORT`, `INTAKE_DATABASE_PATH` and `INTAKE_EXPORT_DIR` take precedence over the file.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| IntakeError::Config(format!("PORT is not a valid port: '{}'", port)))?;
        }
        if let Ok(path) = std::env::var("INTAKE_DATABASE_PATH") {
            if !path.trim().is_empty() {
                self.storage.database_path = PathBuf::from(path);
            }
        }
        if let Ok(dir) = std::env::var("INTAKE_EXPORT_DIR") {
            if !dir.trim().is_empty() {
                self.export.output_dir = PathBuf::from(dir);
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.database_path, PathBuf::from("candidates.db"));
        assert_eq!(config.import.default_schema, "direct");
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [import]
            default_schema = "derived"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.import.default_schema, "derived");
        assert_eq!(config.export.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let err = Config::from_toml("[server\nport = 1").unwrap_err();
        assert!(matches!(err, IntakeError::Toml(_)));
    }
}
