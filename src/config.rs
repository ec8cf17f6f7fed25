//! Configuration management for the sentiment form

use crate::types::AnalysisType;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Environment prefix, e.g. `SENTIMENT_FORM__ARTIFACTS__DIR=models`
pub const ENV_PREFIX: &str = "SENTIMENT_FORM";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub form: FormConfig,
    pub logging: LoggingConfig,
}

/// Locations of the two pre-trained artifacts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Directory holding the artifact files
    pub dir: String,
    /// Serialized classifier (`.json`, or `.onnx` with the `onnx` feature)
    pub model_file: String,
    /// Serialized vectorizer
    pub vectorizer_file: String,
    /// Label order of an ONNX classifier's probability output
    pub classes: Vec<String>,
    /// Intra-op threads for ONNX inference
    pub onnx_threads: usize,
}

impl ArtifactsConfig {
    pub fn model_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.model_file)
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.vectorizer_file)
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            model_file: "model.json".to_string(),
            vectorizer_file: "vectorizer.json".to_string(),
            classes: vec!["negative".to_string(), "positive".to_string()],
            onnx_threads: 1,
        }
    }
}

/// Initial form settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Show prediction confidence
    pub show_confidence: bool,
    pub analysis_type: AnalysisType,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file layered under environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("sentiment-form-config-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.artifacts.model_path(), Path::new("./model.json"));
        assert_eq!(config.artifacts.vectorizer_path(), Path::new("./vectorizer.json"));
        assert!(!config.form.show_confidence);
        assert_eq!(config.form.analysis_type, AnalysisType::Product);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_from_path(temp_dir().join("absent.toml")).unwrap();
        assert_eq!(config.artifacts.model_file, "model.json");
        assert_eq!(config.artifacts.onnx_threads, 1);
    }

    #[test]
    fn test_partial_file_overrides() {
        let dir = temp_dir();
        let path = dir.join("config.toml");
        fs::write(
            &path,
            concat!(
                "[artifacts]\ndir = \"models\"\n\n",
                "[form]\nshow_confidence = true\nanalysis_type = \"service\"\n",
            ),
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.artifacts.model_path(), Path::new("models/model.json"));
        assert!(config.form.show_confidence);
        assert_eq!(config.form.analysis_type, AnalysisType::Service);
    }

    #[test]
    fn test_environment_override() {
        std::env::set_var("SENTIMENT_FORM__LOGGING__LEVEL", "debug");
        let config = AppConfig::load_from_path(temp_dir().join("absent.toml")).unwrap();
        std::env::remove_var("SENTIMENT_FORM__LOGGING__LEVEL");
        assert_eq!(config.logging.level, "debug");
    }
}
