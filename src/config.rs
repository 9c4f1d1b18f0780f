use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::artifacts::{ArtifactPaths, DEFAULT_ENCODERS_FILE, DEFAULT_FEATURES_FILE, DEFAULT_MODEL_FILE};
use crate::error::ConfigError;
use crate::input::form::{default_bounds, FieldBounds};
use crate::scoring::RiskThresholds;

/// Root configuration structure, deserialized from `.churn-checkr/config.toml`.
///
/// ```toml
/// [artifacts]
/// dir = "models"
///
/// [thresholds]
/// medium = 0.25
/// high = 0.65
///
/// [form.tenure]
/// min = 0
/// max = 120
/// default = 24
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub artifacts: ArtifactConfig,
    pub thresholds: RiskThresholds,
    /// Bounds for single-record entry, merged over the built-in ones.
    pub form: BTreeMap<String, FieldBounds>,
}

/// Where the trained model lives. File names are resolved against `dir`
/// unless absolute.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub dir: PathBuf,
    pub model: PathBuf,
    pub encoders: PathBuf,
    pub features: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            model: PathBuf::from(DEFAULT_MODEL_FILE),
            encoders: PathBuf::from(DEFAULT_ENCODERS_FILE),
            features: PathBuf::from(DEFAULT_FEATURES_FILE),
        }
    }
}

impl ArtifactConfig {
    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.dir.join(&self.model),
            encoders: self.dir.join(&self.encoders),
            features: self.dir.join(&self.features),
        }
    }
}

impl Config {
    /// Parse a TOML document, fill in built-in form bounds and validate.
    pub fn from_toml(content: &str) -> Result<Config> {
        let mut config: Config = toml::from_str(content)?;
        config.finish()?;
        Ok(config)
    }

    fn finish(&mut self) -> Result<(), ConfigError> {
        for (field, bounds) in default_bounds() {
            self.form.entry(field).or_insert(bounds);
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        for (field, b) in &self.form {
            if b.min > b.max {
                return Err(ConfigError::InvalidBounds {
                    field: field.clone(),
                    min: b.min,
                    max: b.max,
                });
            }
        }
        Ok(())
    }

    /// The built-in configuration used when no file is found.
    pub fn builtin() -> Config {
        Config {
            form: default_bounds(),
            ..Config::default()
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    Config::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`, the path passed via `--config`
/// 2. `<working_dir>/.churn-checkr/config.toml`
/// 3. `~/.config/churn-checkr/config.toml`
/// 4. Built-in [`Config::builtin`]
pub fn load_config(working_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let local_config = working_dir.join(".churn-checkr").join("config.toml");
    if local_config.exists() {
        return read_config(&local_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("churn-checkr").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::builtin())
}
