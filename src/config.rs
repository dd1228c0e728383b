//! Configuration management with validation and defaults
//!
//! Values come from an optional TOML file, then `SOLBET_*` environment
//! overrides, then validation.

use crate::errors::{ConfigurationError, FairnessResult};
use crate::fairness::bet_array::{validate_bet_array_with, FairnessPolicy};
use crate::fairness::types::DEFAULT_CLIENT_SEED_MAX_LENGTH;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Largest tolerance accepted for the fairness check
pub const MAX_FAIRNESS_TOLERANCE: f64 = 0.01;
/// Hard ceiling on a configurable client seed length
pub const MAX_CLIENT_SEED_LENGTH: usize = 256;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessConfig {
    pub client_seed: ClientSeedConfig,
    pub validation: ValidationConfig,
    pub simulator: SimulatorConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSeedConfig {
    pub max_length: usize,
}

impl Default for ClientSeedConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_CLIENT_SEED_MAX_LENGTH,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub policy: FairnessPolicy,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Bet array offered before the player types their own
    pub default_bet_array: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            default_bet_array: "[5, 0, 0, 0, 0]".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Emit one JSON object per event instead of human-readable lines
    pub json: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> FairnessResult<FairnessConfig> {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => FairnessConfig::default(),
        };

        apply_overrides(&mut config, |key| env::var(key).ok())?;
        validate(&config)?;

        tracing::debug!(?config, "Loaded fairness configuration");
        Ok(config)
    }

    fn load_from_file(&self, path: &Path) -> Result<FairnessConfig, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, config: &FairnessConfig, path: P) -> FairnessResult<()> {
        let path = path.as_ref();
        let toml_string = toml::to_string_pretty(config).map_err(ConfigurationError::from)?;

        std::fs::write(path, toml_string).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path.display(), e))
                .into()
        })
    }
}

/// Apply `SOLBET_*` overrides read through `lookup`
fn apply_overrides<F>(config: &mut FairnessConfig, lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("SOLBET_CLIENT_SEED_MAX_LENGTH") {
        config.client_seed.max_length = value.parse().map_err(|_| ConfigurationError::InvalidValue {
            field: "SOLBET_CLIENT_SEED_MAX_LENGTH".to_string(),
            value: value.clone(),
            reason: "Invalid length".to_string(),
        })?;
    }

    if let Some(value) = lookup("SOLBET_FAIRNESS_TOLERANCE") {
        config.validation.policy = if value.eq_ignore_ascii_case("exact") {
            FairnessPolicy::Exact
        } else {
            let epsilon = value.parse().map_err(|_| ConfigurationError::InvalidValue {
                field: "SOLBET_FAIRNESS_TOLERANCE".to_string(),
                value: value.clone(),
                reason: "Expected 'exact' or a number".to_string(),
            })?;
            FairnessPolicy::Tolerance(epsilon)
        };
    }

    if let Some(value) = lookup("SOLBET_LOG_LEVEL") {
        config.logging.level = value.parse().map_err(|reason| ConfigurationError::InvalidValue {
            field: "SOLBET_LOG_LEVEL".to_string(),
            value: value.clone(),
            reason,
        })?;
    }

    Ok(())
}

/// Validate configuration values
pub fn validate(config: &FairnessConfig) -> Result<(), ConfigurationError> {
    let max_length = config.client_seed.max_length;
    if max_length == 0 || max_length > MAX_CLIENT_SEED_LENGTH {
        return Err(ConfigurationError::InvalidValue {
            field: "client_seed.max_length".to_string(),
            value: max_length.to_string(),
            reason: format!("Must be between 1 and {}", MAX_CLIENT_SEED_LENGTH),
        });
    }

    if let FairnessPolicy::Tolerance(epsilon) = config.validation.policy {
        if !epsilon.is_finite() || !(0.0..=MAX_FAIRNESS_TOLERANCE).contains(&epsilon) {
            return Err(ConfigurationError::InvalidValue {
                field: "validation.policy".to_string(),
                value: epsilon.to_string(),
                reason: format!("Tolerance must be within [0, {}]", MAX_FAIRNESS_TOLERANCE),
            });
        }
    }

    let default_bet =
        validate_bet_array_with(&config.simulator.default_bet_array, config.validation.policy);
    if !default_bet.is_allowed() {
        return Err(ConfigurationError::InvalidValue {
            field: "simulator.default_bet_array".to_string(),
            value: config.simulator.default_bet_array.clone(),
            reason: default_bet.message,
        });
    }

    Ok(())
}

/// Generate a sample configuration file
pub fn generate_sample_config<P: AsRef<Path>>(path: P) -> FairnessResult<()> {
    ConfigLoader::new().save(&FairnessConfig::default(), path)
}
