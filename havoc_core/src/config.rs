use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors raised when [`MutatorSettings`] hold values the mutator cannot work with.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Every output would be truncated to nothing.
    #[error("max-input-size must be at least 1")]
    ZeroMaxInputSize,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct MutatorSettings {
    /// Every generated input is truncated to this many bytes.
    #[serde(default = "default_max_input_size")]
    pub max_input_size: usize,
    /// RNG seed. When absent a fresh seed is drawn and logged.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Operator draws per round before falling back to a bit flip.
    #[serde(default = "default_max_operator_retries")]
    pub max_operator_retries: usize,
}

pub fn default_max_input_size() -> usize {
    1 << 20
}

pub fn default_max_operator_retries() -> usize {
    100
}

impl MutatorSettings {
    /// Checks the settings before a [`crate::Mutator`] is built from them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_input_size == 0 {
            return Err(ConfigError::ZeroMaxInputSize);
        }
        Ok(())
    }
}

impl Default for MutatorSettings {
    fn default() -> Self {
        Self {
            max_input_size: default_max_input_size(),
            seed: None,
            max_operator_retries: default_max_operator_retries(),
        }
    }
}

/// Top-level configuration document, one table per component.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct HavocConfig {
    #[serde(default)]
    pub mutator: MutatorSettings,
}

impl HavocConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {:?}: {}", path, e))?;
        Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {:?}: {}", path, e))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, anyhow::Error> {
        let config: HavocConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.mutator.validate()?;
        Ok(config)
    }
}
