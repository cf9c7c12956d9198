//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::config::schema::{DeployerConfig, NetworkConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides the selected network's API key.
pub const API_KEY_ENV_VAR: &str = "DEPLOYER_API_KEY";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    UnknownNetwork { name: String, available: Vec<String> },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::UnknownNetwork { name, available } => write!(
                f,
                "Unknown network '{}' (available: {})",
                name,
                available.join(", ")
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DeployerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: DeployerConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        path = %path.display(),
        networks = config.networks.len(),
        "Configuration loaded"
    );

    Ok(config)
}

impl DeployerConfig {
    /// Select a network environment by name.
    ///
    /// The API key is taken from `DEPLOYER_API_KEY` when that variable is set.
    pub fn network(&self, name: &str) -> Result<Arc<NetworkConfig>, ConfigError> {
        self.network_with_api_key(name, std::env::var(API_KEY_ENV_VAR).ok())
    }

    /// Select a network environment, replacing its API key when `api_key` is given.
    pub fn network_with_api_key(
        &self,
        name: &str,
        api_key: Option<String>,
    ) -> Result<Arc<NetworkConfig>, ConfigError> {
        let mut network = self
            .networks
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownNetwork {
                name: name.to_string(),
                available: self.networks.keys().cloned().collect(),
            })?;

        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            network.api_key = key;
        }

        Ok(Arc::new(network))
    }
}
