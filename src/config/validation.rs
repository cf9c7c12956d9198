//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, fees > 0)
//! - Check that every network's node URL parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DeployerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::{DeployerConfig, NetworkConfig};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. "networks.testnet.fees.invoke").
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &DeployerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.tracker.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "tracker.poll_interval_ms",
            "must be greater than 0",
        ));
    }

    if config.tracker.max_poll_attempts == Some(0) {
        errors.push(ValidationError::new(
            "tracker.max_poll_attempts",
            "must be greater than 0 when set",
        ));
    }

    for (key, network) in &config.networks {
        if network.name != *key {
            errors.push(ValidationError::new(
                format!("networks.{}.name", key),
                format!("expected '{}', found '{}'", key, network.name),
            ));
        }
        validate_network(key, network, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a single network section.
pub fn validate_network(key: &str, network: &NetworkConfig, errors: &mut Vec<ValidationError>) {
    let prefix = format!("networks.{}", key);

    if network.name.trim().is_empty() {
        errors.push(ValidationError::new(format!("{}.name", prefix), "must not be empty"));
    }

    if let Err(e) = url::Url::parse(&network.node_api) {
        errors.push(ValidationError::new(
            format!("{}.node_api", prefix),
            format!("invalid URL '{}': {}", network.node_api, e),
        ));
    }

    if network.node_timeout_ms == 0 {
        errors.push(ValidationError::new(
            format!("{}.node_timeout_ms", prefix),
            "must be greater than 0",
        ));
    }

    let fees = &network.fees;
    for (name, value) in [
        ("transfer", fees.transfer),
        ("invoke", fees.invoke),
        ("issue", fees.issue),
        ("set_script", fees.set_script),
        ("set_wasm_script", fees.set_wasm_script),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(
                format!("{}.fees.{}", prefix, name),
                "must be greater than 0",
            ));
        }
    }
}
