//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the deployer.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the deployer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeployerConfig {
    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Confirmation tracker settings shared by every network.
    pub tracker: TrackerConfig,

    /// Network environments keyed by name (e.g. "mainnet", "testnet").
    pub networks: BTreeMap<String, NetworkConfig>,
}

/// Immutable per-environment network settings.
///
/// Loaded once at process start and shared read-only by every operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Environment name used in logs.
    pub name: String,

    /// Node REST API base URL (e.g. "https://node.example.com").
    pub node_api: String,

    /// How long the tracker waits for each confirmation phase, in milliseconds.
    pub node_timeout_ms: u64,

    /// Chain identifier byte (e.g. 84 for 'T').
    pub chain_id: u8,

    /// Node API key. May be overridden by the `DEPLOYER_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: String,

    /// Per-operation default fees.
    pub fees: FeeSchedule,
}

impl NetworkConfig {
    /// Node wait budget as a `Duration`.
    pub fn node_timeout(&self) -> Duration {
        Duration::from_millis(self.node_timeout_ms)
    }
}

/// Default fee per operation kind, in the smallest token unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeeSchedule {
    /// Transfers and data writes.
    pub transfer: u64,

    /// Contract calls.
    pub invoke: u64,

    /// Asset issue.
    pub issue: u64,

    /// Account script installation.
    pub set_script: u64,

    /// Contract create and update.
    pub set_wasm_script: u64,

    /// Surcharge added to defaulted fees for scripted (smart) sender accounts.
    #[serde(default)]
    pub additional: u64,
}

/// Confirmation tracker settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Fixed delay between polling attempts in milliseconds.
    pub poll_interval_ms: u64,

    /// Optional cap on polling attempts per phase, in addition to the time budget.
    pub max_poll_attempts: Option<u32>,
}

impl TrackerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            max_poll_attempts: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
