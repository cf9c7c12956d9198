//! Node response records and error definitions.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors returned by the node API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The requested record does not exist (yet).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Connection or protocol failure before a response was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request did not complete within the per-request timeout.
    #[error("Node request timed out after {0} seconds")]
    Timeout(u64),

    /// Node answered with a non-success status.
    #[error("Node rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Failed to decode node response: {0}")]
    Decode(String),

    /// Contract value exists but has a different type than requested.
    #[error("Contract value '{key}' is {actual}, expected {expected}")]
    UnexpectedValueType {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Node endpoint URL could not be used.
    #[error("Invalid node URL: {0}")]
    InvalidUrl(String),
}

impl NodeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, NodeError::NotFound(_))
    }
}

/// Result type for node operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Transaction record acknowledged by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastedTx {
    pub id: String,
    pub sender_public_key: String,
    #[serde(rename = "type")]
    pub tx_type: u8,
    pub version: u8,
    pub fee: u64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: u64,
}

/// Outcome of a contract transaction, reported once the contract has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutedTxResult {
    /// The executed-transaction record itself.
    #[serde(flatten)]
    pub record: BroadcastedTx,
    /// 0 on success; any other value means execution failed.
    pub status_code: i32,
    #[serde(default)]
    pub error_message: Option<String>,
    /// The original contract transaction.
    #[serde(default)]
    pub tx: Option<BroadcastedTx>,
}

impl ExecutedTxResult {
    pub fn is_success(&self) -> bool {
        self.status_code == 0
    }
}

/// Aggregate contract metadata. Fields the crate does not model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub contract_id: String,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Nodes report timestamps as numbers or numeric strings.
fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
