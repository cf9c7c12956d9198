//! Typed reads of contract state.

use std::sync::Arc;

use crate::node::{ContractInfo, NodeApi, NodeError, NodeResult};
use crate::transaction::{ContractParam, ParamValue};

/// Reads contract state entries and metadata through the node.
#[derive(Clone)]
pub struct ContractReader {
    node: Arc<dyn NodeApi>,
}

impl ContractReader {
    pub fn new(node: Arc<dyn NodeApi>) -> Self {
        Self { node }
    }

    /// Raw state entry under `key`.
    pub async fn value(&self, contract_id: &str, key: &str) -> NodeResult<ContractParam> {
        tracing::debug!(contract_id, key, "Reading contract value");
        self.node.contract_value(contract_id, key).await
    }

    pub async fn integer_value(&self, contract_id: &str, key: &str) -> NodeResult<i64> {
        match self.value(contract_id, key).await?.value {
            ParamValue::Integer(v) => Ok(v),
            other => Err(mismatch(key, "integer", &other)),
        }
    }

    pub async fn string_value(&self, contract_id: &str, key: &str) -> NodeResult<String> {
        match self.value(contract_id, key).await?.value {
            ParamValue::String(v) => Ok(v),
            other => Err(mismatch(key, "string", &other)),
        }
    }

    pub async fn boolean_value(&self, contract_id: &str, key: &str) -> NodeResult<bool> {
        match self.value(contract_id, key).await?.value {
            ParamValue::Boolean(v) => Ok(v),
            other => Err(mismatch(key, "boolean", &other)),
        }
    }

    pub async fn binary_value(&self, contract_id: &str, key: &str) -> NodeResult<Vec<u8>> {
        match self.value(contract_id, key).await?.value {
            ParamValue::Binary(v) => Ok(v),
            other => Err(mismatch(key, "binary", &other)),
        }
    }

    pub async fn info(&self, contract_id: &str) -> NodeResult<ContractInfo> {
        self.node.contract_info(contract_id).await
    }
}

fn mismatch(key: &str, expected: &'static str, actual: &ParamValue) -> NodeError {
    NodeError::UnexpectedValueType {
        key: key.to_string(),
        expected,
        actual: actual.type_name(),
    }
}
