//! The node RPC surface consumed by the pipeline.

use async_trait::async_trait;

use crate::node::types::{BroadcastedTx, ContractInfo, ExecutedTxResult, NodeResult};
use crate::transaction::{ContractParam, SignedTransaction, TxId};

/// Read/write operations a blockchain node exposes.
///
/// Implemented over HTTP by [`crate::node::NodeClient`]; tests substitute
/// in-memory nodes.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Submit a fully signed transaction.
    async fn broadcast(&self, tx: &SignedTransaction) -> NodeResult<BroadcastedTx>;

    /// Ledger record of an included transaction.
    async fn transaction_info(&self, id: &TxId) -> NodeResult<BroadcastedTx>;

    /// Execution outcome of a contract transaction.
    async fn executed_transaction_for(&self, id: &TxId) -> NodeResult<ExecutedTxResult>;

    /// A single contract state entry.
    async fn contract_value(&self, address: &str, key: &str) -> NodeResult<ContractParam>;

    /// Contract metadata.
    async fn contract_info(&self, address: &str) -> NodeResult<ContractInfo>;
}
