//! Single-shot submission of signed transactions.

use std::sync::Arc;

use thiserror::Error;

use crate::node::{NodeApi, NodeError};
use crate::observability::metrics;
use crate::transaction::{SignedTransaction, TxId};

/// The node did not accept the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    /// Rejected by the node (`status` set) or lost in transit (`status` unset).
    #[error("Broadcast of {tx_id} rejected{}: {reason}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Rejected {
        tx_id: TxId,
        status: Option<u16>,
        reason: String,
    },
}

/// Submits a signed transaction exactly once.
///
/// Never retries: a resubmission after an ambiguous failure could be
/// accepted twice under a new timestamp.
#[derive(Clone)]
pub struct Broadcaster {
    node: Arc<dyn NodeApi>,
}

impl Broadcaster {
    pub fn new(node: Arc<dyn NodeApi>) -> Self {
        Self { node }
    }

    /// Submit `tx` and return the identifier the node accepted it under.
    pub async fn broadcast(&self, tx: SignedTransaction) -> Result<TxId, BroadcastError> {
        let local_id = tx.id();
        let kind = tx.kind();

        tracing::info!(
            tx_id = %local_id,
            kind = %kind,
            fee = tx.fee(),
            proofs = tx.proofs().len(),
            "Broadcasting transaction"
        );

        let accepted = match self.node.broadcast(&tx).await {
            Ok(accepted) => accepted,
            Err(e) => {
                metrics::record_broadcast(kind.as_str(), false);
                tracing::error!(tx_id = %local_id, error = %e, "Broadcast failed");
                let (status, reason) = match e {
                    NodeError::Rejected { status, message } => (Some(status), message),
                    other => (None, other.to_string()),
                };
                return Err(BroadcastError::Rejected {
                    tx_id: local_id,
                    status,
                    reason,
                });
            }
        };

        metrics::record_broadcast(kind.as_str(), true);

        let id = match accepted.id.parse::<TxId>() {
            Ok(node_id) if node_id == local_id => node_id,
            Ok(node_id) => {
                tracing::warn!(
                    tx_id = %local_id,
                    node_tx_id = %node_id,
                    "Node assigned a different transaction id"
                );
                node_id
            }
            Err(e) => {
                tracing::warn!(
                    tx_id = %local_id,
                    node_tx_id = %accepted.id,
                    error = %e,
                    "Node returned an unparsable transaction id, using local id"
                );
                local_id
            }
        };

        tracing::info!(tx_id = %id, "Transaction accepted");
        Ok(id)
    }
}
