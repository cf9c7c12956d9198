//! Confirmation tracker: bounded polling for inclusion and execution.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

use crate::config::{NetworkConfig, TrackerConfig};
use crate::node::{BroadcastedTx, ExecutedTxResult, NodeApi};
use crate::observability::metrics;
use crate::resilience::{poll_until, CancellationToken, DeadlineTimer, PollOutcome, PollPolicy, StopReason};
use crate::transaction::{TxId, TxKind};

/// Which terminal state a submission is tracked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode {
    /// Stop once the ledger record exists.
    InclusionOnly,
    /// Reach inclusion, then wait for the contract execution record.
    ExecutionAware,
}

impl TrackingMode {
    /// Contract transactions run code after inclusion; everything else is done once included.
    pub fn for_kind(kind: TxKind) -> Self {
        if kind.is_contract_execution() {
            TrackingMode::ExecutionAware
        } else {
            TrackingMode::InclusionOnly
        }
    }
}

/// Polling phase, each with its own wait budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackPhase {
    Inclusion,
    Execution,
}

impl TrackPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TrackPhase::Inclusion => "inclusion",
            TrackPhase::Execution => "execution",
        }
    }
}

impl fmt::Display for TrackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a tracked transaction.
///
/// `Submitted → Included → (Executed | ExecutionFailed)`, with `TimedOut`
/// reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Submitted,
    Included,
    Executed,
    ExecutionFailed,
    TimedOut,
}

/// Successful terminal result of tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "record", rename_all = "snake_case")]
pub enum TrackedOutcome {
    Included(BroadcastedTx),
    Executed(ExecutedTxResult),
}

impl TrackedOutcome {
    /// Identifier of the tracked transaction as recorded by the node.
    pub fn tx_id(&self) -> &str {
        match self {
            TrackedOutcome::Included(tx) => &tx.id,
            TrackedOutcome::Executed(result) => result
                .tx
                .as_ref()
                .map(|tx| tx.id.as_str())
                .unwrap_or(&result.record.id),
        }
    }
}

/// Tracking failures surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    /// No terminal record before the wait budget ran out. The outcome is unknown.
    #[error("Tx wait stopped: timeout after {waited_ms} ms waiting for {phase} of {tx_id} ({attempts} attempts)")]
    Timeout {
        tx_id: TxId,
        phase: TrackPhase,
        waited_ms: u64,
        attempts: u32,
    },

    /// The contract ran and the node reported a nonzero status.
    #[error("Contract execution of {tx_id} failed with status {status_code}: {message}")]
    ExecutionFailed {
        tx_id: TxId,
        status_code: i32,
        message: String,
        result: Box<ExecutedTxResult>,
    },
}

/// Polls a node until a transaction reaches a terminal state or the wait expires.
#[derive(Clone)]
pub struct Tracker {
    node: Arc<dyn NodeApi>,
    node_timeout: Duration,
    policy: PollPolicy,
}

impl Tracker {
    pub fn new(node: Arc<dyn NodeApi>, network: &NetworkConfig, config: &TrackerConfig) -> Self {
        Self {
            node,
            node_timeout: network.node_timeout(),
            policy: PollPolicy {
                interval: config.poll_interval(),
                max_attempts: config.max_poll_attempts,
            },
        }
    }

    /// Track `id` to the terminal state selected by `mode`.
    ///
    /// Each phase gets a fresh `node_timeout` budget.
    pub async fn track(&self, id: &TxId, mode: TrackingMode) -> Result<TrackedOutcome, TrackError> {
        tracing::debug!(tx_id = %id, state = ?TxState::Submitted, ?mode, "Tracking transaction");

        let included = self.await_inclusion(id).await?;
        tracing::info!(tx_id = %id, state = ?TxState::Included, "Transaction included");

        if mode == TrackingMode::InclusionOnly {
            metrics::record_tracking_outcome("included");
            return Ok(TrackedOutcome::Included(included));
        }

        let executed = self.await_execution(id).await?;
        if executed.is_success() {
            tracing::info!(tx_id = %id, state = ?TxState::Executed, "Contract executed");
            metrics::record_tracking_outcome("executed");
            return Ok(TrackedOutcome::Executed(executed));
        }

        let message = executed
            .error_message
            .clone()
            .unwrap_or_else(|| format!("status code {}", executed.status_code));
        tracing::warn!(
            tx_id = %id,
            state = ?TxState::ExecutionFailed,
            status_code = executed.status_code,
            error = %message,
            "Contract execution failed"
        );
        metrics::record_tracking_outcome("execution_failed");

        Err(TrackError::ExecutionFailed {
            tx_id: *id,
            status_code: executed.status_code,
            message,
            result: Box::new(executed),
        })
    }

    async fn await_inclusion(&self, id: &TxId) -> Result<BroadcastedTx, TrackError> {
        self.run_phase(id, TrackPhase::Inclusion, || self.node.transaction_info(id))
            .await
    }

    async fn await_execution(&self, id: &TxId) -> Result<ExecutedTxResult, TrackError> {
        self.run_phase(id, TrackPhase::Execution, || {
            self.node.executed_transaction_for(id)
        })
        .await
    }

    async fn run_phase<T, F, Fut>(
        &self,
        id: &TxId,
        phase: TrackPhase,
        query: F,
    ) -> Result<T, TrackError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = crate::node::NodeResult<T>>,
    {
        let token = CancellationToken::new();
        let timer = DeadlineTimer::start(self.node_timeout, token.clone());
        let started = Instant::now();

        let outcome = poll_until(phase.as_str(), &self.policy, &token, query).await;
        timer.disarm();

        let elapsed = started.elapsed();
        metrics::record_tracking_duration(phase.as_str(), elapsed);

        match outcome {
            PollOutcome::Ready { value, attempts } => {
                metrics::record_poll_attempts(phase.as_str(), attempts);
                Ok(value)
            }
            PollOutcome::Stopped { reason, attempts } => {
                metrics::record_poll_attempts(phase.as_str(), attempts);
                metrics::record_tracking_outcome("timeout");
                tracing::warn!(
                    tx_id = %id,
                    state = ?TxState::TimedOut,
                    %phase,
                    attempts,
                    exhausted = reason == StopReason::AttemptsExhausted,
                    "Tx wait stopped: timeout"
                );
                Err(TrackError::Timeout {
                    tx_id: *id,
                    phase,
                    waited_ms: elapsed.as_millis() as u64,
                    attempts,
                })
            }
        }
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("node_timeout", &self.node_timeout)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_for_kind() {
        assert_eq!(TrackingMode::for_kind(TxKind::Transfer), TrackingMode::InclusionOnly);
        assert_eq!(TrackingMode::for_kind(TxKind::SetScript), TrackingMode::InclusionOnly);
        assert_eq!(TrackingMode::for_kind(TxKind::CallContract), TrackingMode::ExecutionAware);
        assert_eq!(TrackingMode::for_kind(TxKind::CreateContract), TrackingMode::ExecutionAware);
    }

    #[test]
    fn test_timeout_message() {
        let err = TrackError::Timeout {
            tx_id: TxId([1; 32]),
            phase: TrackPhase::Inclusion,
            waited_ms: 3000,
            attempts: 3,
        };
        assert!(err.to_string().starts_with("Tx wait stopped: timeout"));
    }
}
