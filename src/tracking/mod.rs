//! Confirmation tracking subsystem.
//!
//! # Data Flow
//! ```text
//! TxId (accepted by the node)
//!     → tracker.rs (inclusion phase: poll transaction_info)
//!     → tracker.rs (execution phase, contract kinds only: poll executed_transaction_for)
//!     → TrackedOutcome | TrackError::{Timeout, ExecutionFailed}
//! ```
//!
//! # Design Decisions
//! - Not-found and network errors while polling are transient and never surfaced
//! - Timeout is kept distinct from execution failure: one means the outcome is
//!   unknown, the other that it is known to have failed

pub mod tracker;

pub use tracker::{TrackError, TrackPhase, TrackedOutcome, Tracker, TrackingMode, TxState};
