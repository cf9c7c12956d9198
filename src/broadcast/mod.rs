//! Broadcast subsystem.
//!
//! # Data Flow
//! ```text
//! SignedTransaction (all proofs attached)
//!     → broadcaster.rs (one POST to the node, no retry)
//!     → TxId handed to tracking/
//! ```

pub mod broadcaster;

pub use broadcaster::{BroadcastError, Broadcaster};
