//! Node API subsystem.
//!
//! # Data Flow
//! ```text
//! NetworkConfig (node URL, API key)
//!     → client.rs (HTTP requests with timeouts)
//!     → api.rs (NodeApi trait consumed by broadcaster, tracker, reader)
//!     → types.rs (BroadcastedTx, ExecutedTxResult, ContractInfo)
//! ```
//!
//! # Security Constraints
//! - The API key is sent only as a header and never logged
//! - All requests have a timeout

pub mod api;
pub mod client;
pub mod types;

pub use api::NodeApi;
pub use client::NodeClient;
pub use types::{BroadcastedTx, ContractInfo, ExecutedTxResult, NodeError, NodeResult};
