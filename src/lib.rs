//! Contract deployer library.
//!
//! Builds, signs, broadcasts and tracks transactions on a permissioned
//! blockchain network, waiting for block inclusion and, for contract
//! transactions, for the execution outcome.

pub mod broadcast;
pub mod config;
pub mod contract;
pub mod error;
pub mod node;
pub mod observability;
pub mod pipeline;
pub mod proofs;
pub mod resilience;
pub mod tracking;
pub mod transaction;

pub use config::{DeployerConfig, NetworkConfig};
pub use error::{DeployError, DeployResult, ErrorKind};
pub use node::{NodeApi, NodeClient};
pub use pipeline::{Deployer, SubmitOptions};
pub use tracking::{TrackError, TrackedOutcome, TrackingMode};
