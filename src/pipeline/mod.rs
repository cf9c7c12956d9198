//! Deployer pipeline.
//!
//! # Data Flow
//! ```text
//! Operation
//!     → transaction/ (build, validate, resolve fee)
//!     → proofs/ (primary signature, then generator proofs)
//!     → broadcast/ (single submission)
//!     → tracking/ (inclusion, then execution for contract kinds)
//!     → TrackedOutcome | DeployError
//! ```
//!
//! # Design Decisions
//! - One transaction lifecycle at a time; no parallel submissions
//! - File I/O for bytecode happens here, never in the builder

pub mod deployer;

pub use deployer::{Deployer, SubmitOptions};
