//! Signing and proof aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! UnsignedTransaction
//!     → signer.rs (SigningDevice: primary signature over canonical bytes)
//!     → aggregator.rs (append generator proofs in returned order)
//!     → generator.rs (LocalSigner | MultisigQuorumCollector | NoOpProofs)
//!     → SignedTransaction ready for broadcast
//! ```
//!
//! # Design Decisions
//! - Multisig semantics live entirely behind `ProofsGenerator`; the builder
//!   and broadcaster know nothing about them
//! - The primary signer must match the transaction's sender key

use thiserror::Error;

pub mod aggregator;
pub mod generator;
pub mod signer;

pub use aggregator::{attach_proofs, sign_primary};
pub use generator::{LocalSigner, MultisigQuorumCollector, NoOpProofs, ProofsGenerator};
pub use signer::{KeypairSigner, SigningDevice};

/// Errors raised while producing proofs, before broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    /// The signing device failed or refused.
    #[error("Signer error: {0}")]
    Signer(String),

    /// Signing device key differs from the transaction's sender key.
    #[error("Signer {signer} does not match transaction sender {sender}")]
    SenderMismatch { sender: String, signer: String },

    /// Not enough co-signers approved.
    #[error("Multisig quorum not reached: {approved} of {required} approvals")]
    QuorumNotReached { approved: usize, required: usize },

    /// Quorum outside 1..=number of co-signers.
    #[error("Invalid quorum {quorum} for {signers} co-signers")]
    InvalidQuorum { quorum: usize, signers: usize },
}
