//! Transaction construction subsystem.
//!
//! # Data Flow
//! ```text
//! Operation (typed params, optional fee)
//!     → builder.rs (fee resolution, validation)
//!     → UnsignedTransaction
//!     → codec.rs (canonical bytes, SHA-256 id)
//!     → signed.rs (SignedTransaction with ordered proofs)
//! ```
//!
//! # Design Decisions
//! - Validation happens here, before any network call
//! - Ids and signatures are computed over the same canonical bytes
//! - Proof order is insertion order and is never rearranged

pub mod builder;
pub mod codec;
pub mod signed;
pub mod types;

pub use builder::{estimate_script_fee, TxBuilder};
pub use signed::SignedTransaction;
pub use types::{
    Base58, CallContractParams, ContractParam, CreateContractParams, DataParams, IssueParams,
    Operation, ParamValue, Payment, Proof, PublicKey, SetScriptParams, TransferParams, TxId,
    TxKind, UnsignedTransaction, UpdateContractParams, ValidationError, ValidationPolicy,
    MAX_BYTECODE_SIZE,
};
