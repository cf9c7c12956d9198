//! Crate-level error for the submit-and-track pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::broadcast::BroadcastError;
use crate::proofs::ProofError;
use crate::tracking::TrackError;
use crate::transaction::ValidationError;

/// Every way a submission can end without a terminal success.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Rejected locally before any network call.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Signing or proof aggregation failed before broadcast.
    #[error("Proof generation failed: {0}")]
    Proof(#[from] ProofError),

    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    #[error(transparent)]
    Tracking(#[from] TrackError),

    /// Bytecode file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification for callers and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Proof,
    Broadcast,
    Timeout,
    ExecutionFailure,
    Io,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Proof => "proof",
            ErrorKind::Broadcast => "broadcast",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ExecutionFailure => "execution_failure",
            ErrorKind::Io => "io",
        }
    }
}

impl DeployError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeployError::Validation(_) => ErrorKind::Validation,
            DeployError::Proof(_) => ErrorKind::Proof,
            DeployError::Broadcast(_) => ErrorKind::Broadcast,
            DeployError::Tracking(TrackError::Timeout { .. }) => ErrorKind::Timeout,
            DeployError::Tracking(TrackError::ExecutionFailed { .. }) => ErrorKind::ExecutionFailure,
            DeployError::Io { .. } => ErrorKind::Io,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}

/// Result type for pipeline operations.
pub type DeployResult<T> = Result<T, DeployError>;
