//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! broadcast/, tracking/ produce:
//!     → logging.rs (structured log events, tx id on every line)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON optional) for machine parsing
//! - Private keys and API keys are never logged

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
