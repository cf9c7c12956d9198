//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Bounded wait on the node:
//!     → timeouts.rs (deadline timer cancels the token on expiry)
//!     → cancel.rs (token shared by timer and loop)
//!     → retries.rs (poll with fixed backoff, check token at each boundary)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every wait has a deadline
//! - The timer is the single source of cancellation for a wait
//! - Broadcasts are never retried; only read-only polls are

pub mod cancel;
pub mod retries;
pub mod timeouts;

pub use cancel::CancellationToken;
pub use retries::{poll_until, PollOutcome, PollPolicy, StopReason};
pub use timeouts::DeadlineTimer;
