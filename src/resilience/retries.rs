//! Retry-until-deadline polling.
//!
//! # Responsibilities
//! - Re-run a query with a fixed backoff until it succeeds
//! - Stop at the first retry boundary after the cancellation token fires
//! - Optionally stop after a maximum number of attempts
//!
//! # Design Decisions
//! - Every failure is treated as transient; callers map terminal results
//!   into successes of the query itself
//! - An attempt already in flight is never aborted: a success that arrives
//!   after the deadline is still returned, a failure is discarded
//! - The backoff wakes early on cancellation, so the loop ends within one
//!   backoff of the deadline

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::resilience::cancel::CancellationToken;

/// How often and how many times to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed delay between attempts.
    pub interval: Duration,
    /// Optional cap on attempts, in addition to the cancellation token.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

/// Why polling stopped without a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation token fired.
    Cancelled,
    /// `max_attempts` was reached.
    AttemptsExhausted,
}

/// Result of [`poll_until`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready { value: T, attempts: u32 },
    Stopped { reason: StopReason, attempts: u32 },
}

/// Run `attempt` until it returns `Ok`, the token is cancelled, or attempts run out.
///
/// The token is checked at each retry boundary, after the backoff.
pub async fn poll_until<T, E, F, Fut>(
    operation: &str,
    policy: &PollPolicy,
    token: &CancellationToken,
    mut attempt: F,
) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        match attempt().await {
            Ok(value) => return PollOutcome::Ready { value, attempts },
            Err(e) => {
                tracing::debug!(
                    operation,
                    attempt = attempts,
                    error = %e,
                    "Attempt failed, will retry"
                );
            }
        }

        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                return PollOutcome::Stopped {
                    reason: StopReason::AttemptsExhausted,
                    attempts,
                };
            }
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {}
            _ = sleep(policy.interval) => {}
        }

        if token.is_cancelled() {
            return PollOutcome::Stopped {
                reason: StopReason::Cancelled,
                attempts,
            };
        }
    }
}
