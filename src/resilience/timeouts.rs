//! Deadline enforcement.
//!
//! # Responsibilities
//! - Fire a cancellation token when a wait budget expires
//! - Disarm cleanly when the wait finishes first
//!
//! # Design Decisions
//! - Uses Tokio's timer facilities
//! - The timer only cancels; the waiting loop decides what to do about it

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::resilience::cancel::CancellationToken;

/// Cancels a token after a fixed duration unless disarmed first.
///
/// Dropping the timer disarms it.
#[derive(Debug)]
pub struct DeadlineTimer {
    handle: JoinHandle<()>,
}

impl DeadlineTimer {
    /// Start a timer that cancels `token` after `duration`.
    pub fn start(duration: Duration, token: CancellationToken) -> Self {
        let handle = tokio::spawn(async move {
            sleep(duration).await;
            tracing::debug!(duration_ms = duration.as_millis() as u64, "Deadline expired");
            token.cancel();
        });
        Self { handle }
    }

    /// Stop the timer without cancelling the token.
    pub fn disarm(self) {}
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
