//! Metrics collection.
//!
//! # Metrics
//! - `deployer_broadcasts_total` (counter): broadcasts by tx kind and result
//! - `deployer_poll_attempts_total` (counter): status queries by tracking phase
//! - `deployer_tracking_outcomes_total` (counter): final tracking outcome
//! - `deployer_tracking_duration_seconds` (histogram): time spent per phase
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels are static strings only

use std::time::Duration;

use metrics::{counter, histogram};

pub fn record_broadcast(kind: &'static str, accepted: bool) {
    let result = if accepted { "accepted" } else { "rejected" };
    counter!("deployer_broadcasts_total", "kind" => kind, "result" => result).increment(1);
}

pub fn record_poll_attempts(phase: &'static str, attempts: u32) {
    counter!("deployer_poll_attempts_total", "phase" => phase).increment(u64::from(attempts));
}

pub fn record_tracking_outcome(outcome: &'static str) {
    counter!("deployer_tracking_outcomes_total", "outcome" => outcome).increment(1);
}

pub fn record_tracking_duration(phase: &'static str, elapsed: Duration) {
    histogram!("deployer_tracking_duration_seconds", "phase" => phase)
        .record(elapsed.as_secs_f64());
}
