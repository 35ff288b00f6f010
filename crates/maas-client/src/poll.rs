//! Waiting for a machine to reach a status.
//!
//! MAAS performs commissioning, deployment and release asynchronously; the
//! API call returns at once and the machine's `status_name` moves through
//! transient states (`Commissioning`, `Deploying`, `Releasing`, ...) until it
//! settles. [`poll`] re-reads the status with exponential backoff until it
//! lands in a target set, leaves the set of tolerated transient states, or
//! the time limit passes.
//!
//! # Deadline
//!
//! The time limit is checked before each sleep against the wait accumulated
//! by previous iterations. A timeout is therefore reported only once the
//! accumulated wait already exceeds the limit, which can be up to one status
//! fetch plus one backoff interval past it.

use std::future::Future;
use std::time::Duration;

use maas_core::{StatusName, StatusSet};
use tokio::time::Instant;

use crate::config::PollConfig;
use crate::error::{ClientError, Result};

/// Exponential backoff delays: `initial`, then multiplied after each step and
/// capped at `max`. Never resets.
///
/// Every delay, the first included, is at most `max`. A multiplier of 0 is
/// treated as 1 so the delay never collapses to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    next: Duration,
    max: Duration,
    multiplier: u32,
}

impl Backoff {
    /// Create a backoff sequence.
    #[must_use]
    pub fn new(initial: Duration, max: Duration, multiplier: u32) -> Self {
        Self {
            next: initial.min(max),
            max,
            multiplier: multiplier.max(1),
        }
    }

    /// Create the backoff sequence described by a poll policy.
    #[must_use]
    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(
            config.initial_backoff(),
            config.max_backoff(),
            config.backoff_multiplier,
        )
    }

    /// The delay the next call to `next` will return.
    #[must_use]
    pub const fn peek(&self) -> Duration {
        self.next
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.next;
        self.next = self.next.saturating_mul(self.multiplier).min(self.max);
        Some(delay)
    }
}

/// Outcome of a successful wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    /// The status that ended the wait.
    pub status: StatusName,
    /// Number of status fetches performed.
    pub attempts: u32,
    /// Accumulated wait: time spent fetching plus time slept, excluding the
    /// final fetch.
    pub waited: Duration,
}

/// State of one wait loop.
struct PollSession {
    waited: Duration,
    backoff: Backoff,
    attempts: u32,
}

/// Wait until `fetch_status` reports a status in `return_on`.
///
/// Each iteration fetches the status once:
///
/// - a status in `return_on` ends the wait successfully, without sleeping;
/// - a status in `continue_on` sleeps for the next backoff delay, unless the
///   accumulated wait already exceeds `timeout`, which ends the wait with
///   `ClientError::Timeout`;
/// - any other status ends the wait with `ClientError::UnexpectedStatus`.
///
/// Errors from `fetch_status` are returned as-is; they are never retried.
///
/// # Errors
///
/// Returns `ClientError::Timeout`, `ClientError::UnexpectedStatus`, or the
/// error returned by `fetch_status`.
pub async fn poll<F, Fut>(
    mut fetch_status: F,
    return_on: &StatusSet,
    continue_on: &StatusSet,
    timeout: Duration,
    config: &PollConfig,
) -> Result<PollReport>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<StatusName>>,
{
    let mut session = PollSession {
        waited: Duration::ZERO,
        backoff: Backoff::from_config(config),
        attempts: 0,
    };

    loop {
        let started = Instant::now();
        let status = fetch_status().await?;
        session.attempts += 1;

        if return_on.contains(&status) {
            tracing::info!(
                status = %status,
                attempts = session.attempts,
                waited_secs = session.waited.as_secs(),
                "Reached expected status"
            );
            return Ok(PollReport {
                status,
                attempts: session.attempts,
                waited: session.waited,
            });
        }

        if !continue_on.contains(&status) {
            tracing::warn!(status = %status, expected = %return_on, "Unexpected status");
            return Err(ClientError::UnexpectedStatus(status));
        }

        if session.waited > timeout {
            tracing::warn!(
                status = %status,
                expected = %return_on,
                timeout_secs = timeout.as_secs(),
                "Timed out waiting for status"
            );
            return Err(ClientError::Timeout {
                expected: return_on.clone(),
                timeout,
                last_status: status,
            });
        }

        // Monotonic clock; saturates to zero rather than going negative.
        let elapsed = Instant::now().saturating_duration_since(started);
        let delay = session.backoff.next().unwrap_or(Duration::ZERO);

        tracing::debug!(
            status = %status,
            attempt = session.attempts,
            delay_secs = delay.as_secs(),
            "Status not final yet, waiting"
        );

        tokio::time::sleep(delay).await;
        session.waited += elapsed + delay;
    }
}
