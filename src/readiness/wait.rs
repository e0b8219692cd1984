//! Readiness wait loop.
//!
//! # Policies
//! - Unbounded: retry until the endpoint answers. With a zero delay this is
//!   a busy-wait that only yields to the runtime between attempts.
//! - Bounded: at most `max_attempts` tries with a fixed delay in between.
//!   Exhaustion is reported, not treated as an error; the caller proceeds.
//!
//! Both race every attempt and every delay against the shutdown signal.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::lifecycle::shutdown::triggered;
use crate::readiness::probe::{Endpoint, Probe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Unbounded { delay: Duration },
    Bounded { max_attempts: u32, delay: Duration },
}

impl RetryPolicy {
    fn delay(&self) -> Duration {
        match *self {
            RetryPolicy::Unbounded { delay } | RetryPolicy::Bounded { delay, .. } => delay,
        }
    }

    /// Whether `attempt` is the final one the policy permits.
    fn is_last(&self, attempt: u32) -> bool {
        match *self {
            RetryPolicy::Unbounded { .. } => false,
            RetryPolicy::Bounded { max_attempts, .. } => attempt >= max_attempts,
        }
    }
}

/// How the wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessOutcome {
    /// The endpoint accepted a connection on attempt `attempts`.
    Ready { attempts: u32 },
    /// Bounded policy ran out of attempts.
    Exhausted { attempts: u32 },
    /// Shutdown was requested mid-wait.
    Interrupted { attempts: u32 },
}

impl ReadinessOutcome {
    pub fn attempts(&self) -> u32 {
        match *self {
            ReadinessOutcome::Ready { attempts }
            | ReadinessOutcome::Exhausted { attempts }
            | ReadinessOutcome::Interrupted { attempts } => attempts,
        }
    }

    /// Whether the runner should move on to deployment.
    pub fn should_proceed(&self) -> bool {
        !matches!(self, ReadinessOutcome::Interrupted { .. })
    }
}

/// Block until `endpoint` accepts a connection or `policy` gives up.
pub async fn wait_for<P: Probe>(
    probe: &P,
    endpoint: &Endpoint,
    policy: &RetryPolicy,
    shutdown: &mut broadcast::Receiver<()>,
) -> ReadinessOutcome {
    tracing::info!(endpoint = %endpoint, policy = ?policy, "Waiting for database");

    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        tracing::debug!(endpoint = %endpoint, attempt, "Attempting to connect");

        let result = tokio::select! {
            biased;
            _ = triggered(shutdown) => {
                tracing::info!(attempt, "Shutdown requested, abandoning readiness wait");
                return ReadinessOutcome::Interrupted { attempts: attempt - 1 };
            }
            res = probe.connect(endpoint) => res,
        };

        match result {
            Ok(()) => {
                tracing::info!(endpoint = %endpoint, attempts = attempt, "Database is reachable");
                return ReadinessOutcome::Ready { attempts: attempt };
            }
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, attempt, error = %e, "Connection attempt failed");
            }
        }

        if policy.is_last(attempt) {
            tracing::warn!(
                endpoint = %endpoint,
                attempts = attempt,
                "Database still unreachable after all attempts; continuing anyway"
            );
            return ReadinessOutcome::Exhausted { attempts: attempt };
        }

        let delay = policy.delay();
        tokio::select! {
            biased;
            _ = triggered(shutdown) => {
                tracing::info!(attempt, "Shutdown requested, abandoning readiness wait");
                return ReadinessOutcome::Interrupted { attempts: attempt };
            }
            _ = pause(delay) => {}
        }
    }
}

async fn pause(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        time::sleep(delay).await;
    }
}
