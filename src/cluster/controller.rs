//! Bounded retry loop driving removal attempts
//!
//! Blocking conditions (in-flight shard moves, pending health
//! transitions) usually clear within tens of seconds, so the controller
//! polls: fixed delay, fixed budget, no backoff. Each iteration starts
//! from a fresh snapshot; nothing is cached across attempts.

use crate::agency::{AgencyClient, AgencyPaths};
use crate::cluster::locks::LockProbe;
use crate::cluster::removal::{AttemptOutcome, RemovalCoordinator};
use crate::cluster::server_id::ServerId;
use crate::common::{Error, RemovalConfig, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Retry policy for one removal call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts before giving up.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
    /// Optional hard deadline; the loop stops before sleeping past it.
    pub deadline: Option<Instant>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            delay: Duration::from_secs(1),
            deadline: None,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RemovalConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: config.retry_delay(),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Success report for one completed removal.
#[derive(Debug, Clone, Serialize)]
pub struct RemovalReport {
    pub server: String,
    pub attempts: u32,
}

/// Entry point for safe server removal.
///
/// Stateless apart from its configuration: concurrent controllers for
/// different servers need no coordination, and concurrent controllers
/// for the same server race harmlessly on the agency's CAS.
pub struct RemovalController<A, L> {
    agency: Arc<A>,
    locks: Arc<L>,
    paths: AgencyPaths,
    policy: RetryPolicy,
}

impl<A: AgencyClient, L: LockProbe> RemovalController<A, L> {
    pub fn new(agency: Arc<A>, locks: Arc<L>, paths: AgencyPaths, policy: RetryPolicy) -> Self {
        Self {
            agency,
            locks,
            paths,
            policy,
        }
    }

    /// Remove `raw_id` from the cluster, retrying until it is removed,
    /// rejected, or the budget runs out.
    ///
    /// Malformed ids are rejected before any agency contact. On budget
    /// exhaustion the error names every agency-key that still referenced
    /// the server in the final attempt, plus the lock flag, so the
    /// operator knows exactly what to resolve before retrying.
    pub async fn remove_server(&self, raw_id: &str) -> Result<RemovalReport> {
        let server = ServerId::parse(raw_id)?;
        let coordinator = RemovalCoordinator::new(&*self.agency, &*self.locks, &self.paths);

        let mut last_usage: Vec<String> = Vec::new();
        let mut last_locked = false;

        for attempt in 1..=self.policy.max_attempts {
            match coordinator.attempt(&server).await {
                Ok(AttemptOutcome::Removed) => {
                    return Ok(RemovalReport {
                        server: server.to_string(),
                        attempts: attempt,
                    });
                }
                Ok(AttemptOutcome::NotFound) => {
                    return Err(Error::UnknownServer(server.to_string()));
                }
                Ok(AttemptOutcome::Conflict) => {
                    tracing::debug!(
                        "removeServer: got precondition failed for {}, retrying...",
                        server
                    );
                }
                Ok(AttemptOutcome::Blocked { usage, locked }) => {
                    if !usage.is_empty() {
                        tracing::info!(
                            "removeServer: server {} still in use in {} locations",
                            server,
                            usage.len()
                        );
                    } else {
                        tracing::info!("removeServer: server {} locked in agency", server);
                    }
                    last_usage = usage;
                    last_locked = locked;
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(
                        "removeServer: could not talk to agency ({}), retrying...",
                        e
                    );
                }
                Err(e) => return Err(e),
            }

            if attempt == self.policy.max_attempts {
                break;
            }
            if let Some(deadline) = self.policy.deadline {
                if Instant::now() + self.policy.delay >= deadline {
                    return Err(Error::Timeout(format!(
                        "removal of {} aborted at deadline after {} attempts",
                        server, attempt
                    )));
                }
            }
            tokio::time::sleep(self.policy.delay).await;
        }

        Err(Error::RemovalBlocked {
            locations: last_usage,
            locked: last_locked,
        })
    }
}
