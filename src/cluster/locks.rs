//! Advisory server locks
//!
//! A server can be held by another subsystem (an in-flight shard move, a
//! maintenance action) without that hold being visible in the scanned
//! topology paths. The lock check is therefore a separate lookup,
//! re-evaluated on every attempt, and never folded into the write's
//! precondition set.

use crate::agency::{AgencyClient, AgencyPaths};
use crate::cluster::server_id::ServerId;
use crate::common::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// External advisory-lock lookup.
#[async_trait]
pub trait LockProbe: Send + Sync {
    async fn is_server_locked(&self, server: &ServerId) -> Result<bool>;
}

/// Lock probe backed by the supervision job queues.
///
/// A server counts as locked while any queued (`Target/ToDo`) or running
/// (`Target/Pending`) supervision job references it.
pub struct SupervisionLockProbe<A> {
    agency: Arc<A>,
    paths: AgencyPaths,
}

impl<A> SupervisionLockProbe<A> {
    pub fn new(agency: Arc<A>, paths: AgencyPaths) -> Self {
        Self { agency, paths }
    }
}

fn job_references(job: &Value, id: &str) -> bool {
    ["server", "fromServer", "toServer"]
        .iter()
        .any(|field| job.get(*field).and_then(Value::as_str) == Some(id))
}

#[async_trait]
impl<A: AgencyClient> LockProbe for SupervisionLockProbe<A> {
    async fn is_server_locked(&self, server: &ServerId) -> Result<bool> {
        let tree = self
            .agency
            .read(&[self.paths.target_todo(), self.paths.target_pending()])
            .await?;
        let root = tree.get(self.paths.prefix()).cloned().unwrap_or(Value::Null);

        for queue in ["/Target/ToDo", "/Target/Pending"] {
            if let Some(jobs) = root.pointer(queue).and_then(Value::as_object) {
                if jobs
                    .values()
                    .any(|job| job_references(job, server.as_str()))
                {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// Fixed lock set, for tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct FixedLockProbe {
    locked: HashSet<String>,
}

impl FixedLockProbe {
    /// A probe that reports every server unlocked.
    pub fn unlocked() -> Self {
        Self::default()
    }

    pub fn locking<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locked: ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl LockProbe for FixedLockProbe {
    async fn is_server_locked(&self, server: &ServerId) -> Result<bool> {
        Ok(self.locked.contains(server.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agency::MemoryAgency;
    use serde_json::json;

    #[tokio::test]
    async fn test_supervision_probe_sees_queued_jobs() {
        let agency = Arc::new(MemoryAgency::with_tree(json!({
            "arango": {
                "Target": {
                    "ToDo": {
                        "job-1": {
                            "type": "moveShard",
                            "fromServer": "PRMR-1",
                            "toServer": "PRMR-2",
                        }
                    },
                    "Pending": {},
                }
            }
        })));
        let probe = SupervisionLockProbe::new(agency, AgencyPaths::default());

        let from = ServerId::parse("PRMR-1").unwrap();
        let to = ServerId::parse("PRMR-2").unwrap();
        let other = ServerId::parse("PRMR-3").unwrap();
        assert!(probe.is_server_locked(&from).await.unwrap());
        assert!(probe.is_server_locked(&to).await.unwrap());
        assert!(!probe.is_server_locked(&other).await.unwrap());
    }

    #[tokio::test]
    async fn test_fixed_probe() {
        let probe = FixedLockProbe::locking(["PRMR-1"]);
        assert!(probe
            .is_server_locked(&ServerId::parse("PRMR-1").unwrap())
            .await
            .unwrap());
        assert!(!probe
            .is_server_locked(&ServerId::parse("PRMR-2").unwrap())
            .await
            .unwrap());
    }
}
