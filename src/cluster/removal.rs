//! One removal attempt against the agency
//!
//! An attempt is judged entirely against the snapshot it read itself:
//! preconditions are never carried over from an earlier iteration, so a
//! stale view can only ever produce a rejected write, never a wrong one.

use crate::agency::{AgencyClient, AgencyPaths, OperationSet, WriteOutcome};
use crate::cluster::locks::LockProbe;
use crate::cluster::scanner;
use crate::cluster::server_id::ServerId;
use crate::cluster::snapshot::ClusterSnapshot;
use crate::common::Result;
use chrono::{SecondsFormat, Utc};
use serde_json::json;

/// Classified result of one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The transaction was applied; every reference to the server is gone.
    Removed,
    /// The topology changed between snapshot and write; retry with a
    /// fresh snapshot.
    Conflict,
    /// The server is still load-bearing or locked; no write was attempted.
    Blocked { usage: Vec<String>, locked: bool },
    /// The supervision has no health record for this server.
    NotFound,
}

/// Runs one snapshot → scan → write cycle.
pub struct RemovalCoordinator<'a, A, L> {
    agency: &'a A,
    locks: &'a L,
    paths: &'a AgencyPaths,
}

impl<'a, A: AgencyClient, L: LockProbe> RemovalCoordinator<'a, A, L> {
    pub fn new(agency: &'a A, locks: &'a L, paths: &'a AgencyPaths) -> Self {
        Self {
            agency,
            locks,
            paths,
        }
    }

    pub async fn attempt(&self, server: &ServerId) -> Result<AttemptOutcome> {
        let tree = self.agency.read(&[self.paths.root()]).await?;
        let snapshot = ClusterSnapshot::parse(&tree, self.paths);

        if snapshot.health_of(server.as_str()).is_none() {
            return Ok(AttemptOutcome::NotFound);
        }

        let scan = scanner::scan(&snapshot, self.paths, server);
        let locked = self.locks.is_server_locked(server).await?;

        if locked || !scan.usage.is_empty() {
            return Ok(AttemptOutcome::Blocked {
                usage: scan.usage,
                locked,
            });
        }

        let operations = self.removal_operations(server);
        match self.agency.write(&operations, &scan.preconditions).await? {
            WriteOutcome::Applied => {
                tracing::info!("Removed server {} from cluster", server);
                Ok(AttemptOutcome::Removed)
            }
            WriteOutcome::PreconditionFailed => Ok(AttemptOutcome::Conflict),
        }
    }

    /// The full purge: every reference deleted, plus a permanent audit
    /// marker under `Target/RemovedServers` that is never deleted again.
    fn removal_operations(&self, server: &ServerId) -> OperationSet {
        let id = server.as_str();
        let p = self.paths;
        let mut operations = OperationSet::new();
        operations.delete(p.plan_coordinator(id));
        operations.delete(p.plan_db_server(id));
        operations.delete(p.current_servers_registered(id));
        operations.delete(p.current_db_server(id));
        operations.delete(p.current_servers_known(id));
        operations.delete(p.health_record(id));
        operations.delete(p.target_short_id(id));
        operations.set(
            p.target_removed_server(id),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        operations
    }
}
