//! Topology scan: where is a server still load-bearing?
//!
//! Walks every shard assignment entry in Plan and Current and produces
//! two things at once: the list of agency-keys still naming the target
//! server, and the precondition set that pins *every* scanned entry to
//! the value observed. Pinning entries that do not name the server is
//! deliberate: the server could become newly assigned between scan and
//! write, and the write must fail then.

use crate::agency::{AgencyPaths, PreconditionSet};
use crate::cluster::server_id::ServerId;
use crate::cluster::snapshot::{ClusterSnapshot, HealthStatus};
use serde_json::json;

/// Result of scanning one snapshot for one server.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Agency-keys where the server still appears as leader or follower.
    pub usage: Vec<String>,
    /// Guards for the removal write: every scanned entry at its observed
    /// value, the health status pinned to FAILED, and the target-claim
    /// slot pinned absent.
    pub preconditions: PreconditionSet,
}

/// Pure function of the snapshot; no I/O, no side effects.
pub fn scan(snapshot: &ClusterSnapshot, paths: &AgencyPaths, server: &ServerId) -> ScanReport {
    let mut usage = Vec::new();
    let mut preconditions = PreconditionSet::new();

    for (agency_key, servers) in snapshot.plan.iter().chain(snapshot.current.iter()) {
        preconditions.expect_old(agency_key.clone(), servers.clone());
        if ClusterSnapshot::list_contains(servers, server.as_str()) {
            usage.push(agency_key.clone());
        }
    }

    preconditions.expect_old(
        paths.health_status(server.as_str()),
        json!(HealthStatus::Failed.as_str()),
    );
    preconditions.expect_empty(paths.target_db_server(server.as_str()));

    ScanReport {
        usage,
        preconditions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agency::Precondition;
    use serde_json::Value;

    fn snapshot() -> ClusterSnapshot {
        let paths = AgencyPaths::default();
        let mut snapshot = ClusterSnapshot::default();
        snapshot.plan.insert(
            paths.plan_shard("shop", "products", "s01"),
            json!(["PRMR-1"]),
        );
        snapshot.plan.insert(
            paths.plan_shard("shop", "products", "s02"),
            json!(["PRMR-1", "PRMR-2"]),
        );
        snapshot.current.insert(
            paths.current_shard_servers("shop", "products", "s01"),
            json!(["PRMR-1"]),
        );
        snapshot.current.insert(
            paths.current_shard_servers("shop", "products", "s02"),
            json!(["PRMR-1"]),
        );
        snapshot
    }

    #[test]
    fn test_usage_reports_only_keys_naming_the_server() {
        let paths = AgencyPaths::default();
        let server = ServerId::parse("PRMR-2").unwrap();
        let report = scan(&snapshot(), &paths, &server);

        // PRMR-2 is planned as follower of s02 but Current no longer
        // lists it: only the Plan entry is a usage location.
        assert_eq!(
            report.usage,
            vec!["/arango/Plan/Collections/shop/products/shards/s02".to_string()]
        );
    }

    #[test]
    fn test_every_scanned_entry_is_pinned() {
        let paths = AgencyPaths::default();
        let server = ServerId::parse("PRMR-9").unwrap();
        let report = scan(&snapshot(), &paths, &server);

        assert!(report.usage.is_empty());
        // 4 shard entries + health status + target claim slot.
        assert_eq!(report.preconditions.len(), 6);
        assert_eq!(
            report
                .preconditions
                .get("/arango/Current/Collections/shop/products/s02/servers"),
            Some(&Precondition::Old(json!(["PRMR-1"])))
        );
        assert_eq!(
            report
                .preconditions
                .get("/arango/Supervision/Health/PRMR-9/Status"),
            Some(&Precondition::Old(Value::String("FAILED".into())))
        );
        assert_eq!(
            report.preconditions.get("/arango/Target/DBServers/PRMR-9"),
            Some(&Precondition::Empty)
        );
    }

    #[test]
    fn test_empty_snapshot_still_guards_health_and_claim() {
        let paths = AgencyPaths::default();
        let server = ServerId::parse("CRDN-1").unwrap();
        let report = scan(&ClusterSnapshot::default(), &paths, &server);
        assert!(report.usage.is_empty());
        assert_eq!(report.preconditions.len(), 2);
    }
}
