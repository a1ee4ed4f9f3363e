//! Point-in-time view of the cluster configuration tree
//!
//! A snapshot is parsed from one linearizable agency read and is never
//! refreshed: every removal attempt takes a fresh snapshot and judges the
//! cluster against it alone.

use crate::agency::AgencyPaths;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-server liveness status as maintained by the supervision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Good,
    Bad,
    Failed,
    #[serde(other)]
    #[default]
    Unknown,
}

impl HealthStatus {
    /// Wire string, as stored under `Supervision/Health/<id>/Status`.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Good => "GOOD",
            HealthStatus::Bad => "BAD",
            HealthStatus::Failed => "FAILED",
            HealthStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Health record kept by the supervision for one server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct HealthRecord {
    #[serde(default)]
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Immutable materialization of the topology-relevant parts of the tree.
///
/// `plan` and `current` map agency-keys (full tree paths of shard
/// assignment entries) to the server list observed at those paths, kept
/// as raw JSON so preconditions can assert the exact observed value.
#[derive(Debug, Clone, Default)]
pub struct ClusterSnapshot {
    /// Desired topology: agency-key → `[leader, follower...]`
    pub plan: BTreeMap<String, Value>,
    /// Observed topology: agency-key → `[leader, follower...]`
    pub current: BTreeMap<String, Value>,
    /// Supervision health map: server id → record
    pub health: BTreeMap<String, HealthRecord>,
}

impl ClusterSnapshot {
    /// Parse a snapshot out of a tree returned by an agency read.
    ///
    /// Subtrees that are absent (fresh cluster, partial fixtures) parse
    /// as empty maps; malformed health records degrade to
    /// `HealthStatus::Unknown` rather than failing the whole attempt.
    pub fn parse(tree: &Value, paths: &AgencyPaths) -> Self {
        let root = tree.get(paths.prefix()).cloned().unwrap_or(Value::Null);
        let mut snapshot = ClusterSnapshot::default();

        // Plan/Collections/<db>/<coll>/shards/<shard> -> [servers]
        if let Some(dbs) = root
            .pointer("/Plan/Collections")
            .and_then(Value::as_object)
        {
            for (db, colls) in dbs {
                let Some(colls) = colls.as_object() else {
                    continue;
                };
                for (coll, body) in colls {
                    let Some(shards) = body.get("shards").and_then(Value::as_object) else {
                        continue;
                    };
                    for (shard, servers) in shards {
                        snapshot
                            .plan
                            .insert(paths.plan_shard(db, coll, shard), servers.clone());
                    }
                }
            }
        }

        // Current/Collections/<db>/<coll>/<shard>/servers -> [servers]
        if let Some(dbs) = root
            .pointer("/Current/Collections")
            .and_then(Value::as_object)
        {
            for (db, colls) in dbs {
                let Some(colls) = colls.as_object() else {
                    continue;
                };
                for (coll, shards) in colls {
                    let Some(shards) = shards.as_object() else {
                        continue;
                    };
                    for (shard, body) in shards {
                        let Some(servers) = body.get("servers") else {
                            continue;
                        };
                        snapshot.current.insert(
                            paths.current_shard_servers(db, coll, shard),
                            servers.clone(),
                        );
                    }
                }
            }
        }

        if let Some(health) = root
            .pointer("/Supervision/Health")
            .and_then(Value::as_object)
        {
            for (id, record) in health {
                let record: HealthRecord =
                    serde_json::from_value(record.clone()).unwrap_or_default();
                snapshot.health.insert(id.clone(), record);
            }
        }

        snapshot
    }

    /// Health record for one server, if the supervision knows it.
    pub fn health_of(&self, id: &str) -> Option<&HealthRecord> {
        self.health.get(id)
    }

    /// Does this server list (a JSON array of ids) contain `id`?
    pub fn list_contains(servers: &Value, id: &str) -> bool {
        servers
            .as_array()
            .map(|list| list.iter().any(|s| s.as_str() == Some(id)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> Value {
        json!({
            "arango": {
                "Plan": {
                    "Collections": {
                        "shop": {
                            "products": {
                                "shards": {
                                    "s01": ["PRMR-1"],
                                    "s02": ["PRMR-1", "PRMR-2"],
                                }
                            }
                        }
                    }
                },
                "Current": {
                    "Collections": {
                        "shop": {
                            "products": {
                                "s01": { "servers": ["PRMR-1"] },
                                "s02": { "servers": ["PRMR-1", "PRMR-2"] },
                            }
                        }
                    }
                },
                "Supervision": {
                    "Health": {
                        "PRMR-1": { "Status": "GOOD", "ShortName": "DBServer0001" },
                        "PRMR-2": { "Status": "FAILED" },
                        "CRDN-1": { "Status": "WEIRD-NEW-STATE" },
                    }
                }
            }
        })
    }

    #[test]
    fn test_parse_shard_tables() {
        let snapshot = ClusterSnapshot::parse(&tree(), &AgencyPaths::default());
        assert_eq!(snapshot.plan.len(), 2);
        assert_eq!(snapshot.current.len(), 2);
        assert_eq!(
            snapshot.plan["/arango/Plan/Collections/shop/products/shards/s02"],
            json!(["PRMR-1", "PRMR-2"])
        );
        assert_eq!(
            snapshot.current["/arango/Current/Collections/shop/products/s01/servers"],
            json!(["PRMR-1"])
        );
    }

    #[test]
    fn test_parse_health() {
        let snapshot = ClusterSnapshot::parse(&tree(), &AgencyPaths::default());
        assert_eq!(snapshot.health_of("PRMR-2").unwrap().status, HealthStatus::Failed);
        assert_eq!(
            snapshot.health_of("PRMR-1").unwrap().short_name.as_deref(),
            Some("DBServer0001")
        );
        // Unrecognized statuses degrade instead of failing the parse.
        assert_eq!(
            snapshot.health_of("CRDN-1").unwrap().status,
            HealthStatus::Unknown
        );
        assert!(snapshot.health_of("PRMR-9").is_none());
    }

    #[test]
    fn test_parse_empty_tree() {
        let snapshot = ClusterSnapshot::parse(&json!({}), &AgencyPaths::default());
        assert!(snapshot.plan.is_empty());
        assert!(snapshot.current.is_empty());
        assert!(snapshot.health.is_empty());
    }

    #[test]
    fn test_list_contains() {
        assert!(ClusterSnapshot::list_contains(
            &json!(["PRMR-1", "PRMR-2"]),
            "PRMR-2"
        ));
        assert!(!ClusterSnapshot::list_contains(&json!(["PRMR-1"]), "PRMR-2"));
        assert!(!ClusterSnapshot::list_contains(&json!("PRMR-2"), "PRMR-2"));
    }
}
