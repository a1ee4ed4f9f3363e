//! Typed precondition / operation bundles for agency transactions
//!
//! A write against the agency is a pair `(operations, preconditions)`
//! applied atomically: every precondition must hold at apply time or the
//! whole bundle is rejected. These builders keep the path/value pairs
//! typed in-process and serialize to the agency wire shape on submit.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Assertion about the current value of one tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Precondition {
    /// The node must currently hold exactly this value.
    Old(Value),
    /// The node must not exist.
    Empty,
}

/// Mutation of one tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Remove the node and its subtree.
    Delete,
    /// Set the node to a new value, creating intermediate nodes.
    Set(Value),
}

/// Set of preconditions guarding one atomic write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreconditionSet {
    entries: BTreeMap<String, Precondition>,
}

impl PreconditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `path` to currently hold exactly `value`.
    pub fn expect_old(&mut self, path: impl Into<String>, value: Value) -> &mut Self {
        self.entries.insert(path.into(), Precondition::Old(value));
        self
    }

    /// Require `path` to be absent.
    pub fn expect_empty(&mut self, path: impl Into<String>) -> &mut Self {
        self.entries.insert(path.into(), Precondition::Empty);
        self
    }

    pub fn get(&self, path: &str) -> Option<&Precondition> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Precondition)> {
        self.entries.iter()
    }

    /// Wire shape: `{"<path>": {"old": <value>}}` / `{"<path>": {"oldEmpty": true}}`
    pub fn to_wire(&self) -> Value {
        let mut map = Map::new();
        for (path, pre) in &self.entries {
            let guard = match pre {
                Precondition::Old(value) => json!({ "old": value }),
                Precondition::Empty => json!({ "oldEmpty": true }),
            };
            map.insert(path.clone(), guard);
        }
        Value::Object(map)
    }
}

/// Set of mutations applied atomically if the paired preconditions hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationSet {
    entries: BTreeMap<String, Operation>,
}

impl OperationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delete(&mut self, path: impl Into<String>) -> &mut Self {
        self.entries.insert(path.into(), Operation::Delete);
        self
    }

    pub fn set(&mut self, path: impl Into<String>, value: Value) -> &mut Self {
        self.entries.insert(path.into(), Operation::Set(value));
        self
    }

    pub fn get(&self, path: &str) -> Option<&Operation> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Operation)> {
        self.entries.iter()
    }

    /// Wire shape: `{"<path>": {"op": "delete"}}` / `{"<path>": {"op": "set", "new": <value>}}`
    pub fn to_wire(&self) -> Value {
        let mut map = Map::new();
        for (path, op) in &self.entries {
            let mutation = match op {
                Operation::Delete => json!({ "op": "delete" }),
                Operation::Set(value) => json!({ "op": "set", "new": value }),
            };
            map.insert(path.clone(), mutation);
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_wire_shape() {
        let mut pre = PreconditionSet::new();
        pre.expect_old("/arango/Plan/Collections/db/c/shards/s1", json!(["PRMR-1"]));
        pre.expect_empty("/arango/Target/DBServers/PRMR-2");

        assert_eq!(
            pre.to_wire(),
            json!({
                "/arango/Plan/Collections/db/c/shards/s1": { "old": ["PRMR-1"] },
                "/arango/Target/DBServers/PRMR-2": { "oldEmpty": true },
            })
        );
    }

    #[test]
    fn test_operation_wire_shape() {
        let mut ops = OperationSet::new();
        ops.delete("/arango/Plan/DBServers/PRMR-2");
        ops.set(
            "/arango/Target/RemovedServers/PRMR-2",
            json!("2024-05-01T12:00:00.000Z"),
        );

        assert_eq!(
            ops.to_wire(),
            json!({
                "/arango/Plan/DBServers/PRMR-2": { "op": "delete" },
                "/arango/Target/RemovedServers/PRMR-2": {
                    "op": "set",
                    "new": "2024-05-01T12:00:00.000Z",
                },
            })
        );
    }

    #[test]
    fn test_last_write_wins_per_path() {
        let mut pre = PreconditionSet::new();
        pre.expect_old("/a/b", json!(1));
        pre.expect_empty("/a/b");
        assert_eq!(pre.len(), 1);
        assert_eq!(pre.get("/a/b"), Some(&Precondition::Empty));
    }
}
