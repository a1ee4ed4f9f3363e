//! In-memory agency with full compare-and-swap semantics
//!
//! Deterministic stand-in for a real agency: one JSON tree behind a
//! mutex, linearizable reads, and guarded writes that check every
//! precondition against the live tree before applying anything. Used by
//! the test suite and by local tooling that needs agency semantics
//! without a running cluster.

use crate::agency::client::{AgencyClient, WriteOutcome};
use crate::agency::transaction::{Operation, OperationSet, Precondition, PreconditionSet};
use crate::common::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// In-memory agency tree.
pub struct MemoryAgency {
    tree: Mutex<Value>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl Default for MemoryAgency {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAgency {
    pub fn new() -> Self {
        Self::with_tree(Value::Object(Map::new()))
    }

    pub fn with_tree(tree: Value) -> Self {
        Self {
            tree: Mutex::new(tree),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Snapshot of the whole tree.
    pub fn tree(&self) -> Value {
        self.tree.lock().expect("agency tree lock").clone()
    }

    /// Number of read calls served.
    pub fn read_calls(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write calls served (applied or rejected).
    pub fn write_calls(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Set one path unconditionally, creating intermediate nodes. Lets
    /// tests mutate the tree out-of-band to simulate concurrent actors.
    pub fn put(&self, path: &str, value: Value) {
        let mut tree = self.tree.lock().expect("agency tree lock");
        apply(&mut tree, path, &Operation::Set(value));
    }

    /// Delete one path unconditionally.
    pub fn remove(&self, path: &str) {
        let mut tree = self.tree.lock().expect("agency tree lock");
        apply(&mut tree, path, &Operation::Delete);
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for seg in segments(path) {
        node = node.as_object()?.get(seg)?;
    }
    Some(node)
}

fn holds(root: &Value, path: &str, pre: &Precondition) -> bool {
    match pre {
        Precondition::Old(expected) => lookup(root, path) == Some(expected),
        Precondition::Empty => lookup(root, path).is_none(),
    }
}

fn apply(root: &mut Value, path: &str, op: &Operation) {
    let segs: Vec<&str> = segments(path).collect();
    let Some((last, parents)) = segs.split_last() else {
        return;
    };
    match op {
        Operation::Set(value) => {
            let mut node = root;
            for seg in parents {
                if !node.is_object() {
                    *node = Value::Object(Map::new());
                }
                node = node
                    .as_object_mut()
                    .expect("object ensured above")
                    .entry(seg.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
            }
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            node.as_object_mut()
                .expect("object ensured above")
                .insert(last.to_string(), value.clone());
        }
        Operation::Delete => {
            let mut node = root;
            for seg in parents {
                match node.as_object_mut().and_then(|m| m.get_mut(*seg)) {
                    Some(child) => node = child,
                    None => return,
                }
            }
            if let Some(map) = node.as_object_mut() {
                map.remove(*last);
            }
        }
    }
}

#[async_trait]
impl AgencyClient for MemoryAgency {
    async fn read(&self, _paths: &[String]) -> Result<Value> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.tree())
    }

    async fn write(
        &self,
        operations: &OperationSet,
        preconditions: &PreconditionSet,
    ) -> Result<WriteOutcome> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut tree = self.tree.lock().expect("agency tree lock");

        // All-or-nothing: check every guard before touching the tree.
        for (path, pre) in preconditions.iter() {
            if !holds(&tree, path, pre) {
                return Ok(WriteOutcome::PreconditionFailed);
            }
        }
        for (path, op) in operations.iter() {
            apply(&mut tree, path, op);
        }
        Ok(WriteOutcome::Applied)
    }
}
