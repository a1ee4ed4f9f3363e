//! Cluster topology and the safe member-removal protocol
//!
//! The protocol answers one question — can this server be permanently
//! evicted right now? — and acts on it atomically:
//! - the server must be reported `FAILED` by the supervision,
//! - it must not appear in any shard assignment in Plan or Current,
//! - no other subsystem may hold an advisory lock on it.
//!
//! The purge itself is one guarded agency transaction whose preconditions
//! pin every topology entry read while deciding, so any concurrent
//! topology change turns the write into a clean conflict.

pub mod controller;
pub mod jobs;
pub mod locks;
pub mod removal;
pub mod scanner;
pub mod server_id;
pub mod snapshot;

pub use controller::{RemovalController, RemovalReport, RetryPolicy};
pub use jobs::MoveShardRequest;
pub use locks::{FixedLockProbe, LockProbe, SupervisionLockProbe};
pub use removal::{AttemptOutcome, RemovalCoordinator};
pub use scanner::ScanReport;
pub use server_id::{ServerId, ServerRole};
pub use snapshot::{ClusterSnapshot, HealthRecord, HealthStatus};
