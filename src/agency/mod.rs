//! Typed access to the agency, the cluster's linearizable configuration store
//!
//! The agency holds one hierarchical JSON tree (Plan, Current, Supervision,
//! Target). All reads are linearizable multi-path reads; all writes are
//! atomic multi-key transactions guarded by preconditions. The agency's own
//! consensus implementation is an external collaborator — only its contract
//! lives here.

pub mod client;
pub mod memory;
pub mod paths;
pub mod transaction;

pub use client::{AgencyClient, HttpAgency, WriteOutcome};
pub use memory::MemoryAgency;
pub use paths::AgencyPaths;
pub use transaction::{Operation, OperationSet, Precondition, PreconditionSet};
