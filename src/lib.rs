//! # kvadm
//!
//! Cluster administration for distributed KV deployments:
//! - safe, conflict-free removal of failed cluster members
//! - shard-move scheduling via supervision jobs
//! - a small admin HTTP API and operator CLI
//!
//! All cluster state lives in "the agency", a linearizable, transactional
//! configuration tree maintained by an external consensus service. Every
//! mutation kvadm performs is one atomic compare-and-swap transaction
//! against it; kvadm itself keeps no state between requests.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────────────────┐
//! │  kvadm CLI    │────▶│  kvadm-server (admin API)     │
//! └──────────────┘     │   RemovalController           │
//!                      │    └─ RemovalCoordinator      │
//!                      │        └─ TopologyScanner     │
//!                      └──────────────┬────────────────┘
//!                                     │ guarded transactions
//!                      ┌──────────────▼────────────────┐
//!                      │  Agency (Plan / Current /     │
//!                      │   Supervision / Target)       │
//!                      └───────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ### Start the admin service
//! ```bash
//! kvadm-server serve \
//!   --bind 0.0.0.0:7100 \
//!   --agency http://agency-1:8531,http://agency-2:8531
//! ```
//!
//! ### Remove a failed server
//! ```bash
//! kvadm remove-server PRMR-0003
//! ```
//!
//! ### Move a shard off a server first, if removal reports it in use
//! ```bash
//! kvadm move-shard --database shop --collection products \
//!   --shard s01 --from PRMR-0003 --to PRMR-0007
//! ```

pub mod admin;
pub mod agency;
pub mod cluster;
pub mod common;

// Re-export commonly used types
pub use common::{Config, Error, Result};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
