//! Agency tree paths
//!
//! Every path into the configuration tree is built here, parameterized by
//! the configurable root prefix, so the string layout exists in exactly
//! one place.

/// Path constructor for the agency configuration tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgencyPaths {
    prefix: String,
}

impl Default for AgencyPaths {
    fn default() -> Self {
        Self::new("arango")
    }
}

impl AgencyPaths {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    /// Root prefix segment, e.g. `arango`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Root path of the tree, e.g. `/arango`
    pub fn root(&self) -> String {
        format!("/{}", self.prefix)
    }

    fn join(&self, rest: &str) -> String {
        format!("/{}/{}", self.prefix, rest)
    }

    // === Plan (desired topology) ===

    pub fn plan_coordinator(&self, id: &str) -> String {
        self.join(&format!("Plan/Coordinators/{}", id))
    }

    pub fn plan_db_server(&self, id: &str) -> String {
        self.join(&format!("Plan/DBServers/{}", id))
    }

    /// Shard assignment entry in the desired topology
    pub fn plan_shard(&self, database: &str, collection: &str, shard: &str) -> String {
        self.join(&format!(
            "Plan/Collections/{}/{}/shards/{}",
            database, collection, shard
        ))
    }

    // === Current (observed topology) ===

    pub fn current_servers_registered(&self, id: &str) -> String {
        self.join(&format!("Current/ServersRegistered/{}", id))
    }

    pub fn current_servers_known(&self, id: &str) -> String {
        self.join(&format!("Current/ServersKnown/{}", id))
    }

    pub fn current_db_server(&self, id: &str) -> String {
        self.join(&format!("Current/DBServers/{}", id))
    }

    /// Acknowledged shard assignment entry in the observed topology
    pub fn current_shard_servers(&self, database: &str, collection: &str, shard: &str) -> String {
        self.join(&format!(
            "Current/Collections/{}/{}/{}/servers",
            database, collection, shard
        ))
    }

    // === Supervision (health monitoring) ===

    pub fn health_record(&self, id: &str) -> String {
        self.join(&format!("Supervision/Health/{}", id))
    }

    pub fn health_status(&self, id: &str) -> String {
        self.join(&format!("Supervision/Health/{}/Status", id))
    }

    // === Target (bookkeeping) ===

    pub fn target_db_server(&self, id: &str) -> String {
        self.join(&format!("Target/DBServers/{}", id))
    }

    pub fn target_short_id(&self, id: &str) -> String {
        self.join(&format!("Target/MapUniqueToShortID/{}", id))
    }

    pub fn target_removed_server(&self, id: &str) -> String {
        self.join(&format!("Target/RemovedServers/{}", id))
    }

    pub fn target_todo(&self) -> String {
        self.join("Target/ToDo")
    }

    pub fn target_todo_job(&self, job_id: &str) -> String {
        self.join(&format!("Target/ToDo/{}", job_id))
    }

    pub fn target_pending(&self) -> String {
        self.join("Target/Pending")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        let paths = AgencyPaths::default();
        assert_eq!(paths.root(), "/arango");
        assert_eq!(
            paths.health_status("PRMR-007"),
            "/arango/Supervision/Health/PRMR-007/Status"
        );
        assert_eq!(
            paths.plan_shard("shop", "products", "s01"),
            "/arango/Plan/Collections/shop/products/shards/s01"
        );
        assert_eq!(
            paths.current_shard_servers("shop", "products", "s01"),
            "/arango/Current/Collections/shop/products/s01/servers"
        );
    }

    #[test]
    fn test_prefix_normalization() {
        let paths = AgencyPaths::new("/cluster/");
        assert_eq!(paths.root(), "/cluster");
        assert_eq!(
            paths.target_removed_server("PRMR-1"),
            "/cluster/Target/RemovedServers/PRMR-1"
        );
    }
}
