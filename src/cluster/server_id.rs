//! Server identifiers and roles

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a cluster member, decided once at id validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerRole {
    Coordinator,
    DbServer,
}

impl fmt::Display for ServerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerRole::Coordinator => write!(f, "coordinator"),
            ServerRole::DbServer => write!(f, "dbserver"),
        }
    }
}

/// Validated cluster member id.
///
/// Ids are opaque strings carrying a four-character role prefix: `CRDN`
/// for coordinators, `PRMR` for storage servers. An id is never reused
/// after its server has been removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerId {
    id: String,
    role: ServerRole,
}

impl ServerId {
    /// Parse and validate a raw id. Rejects anything without a known
    /// role prefix before any agency contact happens.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::InvalidServerId("empty server id".into()));
        }
        let role = match raw.get(0..4) {
            Some("CRDN") => ServerRole::Coordinator,
            Some("PRMR") => ServerRole::DbServer,
            _ => {
                return Err(Error::InvalidServerId(format!(
                    "couldn't determine role for server id {}",
                    raw
                )))
            }
        };
        Ok(Self {
            id: raw.to_string(),
            role,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> ServerRole {
        self.role
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
