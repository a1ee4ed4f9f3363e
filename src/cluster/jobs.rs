//! Supervision job submission
//!
//! Shard moves are not executed here: the entry point validates the
//! request and enqueues a job document under `Target/ToDo`, where the
//! supervision picks it up. Queued and running jobs also act as the
//! advisory locks consulted during removal.

use crate::agency::{AgencyClient, AgencyPaths, OperationSet, PreconditionSet, WriteOutcome};
use crate::cluster::server_id::{ServerId, ServerRole};
use crate::common::{Error, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Request to move one shard between storage servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveShardRequest {
    pub database: String,
    pub collection: String,
    pub shard: String,
    pub from_server: String,
    pub to_server: String,
}

impl MoveShardRequest {
    fn validate(&self) -> Result<(ServerId, ServerId)> {
        for (field, value) in [
            ("database", &self.database),
            ("collection", &self.collection),
            ("shard", &self.shard),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidRequest(format!("{} must not be empty", field)));
            }
        }
        let from = ServerId::parse(&self.from_server)?;
        let to = ServerId::parse(&self.to_server)?;
        if from.role() != ServerRole::DbServer || to.role() != ServerRole::DbServer {
            return Err(Error::InvalidRequest(
                "shards can only be moved between storage servers".into(),
            ));
        }
        if from == to {
            return Err(Error::InvalidRequest(
                "fromServer and toServer must differ".into(),
            ));
        }
        Ok((from, to))
    }
}

/// Enqueue a move-shard job. Returns the job id.
pub async fn move_shard<A: AgencyClient>(
    agency: &A,
    paths: &AgencyPaths,
    request: &MoveShardRequest,
) -> Result<String> {
    let (from, to) = request.validate()?;

    let job_id = Uuid::new_v4().to_string();
    let job = json!({
        "type": "moveShard",
        "database": request.database,
        "collection": request.collection,
        "shard": request.shard,
        "fromServer": from.as_str(),
        "toServer": to.as_str(),
        "jobId": job_id,
        "timeCreated": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "creator": "kvadm",
    });

    let mut operations = OperationSet::new();
    operations.set(paths.target_todo_job(&job_id), job);
    let mut preconditions = PreconditionSet::new();
    preconditions.expect_empty(paths.target_todo_job(&job_id));

    match agency.write(&operations, &preconditions).await? {
        WriteOutcome::Applied => {
            tracing::info!(
                "Scheduled moveShard job {} ({} -> {})",
                job_id,
                from,
                to
            );
            Ok(job_id)
        }
        // Fresh UUIDs do not collide; a rejection means the tree is
        // being manipulated out from under us.
        WriteOutcome::PreconditionFailed => Err(Error::Internal(format!(
            "job id {} already present in Target/ToDo",
            job_id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agency::MemoryAgency;
    use serde_json::Value;

    fn request() -> MoveShardRequest {
        MoveShardRequest {
            database: "shop".into(),
            collection: "products".into(),
            shard: "s01".into(),
            from_server: "PRMR-1".into(),
            to_server: "PRMR-2".into(),
        }
    }

    #[tokio::test]
    async fn test_move_shard_enqueues_job() {
        let agency = MemoryAgency::new();
        let paths = AgencyPaths::default();

        let job_id = move_shard(&agency, &paths, &request()).await.unwrap();

        let tree = agency.tree();
        let job = tree
            .pointer(&format!("/arango/Target/ToDo/{}", job_id))
            .expect("job document present");
        assert_eq!(job.get("type"), Some(&Value::String("moveShard".into())));
        assert_eq!(job.get("fromServer"), Some(&Value::String("PRMR-1".into())));
        assert_eq!(job.get("toServer"), Some(&Value::String("PRMR-2".into())));
        assert!(job.get("timeCreated").and_then(Value::as_str).is_some());
    }

    #[tokio::test]
    async fn test_move_shard_rejects_same_server() {
        let agency = MemoryAgency::new();
        let paths = AgencyPaths::default();
        let mut req = request();
        req.to_server = req.from_server.clone();

        let err = move_shard(&agency, &paths, &req).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert_eq!(agency.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_move_shard_rejects_coordinators() {
        let agency = MemoryAgency::new();
        let paths = AgencyPaths::default();
        let mut req = request();
        req.to_server = "CRDN-1".into();

        let err = move_shard(&agency, &paths, &req).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_move_shard_rejects_empty_fields() {
        let agency = MemoryAgency::new();
        let paths = AgencyPaths::default();
        let mut req = request();
        req.shard = String::new();

        let err = move_shard(&agency, &paths, &req).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
