//! HTTP admin API
//!
//! Thin entry points over the cluster operations: request parsing and
//! status mapping only, no protocol logic. Authorization is expected to
//! be enforced in front of this service.

use crate::agency::{AgencyClient, AgencyPaths};
use crate::cluster::controller::{RemovalController, RetryPolicy};
use crate::cluster::jobs::{self, MoveShardRequest};
use crate::cluster::locks::LockProbe;
use crate::cluster::snapshot::ClusterSnapshot;
use crate::common::{Error, RemovalConfig};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state behind every admin route.
pub struct AdminState<A, L> {
    pub agency: Arc<A>,
    pub locks: Arc<L>,
    pub paths: AgencyPaths,
    pub removal: RemovalConfig,
}

impl<A, L> Clone for AdminState<A, L> {
    fn clone(&self) -> Self {
        Self {
            agency: self.agency.clone(),
            locks: self.locks.clone(),
            paths: self.paths.clone(),
            removal: self.removal.clone(),
        }
    }
}

/// Build the admin router.
pub fn create_router<A, L>(state: AdminState<A, L>) -> Router
where
    A: AgencyClient + 'static,
    L: LockProbe + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/admin/cluster/health", get(cluster_health::<A, L>))
        .route("/admin/cluster/remove-server", post(remove_server::<A, L>))
        .route("/admin/cluster/move-shard", post(move_shard::<A, L>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error_response(e: Error) -> Response {
    let status = e.to_http_status();
    let body = match &e {
        Error::RemovalBlocked { locations, locked } => json!({
            "error": e.to_string(),
            "usage_locations": locations,
            "locked": locked,
        }),
        _ => json!({ "error": e.to_string() }),
    };
    (status, Json(body)).into_response()
}

/// Liveness probe
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

/// Cluster health as seen by the supervision
async fn cluster_health<A, L>(State(state): State<AdminState<A, L>>) -> Response
where
    A: AgencyClient,
    L: LockProbe,
{
    match state.agency.read(&[state.paths.root()]).await {
        Ok(tree) => {
            let snapshot = ClusterSnapshot::parse(&tree, &state.paths);
            Json(json!({
                "servers": snapshot.health,
                "plan_shards": snapshot.plan.len(),
                "current_shards": snapshot.current.len(),
            }))
            .into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Body of a remove-server request: either a bare id string or
/// `{"server": "<id>"}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoveServerRequest {
    Bare(String),
    Object { server: String },
}

impl RemoveServerRequest {
    fn into_id(self) -> String {
        match self {
            RemoveServerRequest::Bare(id) => id,
            RemoveServerRequest::Object { server } => server,
        }
    }
}

/// Safely remove a failed server from the cluster.
///
/// Blocks for up to the full retry budget; the reply is either the
/// success report or a diagnostic naming every blocking location. The
/// removal runs as its own task so that a caller who stops waiting does
/// not abort an in-flight retry loop.
async fn remove_server<A, L>(
    State(state): State<AdminState<A, L>>,
    Json(request): Json<RemoveServerRequest>,
) -> Response
where
    A: AgencyClient + 'static,
    L: LockProbe + 'static,
{
    let controller = RemovalController::new(
        state.agency.clone(),
        state.locks.clone(),
        state.paths.clone(),
        RetryPolicy::from_config(&state.removal),
    );
    let raw_id = request.into_id();
    let removal = tokio::spawn(async move { controller.remove_server(&raw_id).await });
    let outcome = match removal.await {
        Ok(outcome) => outcome,
        Err(e) => Err(Error::Internal(format!("removal task failed: {}", e))),
    };
    match outcome {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "removed": true,
                "server": report.server,
                "attempts": report.attempts,
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Schedule a shard move; replies 202 once the job is queued.
async fn move_shard<A, L>(
    State(state): State<AdminState<A, L>>,
    Json(request): Json<MoveShardRequest>,
) -> Response
where
    A: AgencyClient,
    L: LockProbe,
{
    match jobs::move_shard(&*state.agency, &state.paths, &request).await {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(json!({ "accepted": true, "id": job_id })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agency::MemoryAgency;
    use crate::cluster::locks::FixedLockProbe;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn state(agency: MemoryAgency) -> AdminState<MemoryAgency, FixedLockProbe> {
        AdminState {
            agency: Arc::new(agency),
            locks: Arc::new(FixedLockProbe::unlocked()),
            paths: AgencyPaths::default(),
            removal: RemovalConfig {
                max_attempts: 2,
                retry_delay_ms: 0,
            },
        }
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_remove_server_invalid_id_is_bad_request() {
        let app = create_router(state(MemoryAgency::new()));
        let resp = app
            .oneshot(post_json("/admin/cluster/remove-server", json!("xyz")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_remove_server_unknown_id_is_not_found() {
        let app = create_router(state(MemoryAgency::new()));
        let resp = app
            .oneshot(post_json(
                "/admin/cluster/remove-server",
                json!({ "server": "PRMR-404" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_move_shard_accepted() {
        let agency = MemoryAgency::new();
        let app = create_router(state(agency));
        let resp = app
            .oneshot(post_json(
                "/admin/cluster/move-shard",
                json!({
                    "database": "shop",
                    "collection": "products",
                    "shard": "s01",
                    "fromServer": "PRMR-1",
                    "toServer": "PRMR-2",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(state(MemoryAgency::new()));
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
