//! Agency client: linearizable reads and guarded atomic writes
//!
//! The agency is the cluster's consensus-backed configuration store. This
//! module consumes its contract: a multi-path linearizable read, and an
//! atomic multi-key write guarded by a precondition set. Everything that
//! mutates cluster state goes through [`AgencyClient::write`]; there is no
//! other mutation channel.

use crate::agency::transaction::{OperationSet, PreconditionSet};
use crate::common::{AgencyConfig, Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Result of a guarded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// All preconditions held; all operations were applied.
    Applied,
    /// At least one precondition did not hold; nothing was applied.
    PreconditionFailed,
}

/// Typed access to the agency tree.
#[async_trait]
pub trait AgencyClient: Send + Sync {
    /// Linearizable multi-path read. Returns one tree containing every
    /// requested path.
    async fn read(&self, paths: &[String]) -> Result<Value>;

    /// Atomic guarded multi-key write. Either every operation is applied
    /// (all preconditions held) or none is.
    async fn write(
        &self,
        operations: &OperationSet,
        preconditions: &PreconditionSet,
    ) -> Result<WriteOutcome>;
}

/// HTTP-backed agency client.
///
/// Speaks the agency wire protocol: `POST /_api/agency/read` with
/// `[[paths...]]`, `POST /_api/agency/write` with
/// `[[operations, preconditions]]`. A 412 reply means the precondition
/// set was rejected; that is an expected outcome, not an error.
pub struct HttpAgency {
    endpoints: Vec<String>,
    http: reqwest::Client,
}

impl HttpAgency {
    pub fn new(config: &AgencyConfig) -> Result<Self> {
        if config.endpoints.is_empty() {
            return Err(Error::InvalidConfig("no agency endpoints configured".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            endpoints: config.endpoints.clone(),
            http,
        })
    }

    /// POST to the first endpoint that accepts the connection.
    async fn post(&self, api: &str, body: &Value) -> Result<reqwest::Response> {
        let mut last_err: Option<reqwest::Error> = None;
        for endpoint in &self.endpoints {
            let url = format!("{}/{}", endpoint.trim_end_matches('/'), api);
            match self.http.post(&url).json(body).send().await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_connect() || e.is_timeout() => {
                    tracing::debug!("Agency endpoint {} unreachable: {}", endpoint, e);
                    last_err = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }
        match last_err {
            Some(e) => Err(e.into()),
            None => Err(Error::AgencyTransport("no agency endpoints configured".into())),
        }
    }
}

#[async_trait]
impl AgencyClient for HttpAgency {
    async fn read(&self, paths: &[String]) -> Result<Value> {
        let body = json!([paths]);
        let resp = self.post("_api/agency/read", &body).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::AgencyRejected {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        let results: Vec<Value> = resp.json().await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedResponse("empty read result".into()))
    }

    async fn write(
        &self,
        operations: &OperationSet,
        preconditions: &PreconditionSet,
    ) -> Result<WriteOutcome> {
        let body = json!([[operations.to_wire(), preconditions.to_wire()]]);
        let resp = self.post("_api/agency/write", &body).await?;
        let status = resp.status();
        match status.as_u16() {
            200 => Ok(WriteOutcome::Applied),
            412 => Ok(WriteOutcome::PreconditionFailed),
            code => Err(Error::AgencyRejected {
                status: code,
                message: resp.text().await.unwrap_or_default(),
            }),
        }
    }
}
