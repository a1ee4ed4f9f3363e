//! Error types for kvadm

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === Validation errors ===
    #[error("Invalid server id: {0}")]
    InvalidServerId(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // === Lookup errors ===
    #[error("Unknown server id: {0}")]
    UnknownServer(String),

    // === Agency errors ===
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Agency transport error: {0}")]
    AgencyTransport(String),

    #[error("Agency rejected request ({status}): {message}")]
    AgencyRejected { status: u16, message: String },

    #[error("Malformed agency response: {0}")]
    MalformedResponse(String),

    // === Removal errors ===
    #[error("server is not failed, is locked, or is still in use at {locations:?} (locked: {locked})")]
    RemovalBlocked {
        locations: Vec<String>,
        locked: bool,
    },

    // === Config errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Generic ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation timeout: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Is this a retryable error?
    ///
    /// Transport failures and malformed agency replies are transient under
    /// the removal contract; validation and lookup failures are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::AgencyTransport(_)
                | Error::AgencyRejected { .. }
                | Error::MalformedResponse(_)
                | Error::Io(_)
        )
    }

    /// Convert to HTTP status code for the admin API
    pub fn to_http_status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Error::InvalidServerId(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::UnknownServer(_) => StatusCode::NOT_FOUND,
            Error::RemovalBlocked { .. } => StatusCode::PRECONDITION_FAILED,
            Error::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Error::Http(_) | Error::AgencyTransport(_) | Error::AgencyRejected { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}
