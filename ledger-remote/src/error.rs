//! Error types for ledger-remote

use ledger_ingest::IngestError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    /// A required endpoint or credential is not set; nothing was sent.
    #[error("{0}")]
    NotConfigured(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error: {status}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The endpoint answered but reported failure at the application level.
    #[error("{0}")]
    Rejected(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

pub type Result<T> = std::result::Result<T, RemoteError>;

/// Turn a non-2xx response into `RemoteError::Status`, keeping the body for
/// diagnostics.
pub(crate) async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RemoteError::Status { status, body })
}
