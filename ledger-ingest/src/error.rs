use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("invalid Minguo date {year}/{month}/{day}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("invalid extraction payload: {0}")]
    InvalidPayload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
