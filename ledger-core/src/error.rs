//! Error types for ledger-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("no valid drafts: each expense needs a numeric amount and a description")]
    NoValidDrafts,

    #[error("expense not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
