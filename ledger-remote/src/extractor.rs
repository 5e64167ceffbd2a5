//! The extraction seam: anything that turns a receipt image or free text
//! into loosely-typed expense records.

use async_trait::async_trait;
use ledger_ingest::ExtractedRecord;

use crate::error::{RemoteError, Result};

/// An empty result means nothing was recognized; it is not an error.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract_image(&self, image: &[u8], mime_type: &str) -> Result<Vec<ExtractedRecord>>;

    async fn extract_text(&self, text: &str) -> Result<Vec<ExtractedRecord>>;
}

/// Returns canned records, or a fixed failure
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    records: Vec<ExtractedRecord>,
    fail_with: Option<String>,
}

impl MockExtractor {
    pub fn new(records: Vec<ExtractedRecord>) -> Self {
        Self {
            records,
            fail_with: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            fail_with: Some(message.into()),
        }
    }

    fn respond(&self) -> Result<Vec<ExtractedRecord>> {
        match &self.fail_with {
            Some(msg) => Err(RemoteError::Rejected(msg.clone())),
            None => Ok(self.records.clone()),
        }
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract_image(&self, _image: &[u8], _mime_type: &str) -> Result<Vec<ExtractedRecord>> {
        self.respond()
    }

    async fn extract_text(&self, _text: &str) -> Result<Vec<ExtractedRecord>> {
        self.respond()
    }
}
