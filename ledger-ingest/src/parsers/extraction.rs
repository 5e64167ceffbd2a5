//! Model extraction output: a JSON array of loosely-typed records.
//!
//! The request schema constrains the model, but its output is still
//! checked: unknown categories become `other`, and a missing or malformed
//! date becomes today.

use chrono::NaiveDate;
use ledger_core::{Category, ExpenseDraft};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::types::ExtractedRecord;

/// Decode the model's response text. Blank text means nothing was found.
/// Any prose around the array is ignored.
pub fn parse_extraction_json(text: &str) -> Result<Vec<ExtractedRecord>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    match (text.find('['), text.rfind(']')) {
        (Some(s), Some(e)) if s < e => {
            let records: Vec<ExtractedRecord> = serde_json::from_str(&text[s..=e])?;
            debug!(count = records.len(), "decoded extraction records");
            Ok(records)
        }
        _ => Err(IngestError::InvalidPayload(truncate(text, 200))),
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((i, _)) => format!("{}...", &s[..i]),
        None => s.to_string(),
    }
}

pub fn record_to_draft(record: ExtractedRecord, today: NaiveDate) -> ExpenseDraft {
    let date = NaiveDate::parse_from_str(record.date.trim(), "%Y-%m-%d").unwrap_or(today);

    ExpenseDraft::new(
        date.format("%Y-%m-%d").to_string(),
        record.amount.trim(),
        Category::from_label_lenient(&record.category),
        record.description.trim(),
        record.merchant.trim(),
    )
}
