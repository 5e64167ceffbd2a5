//! Manual entry: fields are taken as typed, only trimmed.

use chrono::NaiveDate;
use ledger_core::ExpenseDraft;

use crate::types::ManualEntry;

pub fn entry_to_draft(entry: ManualEntry, today: NaiveDate) -> ExpenseDraft {
    let date = entry
        .date
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());

    ExpenseDraft::new(
        date,
        entry.amount.trim(),
        entry.category,
        entry.description.trim(),
        entry.merchant.trim(),
    )
}
