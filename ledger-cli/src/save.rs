//! Commit, persist, then mirror.
//!
//! The local snapshot is written before any network call. A failed mirror
//! is reported on the outcome and never undoes the local save.

use anyhow::Result;
use ledger_core::{Expense, ExpenseDraft, Ledger};
use ledger_remote::{ScriptConfig, SheetClient};
use tracing::warn;

use crate::state::StateDir;

#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    /// No sheet configured; nothing attempted
    NotConfigured,
    Synced,
    /// Saved locally, mirror failed
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub saved: Vec<Expense>,
    pub sync: SyncStatus,
}

/// Commit `drafts` into `ledger`, write the snapshot, and append the new
/// records to the sheet when `script` is set.
///
/// If no draft is valid this fails with `LedgerError::NoValidDrafts` and
/// neither `ledger` nor the snapshot changes.
pub async fn save_drafts(
    state: &StateDir,
    ledger: &mut Ledger,
    drafts: Vec<ExpenseDraft>,
    script: Option<&ScriptConfig>,
    sheet: &SheetClient,
) -> Result<SaveOutcome> {
    let mut next = ledger.clone();
    let saved = next.commit(drafts)?;
    state.save_ledger(&next)?;
    *ledger = next;

    let sync = match script {
        None => SyncStatus::NotConfigured,
        Some(cfg) => match sheet.append(cfg, &saved).await {
            Ok(()) => SyncStatus::Synced,
            Err(e) => {
                warn!(error = %e, "saved locally, sheet sync failed");
                SyncStatus::Failed(e.to_string())
            }
        },
    };

    Ok(SaveOutcome { saved, sync })
}
