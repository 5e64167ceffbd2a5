//! The ordered expense collection and its two mutations: commit and delete.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::expense::{Expense, ExpenseDraft};

/// Committed expenses in insertion order (not date order).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    expenses: Vec<Expense>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_expenses(expenses: Vec<Expense>) -> Self {
        Self { expenses }
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expense> {
        self.expenses.iter()
    }

    /// Validate a batch of drafts and append the valid ones with fresh ids.
    ///
    /// Invalid drafts are dropped without being reported. If nothing in the
    /// batch is valid the ledger is left untouched and `NoValidDrafts` is
    /// returned. On success the newly created expenses are returned in the
    /// order they were appended.
    pub fn commit<I>(&mut self, drafts: I) -> Result<Vec<Expense>>
    where
        I: IntoIterator<Item = ExpenseDraft>,
    {
        self.commit_with_ids(drafts, || uuid::Uuid::new_v4().to_string())
    }

    /// [`Ledger::commit`] with a caller-supplied id source. Ids that collide
    /// with an existing or just-assigned id are discarded and redrawn.
    pub fn commit_with_ids<I, F>(&mut self, drafts: I, mut next_id: F) -> Result<Vec<Expense>>
    where
        I: IntoIterator<Item = ExpenseDraft>,
        F: FnMut() -> String,
    {
        let mut skipped = 0usize;
        let valid: Vec<(ExpenseDraft, f64)> = drafts
            .into_iter()
            .filter_map(|d| match d.committable_amount() {
                Some(amount) => Some((d, amount)),
                None => {
                    skipped += 1;
                    None
                }
            })
            .collect();

        if valid.is_empty() {
            debug!(skipped, "commit rejected");
            return Err(LedgerError::NoValidDrafts);
        }

        let mut taken: HashSet<String> = self.expenses.iter().map(|e| e.id.clone()).collect();
        let created: Vec<Expense> = valid
            .into_iter()
            .map(|(draft, amount)| {
                let id = loop {
                    let candidate = next_id();
                    if taken.insert(candidate.clone()) {
                        break candidate;
                    }
                };
                Expense::from_draft(id, draft, amount)
            })
            .collect();

        self.expenses.extend(created.iter().cloned());
        info!(committed = created.len(), skipped, total = self.expenses.len(), "committed drafts");
        Ok(created)
    }

    /// Remove one expense by id. Remote copies are not affected.
    pub fn delete(&mut self, id: &str) -> Result<Expense> {
        let pos = self
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        let removed = self.expenses.remove(pos);
        info!(id, "deleted expense");
        Ok(removed)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Expense;
    type IntoIter = std::slice::Iter<'a, Expense>;

    fn into_iter(self) -> Self::IntoIter {
        self.expenses.iter()
    }
}
