use anyhow::{Context, Result};
use ledger_core::Expense;
use std::path::Path;

/// Write expenses as CSV with a header row. Returns the row count.
pub fn write_csv(path: &Path, expenses: &[Expense]) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for e in expenses {
        wtr.serialize(e)?;
    }
    wtr.flush().with_context(|| format!("write {}", path.display()))?;
    Ok(expenses.len())
}
