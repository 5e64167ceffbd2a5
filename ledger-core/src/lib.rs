//! ledger-core: expense types, the merchant category rules, and the
//! commit/delete ledger

pub mod category_rules;
pub mod error;
pub mod expense;
pub mod ledger;
pub mod summary;

pub use category_rules::{Classification, classify, classify_scored};
pub use error::{LedgerError, Result};
pub use expense::{Category, Expense, ExpenseDraft, parse_amount};
pub use ledger::Ledger;
