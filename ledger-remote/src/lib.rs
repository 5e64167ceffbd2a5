//! ledger-remote: async clients for the three external calls: model
//! extraction, spreadsheet sync, and the e-invoice carrier query.
//!
//! None of these retry or time out on their own; each call either returns
//! its result or a [`RemoteError`] for the caller to report.

pub mod einvoice;
pub mod error;
pub mod extractor;
pub mod gemini;
pub mod sheet;

pub use einvoice::{CarrierClient, CarrierCredentials, CarrierMode};
pub use error::{RemoteError, Result};
pub use extractor::{Extractor, MockExtractor};
pub use gemini::{GeminiClient, GeminiConfig};
pub use sheet::{ScriptConfig, SheetClient};
