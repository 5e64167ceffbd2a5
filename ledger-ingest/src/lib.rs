//! ledger-ingest: draft producers (manual entry, model extraction, e-invoice
//! carrier) and the conversion of each into canonical expense drafts.

pub mod error;
pub mod minguo;
pub mod parsers;
pub mod types;

pub use error::{IngestError, Result};
pub use parsers::einvoice::{PLACEHOLDER_DESCRIPTION, invoice_to_draft, mock_carrier_drafts};
pub use parsers::extraction::parse_extraction_json;
pub use types::{CarrierInvoice, DraftSource, ExtractedRecord, InvoiceLine, ManualEntry, MinguoDate};
