use chrono::NaiveDate;
use ledger_core::expense::amount_text;
use ledger_core::{Category, ExpenseDraft};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::parsers::{einvoice, extraction, manual};

/// Fields as typed into the manual entry form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualEntry {
    /// Defaults to today when absent
    pub date: Option<String>,
    pub amount: String,
    pub category: Category,
    pub description: String,
    #[serde(default)]
    pub merchant: String,
}

/// One record of the extraction model's structured output. All fields are
/// strings on the wire; nothing here is trusted until normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "amount_text")]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub merchant: String,
}

/// Invoice date in the Minguo calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinguoDate {
    pub year: i32,
    pub month: u32,
    pub date: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    #[serde(default)]
    pub description: String,
}

/// One invoice from the e-invoice carrier query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierInvoice {
    #[serde(default)]
    pub inv_num: String,
    #[serde(default)]
    pub seller_name: String,
    #[serde(deserialize_with = "amount_text")]
    pub amount: String,
    pub inv_date: MinguoDate,
    #[serde(default)]
    pub inv_detail: Option<Vec<InvoiceLine>>,
}

/// Every shape a draft can arrive in
#[derive(Debug, Clone, PartialEq)]
pub enum DraftSource {
    Manual(Vec<ManualEntry>),
    Extracted(Vec<ExtractedRecord>),
    Carrier(Vec<CarrierInvoice>),
}

impl DraftSource {
    /// Normalize into canonical drafts. `today` fills in missing dates.
    ///
    /// Carrier invoices whose date cannot be converted are dropped with a
    /// warning; the rest of the batch still comes through.
    pub fn into_drafts(self, today: NaiveDate) -> Vec<ExpenseDraft> {
        match self {
            DraftSource::Manual(entries) => entries
                .into_iter()
                .map(|e| manual::entry_to_draft(e, today))
                .collect(),
            DraftSource::Extracted(records) => records
                .into_iter()
                .map(|r| extraction::record_to_draft(r, today))
                .collect(),
            DraftSource::Carrier(invoices) => invoices
                .into_iter()
                .filter_map(|inv| match einvoice::invoice_to_draft(&inv) {
                    Ok(d) => Some(d),
                    Err(e) => {
                        warn!(inv_num = %inv.inv_num, error = %e, "skipping invoice");
                        None
                    }
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DraftSource::Manual(v) => v.len(),
            DraftSource::Extracted(v) => v.len(),
            DraftSource::Carrier(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_each_producer_yields_drafts() {
        let manual = DraftSource::Manual(vec![ManualEntry {
            date: None,
            amount: "12.5".into(),
            category: Category::Food,
            description: "coffee".into(),
            merchant: String::new(),
        }]);
        let d = manual.into_drafts(today());
        assert_eq!(d[0].date, "2024-06-01");
        assert!(d[0].is_committable());

        let extracted = DraftSource::Extracted(vec![ExtractedRecord {
            date: "2024-05-30".into(),
            amount: "99".into(),
            category: "購物".into(),
            description: "T-shirt".into(),
            merchant: "UNIQLO".into(),
        }]);
        let d = extracted.into_drafts(today());
        assert_eq!(d[0].category, Category::Shopping);
        assert_eq!(d[0].date, "2024-05-30");
    }

    #[test]
    fn test_carrier_skips_bad_dates() {
        let good: CarrierInvoice = serde_json::from_str(
            r#"{"sellerName":"台灣中油股份有限公司","amount":"1200","invDate":{"year":113,"month":5,"date":2}}"#,
        )
        .unwrap();
        let mut bad = good.clone();
        bad.inv_date.month = 14;

        let src = DraftSource::Carrier(vec![bad, good]);
        assert_eq!(src.len(), 2);
        let drafts = src.into_drafts(today());
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].date, "2024-05-02");
        assert_eq!(drafts[0].category, Category::Transport);
    }

    #[test]
    fn test_carrier_year_out_of_range_is_skipped() {
        let huge: CarrierInvoice = serde_json::from_str(
            r#"{"sellerName":"x","amount":"10","invDate":{"year":2147483647,"month":1,"date":1}}"#,
        )
        .unwrap();
        let mut good = huge.clone();
        good.inv_date.year = 113;

        let drafts = DraftSource::Carrier(vec![huge, good]).into_drafts(today());
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].date, "2024-01-01");
    }
}
