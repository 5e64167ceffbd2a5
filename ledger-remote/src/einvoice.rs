//! Ministry of Finance e-invoice carrier query (mobile barcode carrier),
//! with a mock mode that returns a fixed sample.

use chrono::{DateTime, Duration as ChronoDuration, Local};
use ledger_core::ExpenseDraft;
use ledger_ingest::{CarrierInvoice, DraftSource, mock_carrier_drafts};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{RemoteError, Result, ensure_success};

pub const DEFAULT_ENDPOINT: &str = "https://api.einvoice.nat.gov.tw/PB2CAPIVAN/invapp/InvApp";
pub const DEFAULT_APP_ID: &str = "EINV001";
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(1500);

const API_VERSION: &str = "0.5";
const ACTION: &str = "carrierInvChk";
/// Mobile barcode carrier
const CARD_TYPE: &str = "3J0002";
const CLIENT_UUID: &str = "smart-ledger-ai-web";
const LOOKBACK_DAYS: i64 = 30;
const TIMESTAMP_SKEW_SECS: i64 = 10;

/// Barcode identity and its verification code
#[derive(Debug, Clone, Default)]
pub struct CarrierCredentials {
    pub card_no: String,
    pub card_encrypt: String,
}

impl CarrierCredentials {
    pub fn new(card_no: impl Into<String>, card_encrypt: impl Into<String>) -> Self {
        Self {
            card_no: card_no.into(),
            card_encrypt: card_encrypt.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.card_no.trim().is_empty() && !self.card_encrypt.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum CarrierMode {
    /// Sleep, then return the fixed sample. Credentials are ignored.
    Mock { delay: Duration },
    Live { endpoint: String, app_id: String },
}

#[derive(Debug, Deserialize)]
struct CarrierReply {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    /// May be absent or `null` when there are no invoices
    #[serde(default)]
    details: Option<Vec<CarrierInvoice>>,
}

#[derive(Debug, Clone)]
pub struct CarrierClient {
    http: reqwest::Client,
    mode: CarrierMode,
}

impl CarrierClient {
    pub fn new(mode: CarrierMode) -> Self {
        Self {
            http: reqwest::Client::new(),
            mode,
        }
    }

    pub fn mock(delay: Duration) -> Self {
        Self::new(CarrierMode::Mock { delay })
    }

    pub fn live(endpoint: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self::new(CarrierMode::Live {
            endpoint: endpoint.into(),
            app_id: app_id.into(),
        })
    }

    pub fn mode(&self) -> &CarrierMode {
        &self.mode
    }

    /// Fetch the last 30 days of invoices as drafts. `now` anchors both the
    /// query window and, in mock mode, the sample dates.
    pub async fn fetch(
        &self,
        creds: &CarrierCredentials,
        now: DateTime<Local>,
    ) -> Result<Vec<ExpenseDraft>> {
        match &self.mode {
            CarrierMode::Mock { delay } => {
                tokio::time::sleep(*delay).await;
                Ok(mock_carrier_drafts(now.date_naive()))
            }
            CarrierMode::Live { endpoint, app_id } => {
                if !creds.is_complete() {
                    return Err(RemoteError::NotConfigured(
                        "carrier import needs --card-no and --card-code".to_string(),
                    ));
                }
                self.fetch_live(endpoint, app_id, creds, now).await
            }
        }
    }

    async fn fetch_live(
        &self,
        endpoint: &str,
        app_id: &str,
        creds: &CarrierCredentials,
        now: DateTime<Local>,
    ) -> Result<Vec<ExpenseDraft>> {
        let form = query_form(creds, app_id, now);
        debug!(endpoint, "carrier query");

        let resp = self.http.post(endpoint).form(&form).send().await?;
        let resp = ensure_success(resp).await?;
        let reply: CarrierReply = resp.json().await?;

        if reply.code != 200 {
            return Err(RemoteError::Rejected(
                reply
                    .msg
                    .unwrap_or_else(|| format!("carrier query failed (code {})", reply.code)),
            ));
        }

        let details = reply.details.unwrap_or_default();
        let count = details.len();
        let drafts = DraftSource::Carrier(details).into_drafts(now.date_naive());
        info!(invoices = count, drafts = drafts.len(), "carrier import");
        Ok(drafts)
    }
}

fn slash_date(d: DateTime<Local>) -> String {
    d.format("%Y/%m/%d").to_string()
}

/// Form fields for `carrierInvChk`
pub fn query_form(
    creds: &CarrierCredentials,
    app_id: &str,
    now: DateTime<Local>,
) -> Vec<(&'static str, String)> {
    let start = now - ChronoDuration::days(LOOKBACK_DAYS);
    vec![
        ("version", API_VERSION.to_string()),
        ("action", ACTION.to_string()),
        ("cardType", CARD_TYPE.to_string()),
        ("cardNo", creds.card_no.trim().to_string()),
        ("cardEncrypt", creds.card_encrypt.trim().to_string()),
        ("appID", app_id.to_string()),
        ("startDate", slash_date(start)),
        ("endDate", slash_date(now)),
        ("onlyWinningInv", "N".to_string()),
        ("uuid", CLIENT_UUID.to_string()),
        ("timeStamp", (now.timestamp() + TIMESTAMP_SKEW_SECS).to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn field<'a>(form: &'a [(&'static str, String)], key: &str) -> &'a str {
        form.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_query_form_fields() {
        let now = Local.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let form = query_form(&CarrierCredentials::new(" /ABC1234 ", "pw"), "EINV001", now);

        assert_eq!(field(&form, "cardType"), "3J0002");
        assert_eq!(field(&form, "cardNo"), "/ABC1234");
        assert_eq!(field(&form, "startDate"), "2024/02/14");
        assert_eq!(field(&form, "endDate"), "2024/03/15");
        assert_eq!(field(&form, "onlyWinningInv"), "N");
        assert_eq!(
            field(&form, "timeStamp"),
            (now.timestamp() + 10).to_string()
        );
        assert_eq!(form.len(), 11);
    }

    #[tokio::test]
    async fn test_mock_ignores_credentials() {
        let now = Local.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let client = CarrierClient::mock(Duration::ZERO);

        let a = client.fetch(&CarrierCredentials::default(), now).await.unwrap();
        let b = client
            .fetch(&CarrierCredentials::new("/XYZ", "secret"), now)
            .await
            .unwrap();

        assert_eq!(a.len(), 3);
        assert_eq!(a, b);
        assert!(a.iter().all(|d| d.date == "2024-03-15"));
    }

    #[tokio::test]
    async fn test_live_requires_credentials() {
        let client = CarrierClient::live("http://127.0.0.1:1", DEFAULT_APP_ID);
        let err = client
            .fetch(&CarrierCredentials::new("/ABC", " "), Local::now())
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::NotConfigured(_)));
    }
}
