//! Spreadsheet mirror via a Google Apps Script web endpoint.
//!
//! Requests go out as `text/plain`; the script parses the body as JSON.

use ledger_core::Expense;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RemoteError, Result, ensure_success};

const PLAIN_TEXT: &str = "text/plain;charset=utf-8";

/// Where to mirror expenses. Its absence disables sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptConfig {
    pub script_url: String,
}

impl ScriptConfig {
    pub fn new(script_url: impl Into<String>) -> Self {
        Self {
            script_url: script_url.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum SheetRequest<'a> {
    Add { data: &'a [Expense] },
    Test,
}

#[derive(Debug, Deserialize)]
struct SheetReply {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SheetClient {
    http: reqwest::Client,
}

impl SheetClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Round-trip a `test` action. Succeeds only on HTTP 2xx with
    /// `status == "success"` in the reply.
    pub async fn check_connection(&self, url: &str) -> Result<()> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RemoteError::NotConfigured("script URL must not be empty".to_string()));
        }
        self.post(url, &SheetRequest::Test, "connection test failed").await?;
        info!(url, "sheet connection ok");
        Ok(())
    }

    /// Append expenses to the sheet.
    pub async fn append(&self, config: &ScriptConfig, expenses: &[Expense]) -> Result<()> {
        let url = config.script_url.trim();
        if url.is_empty() {
            return Err(RemoteError::NotConfigured(
                "no Apps Script URL configured; run: ledger config set-sheet <url>".to_string(),
            ));
        }
        self.post(url, &SheetRequest::Add { data: expenses }, "write failed")
            .await?;
        info!(count = expenses.len(), "appended expenses to sheet");
        Ok(())
    }

    async fn post(&self, url: &str, req: &SheetRequest<'_>, fallback: &str) -> Result<()> {
        let body = serde_json::to_string(req)
            .map_err(|e| RemoteError::InvalidResponse(format!("encode request: {e}")))?;
        debug!(url, bytes = body.len(), "posting to sheet");

        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, PLAIN_TEXT)
            .body(body)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;

        let text = resp.text().await?;
        let reply: SheetReply = serde_json::from_str(&text)
            .map_err(|e| RemoteError::InvalidResponse(format!("{e}: {text}")))?;

        match reply.status.as_deref() {
            Some("success") => Ok(()),
            _ => Err(RemoteError::Rejected(
                reply.message.unwrap_or_else(|| fallback.to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::Category;

    #[test]
    fn test_request_shapes() {
        let test = serde_json::to_value(SheetRequest::Test).unwrap();
        assert_eq!(test, serde_json::json!({"action": "test"}));

        let expenses = vec![Expense {
            id: "e1".into(),
            date: "2024-06-01".into(),
            amount: 12.5,
            category: Category::Food,
            description: "coffee".into(),
            merchant: String::new(),
        }];
        let add = serde_json::to_value(SheetRequest::Add { data: &expenses }).unwrap();
        assert_eq!(add["action"], "add");
        assert_eq!(add["data"][0]["amount"], 12.5);
        assert_eq!(add["data"][0]["category"], "food");
    }

    #[test]
    fn test_script_config_wire_name() {
        let json = serde_json::to_string(&ScriptConfig::new("https://x")).unwrap();
        assert_eq!(json, r#"{"scriptUrl":"https://x"}"#);
    }

    #[tokio::test]
    async fn test_empty_url_is_not_sent() {
        let err = SheetClient::new().check_connection("  ").await.unwrap_err();
        assert!(matches!(err, RemoteError::NotConfigured(_)));

        let err = SheetClient::new()
            .append(&ScriptConfig::new(""), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::NotConfigured(_)));
    }
}
