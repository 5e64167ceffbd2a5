//! Gemini `generateContent` client with a structured-output schema.

use async_trait::async_trait;
use base64::Engine;
use chrono::Local;
use ledger_core::Category;
use ledger_ingest::{ExtractedRecord, parse_extraction_json};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{RemoteError, Result, ensure_success};
use crate::extractor::Extractor;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const IMAGE_PROMPT: &str = "Analyze this image (receipt or invoice). Extract the transaction details. \
If there are multiple distinct items that clearly belong to different categories, separate them. \
Otherwise, group them into a single transaction. Return the data in Traditional Chinese.";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Array of objects with five required string fields; `category` limited
/// to the display labels.
pub fn response_schema() -> Value {
    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "date": { "type": "STRING", "description": "Format YYYY-MM-DD" },
                "amount": { "type": "STRING", "description": "The cost as a string number" },
                "category": { "type": "STRING", "enum": labels, "description": "The category of the expense" },
                "description": { "type": "STRING", "description": "Brief description of the item(s)" },
                "merchant": { "type": "STRING", "description": "Name of the store or payee" }
            },
            "required": ["date", "amount", "category", "description", "merchant"]
        }
    })
}

fn category_list() -> String {
    Category::ALL
        .iter()
        .map(|c| format!("'{}'", c.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn image_instruction(today: &str) -> String {
    format!(
        "You are an expert accountant assistant. Your job is to extract expense data from images of receipts, invoices, or handwritten notes.\n\
Always date the transaction. If the year is missing, assume the current year. Today is {today}.\n\
Categorize strictly into one of these: {}.\n\
Return an empty list if no valid expense data is found.",
        category_list()
    )
}

fn text_instruction(today: &str) -> String {
    format!(
        "You are an accountant. Parse the unstructured text into expense records.\n\
Categorize strictly into one of these: {}.\n\
If date is missing, use today's date ({today}, YYYY-MM-DD). Return Traditional Chinese.",
        category_list()
    )
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                RemoteError::NotConfigured(
                    "missing Gemini API key; run: ledger config set-key (or set GEMINI_API_KEY)"
                        .to_string(),
                )
            })
    }

    async fn generate(&self, parts: Vec<Part>, instruction: String) -> Result<Vec<ExtractedRecord>> {
        let key = self.api_key()?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let body = GenerateRequest {
            contents: vec![Content { parts }],
            system_instruction: Content {
                parts: vec![Part::Text(instruction)],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        debug!(model = %self.config.model, "gemini request");
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;

        let out: GenerateResponse = resp.json().await?;
        let text: String = out
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        debug!(chars = text.len(), "gemini response");

        Ok(parse_extraction_json(&text)?)
    }
}

#[async_trait]
impl Extractor for GeminiClient {
    async fn extract_image(&self, image: &[u8], mime_type: &str) -> Result<Vec<ExtractedRecord>> {
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        let data = base64::engine::general_purpose::STANDARD.encode(image);
        let parts = vec![
            Part::InlineData(InlineData {
                mime_type: mime_type.to_string(),
                data,
            }),
            Part::Text(IMAGE_PROMPT.to_string()),
        ];
        self.generate(parts, image_instruction(&today)).await
    }

    async fn extract_text(&self, text: &str) -> Result<Vec<ExtractedRecord>> {
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        let parts = vec![Part::Text(format!(
            "Parse the following text into expense records: \"{text}\""
        ))];
        self.generate(parts, text_instruction(&today)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_every_category() {
        let schema = response_schema();
        let labels = schema["items"]["properties"]["category"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(labels.len(), 8);
        assert!(labels.iter().any(|l| l == "教育"));
        assert_eq!(schema["items"]["required"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_part_wire_shape() {
        let v = serde_json::to_value(Part::InlineData(InlineData {
            mime_type: "image/png".into(),
            data: "AAAA".into(),
        }))
        .unwrap();
        assert_eq!(v, json!({"inlineData": {"mimeType": "image/png", "data": "AAAA"}}));
        let v = serde_json::to_value(Part::Text("hi".into())).unwrap();
        assert_eq!(v, json!({"text": "hi"}));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: Some("  ".into()),
            // Unroutable; a request would fail differently
            base_url: "http://127.0.0.1:1".into(),
            ..GeminiConfig::default()
        });
        let err = client.extract_text("lunch 120").await.unwrap_err();
        assert!(matches!(err, RemoteError::NotConfigured(_)));
    }
}
