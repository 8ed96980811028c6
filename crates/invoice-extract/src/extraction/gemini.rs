//! Gemini client for invoice extraction via the Generative Language API
//!
//! The PDF is sent inline (base64) together with the extraction prompt. The
//! caller's API key is forwarded as-is in the `x-goog-api-key` header.

use async_trait::async_trait;
use base64::Engine;
use std::sync::Arc;
use std::time::Duration;

use super::adapter::{FencedJsonAdapter, ResponseAdapter};
use super::prompt::EXTRACTION_PROMPT;
use super::InvoiceExtractor;
use crate::config::GeminiConfig;
use crate::error::{Error, Result};
use crate::types::InvoiceRecord;

/// Gemini extraction client
pub struct GeminiExtractor {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    adapter: Arc<dyn ResponseAdapter>,
}

impl GeminiExtractor {
    /// Create a new client using the fenced-JSON response adapter
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            adapter: Arc::new(FencedJsonAdapter),
        })
    }

    /// Replace the response adapter
    pub fn with_adapter(mut self, adapter: Arc<dyn ResponseAdapter>) -> Self {
        self.adapter = adapter;
        self
    }

    /// Get the API endpoint URL
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request(&self, pdf: &[u8]) -> GenerateRequest {
        let data = base64::engine::general_purpose::STANDARD.encode(pdf);
        GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "application/pdf".to_string(),
                            data,
                        },
                    },
                    Part::Text {
                        text: EXTRACTION_PROMPT.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(serde::Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(serde::Deserialize)]
struct ApiError {
    message: String,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate
    fn into_text(self) -> Result<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!(" (blocked: {})", r))
                .unwrap_or_default();
            return Err(Error::extraction(format!("No text in Gemini response{}", reason)));
        }
        Ok(text)
    }
}

#[async_trait]
impl InvoiceExtractor for GeminiExtractor {
    async fn extract(&self, pdf: &[u8], api_key: &str) -> Result<InvoiceRecord> {
        let request = self.build_request(pdf);

        tracing::debug!(
            "Sending {} byte PDF to {} ({})",
            pdf.len(),
            self.model,
            self.adapter.name()
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::extraction(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(Error::extraction(format!(
                "Gemini request failed ({}): {}",
                status, detail
            )));
        }

        let gen_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::extraction(format!("Failed to parse Gemini response: {}", e)))?;

        let text = gen_response.into_text()?;
        self.adapter.parse(&text)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
