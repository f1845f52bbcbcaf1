use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use base64::Engine;
use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::extraction::{parser, DraftItem};

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const EXTRACTION_PROMPT: &str = "\
Analyze this refrigerator receipt or food photo.
Extract a list of distinct food items.
For each item, identify:
1. Name (concise, e.g. \"Cheddar Cheese\")
2. Quantity (e.g. \"1 block\", \"200g\", \"x2\")
3. Expiration Date: ESTIMATE a conservative expiration date based on the food type assuming bought today. Format YYYY-MM-DD.

Return ONLY a raw JSON array of objects with keys: name, qty, expires.
Do not include markdown code fences or other text.";

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Inline { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: String,
}

/// Client for the Gemini generateContent endpoint. Holds a pooled
/// reqwest client; the API key is passed per request since the user
/// can change it at runtime.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl GeminiClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            max_retries: 1,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Send a JPEG to the model and parse its reply into drafts.
    ///
    /// On transient errors (429, 500, 503), retries once after a
    /// 1-second delay.
    pub async fn analyze_image(
        &self,
        api_key: &str,
        model: &str,
        image: &[u8],
    ) -> Result<Vec<DraftItem>> {
        if api_key.is_empty() {
            bail!("Gemini API key is not set; add one in settings before scanning");
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: EXTRACTION_PROMPT.to_string(),
                    },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: encoded,
                        },
                    },
                ],
            }],
        };

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!("retrying extraction request after transient error (attempt {attempt})");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&request)
                .send()
                .await
                .context("extraction request failed")?;

            let status = response.status();
            debug!("extraction response received: status={status} attempt={attempt}");

            if status.is_success() {
                let body: GenerateContentResponse = response
                    .json()
                    .await
                    .context("failed to decode extraction response")?;

                let text = body
                    .candidates
                    .into_iter()
                    .next()
                    .and_then(|candidate| candidate.content.parts.into_iter().next())
                    .map(|part| part.text)
                    .ok_or_else(|| anyhow!("extraction response contained no candidates"))?;

                return parser::parse_model_reply(&text, Utc::now());
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!("transient extraction error {status}: {body}");
                last_error = Some(anyhow!("Gemini API returned {status}: {body}"));
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            bail!("Gemini API returned {status}: {body}");
        }

        Err(last_error.unwrap_or_else(|| anyhow!("extraction request failed after retries")))
    }
}

fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
