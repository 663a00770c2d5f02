use anyhow::Result;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

use crate::models::{AnalysisRequest, AnalysisResult};
use crate::services::VisionModel;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

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
    Text {
        text: String,
    },
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Client for the Google `generateContent` REST endpoint. Holds the
/// credential resolved once at startup; no per-request override.
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    /// Ordered parts: prompt text, inline image, then the BMI annotation
    /// when metrics were collected.
    fn build_request(&self, request: &AnalysisRequest) -> GenerateContentRequest {
        let mut parts = vec![
            Part::Text {
                text: request.prompt.to_string(),
            },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: request.image.mime_type.clone(),
                    data: general_purpose::STANDARD.encode(&request.image.data),
                },
            },
        ];

        if let Some(bmi) = request.bmi {
            parts.push(Part::Text {
                text: format!("{{\"bmi\": {}}}", bmi),
            });
        }

        GenerateContentRequest {
            contents: vec![Content { parts }],
        }
    }
}

#[async_trait::async_trait]
impl VisionModel for GeminiClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        log::debug!(
            "📸 Building inference request: {} bytes of {}, bmi={:?}",
            request.image.data.len(),
            request.image.mime_type,
            request.bmi
        );

        let body = self.build_request(request);
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);

        log::info!("🤖 Sending request to Gemini model: {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Gemini response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ Gemini API error response: {}", error_text);
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let generated: GenerateContentResponse = response.json().await?;

        let text = generated
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default();

        log::info!("💬 Gemini returned {} chars of analysis", text.len());

        Ok(AnalysisResult { text })
    }
}
