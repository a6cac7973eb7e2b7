//! Minimal Gemini REST client: `models.list` and `models.generateContent`.
//!
//! The API key travels in the `x-goog-api-key` header, never in the URL,
//! so it cannot leak through request logging.

use crate::config::Credential;
use crate::error::{ReviewError, SectionError};
use crate::pipeline::llm::{GenerationOptions, TextGenerator};
use crate::pipeline::models::{ModelCatalog, ModelInfo};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const API_VERSION: &str = "v1beta";
const LIST_PAGE_SIZE: u32 = 1000;
/// Upper bound on list pages followed, in case the server keeps returning tokens.
const MAX_LIST_PAGES: usize = 20;

/// HTTP client bound to one credential.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    credential: Credential,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        credential: Credential,
        timeout_secs: u64,
    ) -> Result<Self, ReviewError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ReviewError::HttpClient(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_VERSION, path)
    }
}

/// Accept both "gemini-1.5-pro" and "models/gemini-1.5-pro".
pub fn qualified_model_name(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<WireModel>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireModel {
    name: String,
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ── Response handling ────────────────────────────────────────────────────

/// Join the text parts of the first candidate, as the official SDKs do.
fn response_text(resp: GenerateResponse) -> Result<String, SectionError> {
    let Some(candidate) = resp.candidates.into_iter().next() else {
        let reason = resp
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked ({r})"))
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(SectionError::EmptyResponse(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .map(|r| format!("finish reason {r}"))
            .unwrap_or_else(|| "candidate has no text".to_string());
        return Err(SectionError::EmptyResponse(reason));
    }
    Ok(text)
}

/// Extract `error.message` from a Google API error body, or fall back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => env.error.message,
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.chars().count() > 300 {
                let head: String = trimmed.chars().take(300).collect();
                format!("{head}\u{2026}")
            } else {
                trimmed.to_string()
            }
        }
    }
}

fn status_error(status: reqwest::StatusCode, body: &str) -> SectionError {
    let message = error_message(body);
    match status.as_u16() {
        401 | 403 => SectionError::Auth {
            status: status.as_u16(),
            message,
        },
        429 => SectionError::RateLimited(message),
        code => SectionError::Api {
            status: code,
            message,
        },
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, SectionError> {
        let model = qualified_model_name(&options.model);
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
            },
        };

        debug!("POST {}:generateContent ({} prompt chars)", model, prompt.len());
        let response = self
            .http
            .post(self.url(&format!("{model}:generateContent")))
            .header("x-goog-api-key", self.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| SectionError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SectionError::Request(e.to_string()))?;

        if !status.is_success() {
            warn!("generateContent returned HTTP {}", status);
            return Err(status_error(status, &text));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| SectionError::Malformed(e.to_string()))?;
        response_text(parsed)
    }
}

impl ModelCatalog for GeminiClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ReviewError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_LIST_PAGES {
            let mut request = self
                .http
                .get(self.url("models"))
                .header("x-goog-api-key", self.credential.expose())
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await.map_err(|e| ReviewError::ModelListFailed {
                detail: e.to_string(),
            })?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| ReviewError::ModelListFailed {
                    detail: e.to_string(),
                })?;
            if !status.is_success() {
                return Err(ReviewError::ModelListFailed {
                    detail: format!("HTTP {}: {}", status, error_message(&body)),
                });
            }

            let page: ListModelsResponse =
                serde_json::from_str(&body).map_err(|e| ReviewError::ModelListFailed {
                    detail: format!("malformed model list: {e}"),
                })?;

            models.extend(page.models.into_iter().map(|m| ModelInfo {
                name: m.name,
                display_name: m.display_name,
                supported_generation_methods: m.supported_generation_methods,
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Listed {} models", models.len());
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_name_is_qualified() {
        assert_eq!(qualified_model_name("gemini-1.5-pro"), "models/gemini-1.5-pro");
        assert_eq!(
            qualified_model_name("models/gemini-1.5-pro"),
            "models/gemini-1.5-pro"
        );
        assert_eq!(qualified_model_name("tunedModels/x"), "tunedModels/x");
    }

    #[test]
    fn request_omits_absent_token_cap() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: None,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["generationConfig"]["temperature"], serde_json::json!(0.7f32));
        assert!(json["generationConfig"].get("maxOutputTokens").is_none());
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn parts_are_joined() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(response_text(resp).unwrap(), "ab");
    }

    #[test]
    fn blocked_prompt_is_empty_response() {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let err = response_text(resp).unwrap_err();
        assert!(matches!(err, SectionError::EmptyResponse(ref r) if r.contains("SAFETY")));
    }

    #[test]
    fn status_mapping() {
        let body = r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
        assert!(matches!(
            status_error(reqwest::StatusCode::FORBIDDEN, body),
            SectionError::Auth { status: 403, ref message } if message == "API key not valid"
        ));
        assert!(matches!(
            status_error(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down"),
            SectionError::RateLimited(ref m) if m == "slow down"
        ));
        assert!(matches!(
            status_error(reqwest::StatusCode::BAD_GATEWAY, ""),
            SectionError::Api { status: 502, .. }
        ));
    }
}
