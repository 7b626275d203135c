//! Gemini `generateContent` REST client.
//!
//! Thin HTTP wrapper for `/models/{model}:generateContent`. Pure parsing in
//! `parse_response` for testability.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::types::{LlmError, VisionRequest, VisionResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME: &str = "application/json";

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
    }

    pub async fn generate(&self, model: &str, request: &VisionRequest) -> Result<VisionResponse, LlmError> {
        let body = build_request(request);
        let url = format!("{}/models/{model}:generateContent", self.base_url);

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(classify_transport_error)?;

        if !(200..300).contains(&status) {
            return Err(LlmError::ApiResponse { status, body: text });
        }

        parse_response(&text, model)
    }
}

fn classify_transport_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() { LlmError::ApiTimeout(err.to_string()) } else { LlmError::ApiRequest(err.to_string()) }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<ApiContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct ApiContent<'a> {
    role: &'static str,
    parts: Vec<ApiPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ApiPart<'a> {
    Text { text: &'a str },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: ApiInlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiInlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

// =============================================================================
// BUILDING / PARSING
// =============================================================================

fn build_request(request: &VisionRequest) -> ApiRequest<'_> {
    ApiRequest {
        contents: vec![ApiContent {
            role: "user",
            parts: vec![
                ApiPart::Text { text: &request.prompt },
                ApiPart::InlineData {
                    inline_data: ApiInlineData { mime_type: &request.image.mime_type, data: &request.image.data },
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: JSON_MIME,
            response_schema: &request.response_schema,
        },
    }
}

fn parse_response(json: &str, requested_model: &str) -> Result<VisionResponse, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let first = api.candidates.into_iter().next();
    let finish_reason = first.as_ref().and_then(|c| c.finish_reason.clone());
    let text = first
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.is_empty());

    let (input_tokens, output_tokens) = api
        .usage_metadata
        .map_or((0, 0), |u| (u.prompt_token_count, u.candidates_token_count));

    Ok(VisionResponse {
        text,
        model: api.model_version.unwrap_or_else(|| requested_model.to_string()),
        finish_reason,
        input_tokens,
        output_tokens,
    })
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
