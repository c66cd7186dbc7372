use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Provider, ProviderFuture, endpoint_url, post_json};
use crate::config::ProviderSettings;
use crate::model::{GenerationRequest, GenerationResult, ProviderError};

const API_KEY_VAR: &str = "GEMINI_API_KEY";
const TEMPERATURE: f64 = 0.3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Client for the Gemini `generateContent` API. The key travels as a query parameter.
pub struct GeminiProvider {
    client: Client,
    api_key: Option<String>,
    model: String,
    api_url: String,
    timeout_secs: u64,
}

impl GeminiProvider {
    pub fn new(client: Client, settings: &ProviderSettings, timeout_secs: u64) -> Self {
        let path = format!("/v1beta/models/{}:generateContent", settings.model);
        Self {
            client,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_url: endpoint_url(&settings.base_url, &path),
            timeout_secs,
        }
    }

    async fn send(&self, request: &GenerationRequest) -> GenerationResult {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey { var: API_KEY_VAR })?;

        let body = GenerateContentRequest {
            contents: [Content {
                parts: [Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: TEMPERATURE,
            },
        };
        debug!(
            api_url = %self.api_url,
            model = %self.model,
            max_tokens = request.max_tokens,
            prompt_len = request.prompt.len(),
            "sending gemini generateContent request"
        );

        let builder = self
            .client
            .post(&self.api_url)
            .query(&[("key", api_key)])
            .json(&body);
        let response_body =
            post_json(builder, self.name(), &self.api_url, self.timeout_secs).await?;
        extract_text(&response_body)
    }
}

impl Provider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> ProviderFuture<'a> {
        Box::pin(self.send(request))
    }
}

/// Text of the first part of the first candidate. An empty text counts as no candidates.
fn extract_text(body: &str) -> GenerationResult {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|err| ProviderError::MalformedResponse(err.to_string()))?;
    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Err(ProviderError::NoCandidates);
    };
    let text = candidate
        .content
        .parts
        .into_iter()
        .next()
        .map(|part| part.text)
        .unwrap_or_default();
    if text.is_empty() {
        return Err(ProviderError::NoCandidates);
    }
    Ok(text)
}
