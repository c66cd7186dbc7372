use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Provider, ProviderFuture, endpoint_url, post_json};
use crate::config::ProviderSettings;
use crate::model::{GenerationRequest, GenerationResult, ProviderError};

const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
const API_VERSION: &str = "2023-06-01";
const MESSAGES_PATH: &str = "/v1/messages";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [UserTurn<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Client for the Anthropic messages API.
pub struct AnthropicProvider {
    client: Client,
    api_key: Option<String>,
    model: String,
    api_url: String,
    timeout_secs: u64,
}

impl AnthropicProvider {
    pub fn new(client: Client, settings: &ProviderSettings, timeout_secs: u64) -> Self {
        Self {
            client,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_url: endpoint_url(&settings.base_url, MESSAGES_PATH),
            timeout_secs,
        }
    }

    async fn send(&self, request: &GenerationRequest) -> GenerationResult {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey { var: API_KEY_VAR })?;
        let api_key = HeaderValue::from_str(api_key)
            .map_err(|_| ProviderError::InvalidApiKey { var: API_KEY_VAR })?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            messages: [UserTurn {
                role: "user",
                content: &request.prompt,
            }],
        };
        debug!(
            api_url = %self.api_url,
            model = %self.model,
            max_tokens = request.max_tokens,
            prompt_len = request.prompt.len(),
            "sending anthropic messages request"
        );

        let builder = self
            .client
            .post(&self.api_url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header("x-api-key", api_key)
            .header("anthropic-version", HeaderValue::from_static(API_VERSION))
            .json(&body);
        let response_body =
            post_json(builder, self.name(), &self.api_url, self.timeout_secs).await?;
        extract_text(&response_body)
    }
}

impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> ProviderFuture<'a> {
        Box::pin(self.send(request))
    }
}

/// Text of the first content block. Missing fields read as empty, and empty text is an error.
fn extract_text(body: &str) -> GenerationResult {
    let parsed: MessagesResponse = serde_json::from_str(body)
        .map_err(|err| ProviderError::MalformedResponse(err.to_string()))?;
    let text = parsed
        .content
        .into_iter()
        .next()
        .map(|block| block.text)
        .unwrap_or_default();
    if text.is_empty() {
        return Err(ProviderError::EmptyContent);
    }
    Ok(text)
}
