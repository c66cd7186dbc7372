pub mod anthropic;
pub mod gemini;
mod http_errors;
#[cfg(test)]
pub(crate) mod test_server;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use crate::config::{Config, ProviderKind};
use crate::model::{GenerationRequest, GenerationResult, ProviderError};
use http_errors::transport_error;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;

pub type ProviderFuture<'a> = Pin<Box<dyn Future<Output = GenerationResult> + 'a>>;

/// A remote text-generation API. One `generate` call makes at most one HTTP request.
pub trait Provider {
    fn name(&self) -> &'static str;

    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> ProviderFuture<'a>;
}

/// Maps a provider selection to the client that serves it.
pub trait ProviderResolver {
    fn resolve(&self, kind: ProviderKind) -> &dyn Provider;
}

pub struct HttpProviders {
    anthropic: AnthropicProvider,
    gemini: GeminiProvider,
}

impl HttpProviders {
    pub fn new(client: &Client, cfg: &Config) -> Self {
        Self {
            anthropic: AnthropicProvider::new(
                client.clone(),
                &cfg.anthropic,
                cfg.model_timeout_secs,
            ),
            gemini: GeminiProvider::new(client.clone(), &cfg.gemini, cfg.model_timeout_secs),
        }
    }
}

impl ProviderResolver for HttpProviders {
    fn resolve(&self, kind: ProviderKind) -> &dyn Provider {
        match kind {
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Gemini => &self.gemini,
        }
    }
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Sends a prepared POST and returns the body of a `200 OK` response.
/// Any other status becomes [`ProviderError::Remote`].
async fn post_json(
    request: RequestBuilder,
    provider: &str,
    api_url: &str,
    timeout_secs: u64,
) -> Result<String, ProviderError> {
    let response = request
        .timeout(Duration::from_secs(timeout_secs))
        .send()
        .await
        .map_err(|err| {
            let mapped = transport_error(err, provider, api_url, timeout_secs);
            debug!(provider, error = %mapped, "provider request failed");
            mapped
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|err| {
        debug!(provider, status = %status, "failed to read provider response body");
        transport_error(err, provider, api_url, timeout_secs)
    })?;

    if status != StatusCode::OK {
        debug!(
            provider,
            api_url = %api_url,
            status = %status,
            response_body_len = body.len(),
            "provider returned non-success status"
        );
        return Err(ProviderError::remote(status.as_u16(), &body));
    }

    debug!(provider, response_body_len = body.len(), "received provider response");
    Ok(body)
}
