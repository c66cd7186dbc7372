use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, ProviderKind};
use crate::model::{GenerationRequest, ProviderError};
use crate::providers::{HttpProviders, ProviderResolver};
use crate::retry::{RetryError, RetryPolicy, Sleeper, TokioSleeper, with_retry};
use crate::sanitize::sanitize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error(transparent)]
    Provider(ProviderError),

    #[error("API call failed after retries: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: ProviderError },
}

impl From<RetryError<ProviderError>> for DispatchError {
    fn from(err: RetryError<ProviderError>) -> Self {
        match err {
            RetryError::Permanent(err) => Self::Provider(err),
            RetryError::Exhausted {
                attempts,
                last_error,
            } => Self::RetriesExhausted {
                attempts,
                last_error,
            },
        }
    }
}

/// Routes a prompt to the configured provider: sanitize, then call it under the retry policy.
pub struct Dispatcher<R = HttpProviders, S = TokioSleeper> {
    provider_setting: String,
    retry: RetryPolicy,
    retry_server_errors: bool,
    providers: R,
    sleeper: S,
}

impl Dispatcher<HttpProviders, TokioSleeper> {
    pub fn new(client: &Client, cfg: &Config) -> Self {
        Self::with_parts(cfg, HttpProviders::new(client, cfg), TokioSleeper)
    }
}

impl<R, S> Dispatcher<R, S> {
    pub fn with_parts(cfg: &Config, providers: R, sleeper: S) -> Self {
        Self {
            provider_setting: cfg.model_provider.clone(),
            retry: RetryPolicy::from(&cfg.retry),
            retry_server_errors: cfg.retry.retry_server_errors,
            providers,
            sleeper,
        }
    }
}

impl<R, S> Dispatcher<R, S>
where
    R: ProviderResolver,
    S: Sleeper,
{
    pub async fn dispatch(&self, prompt: &str, max_tokens: u32) -> Result<String, DispatchError> {
        let Some(kind) = ProviderKind::parse(&self.provider_setting) else {
            let name = self.provider_setting.trim().to_ascii_lowercase();
            debug!(provider = %name, "unsupported model provider configured");
            return Err(DispatchError::UnknownProvider(name));
        };

        let request = GenerationRequest::new(sanitize(prompt), max_tokens, kind);
        let provider = self.providers.resolve(kind);
        let retry_server_errors = self.retry_server_errors;
        debug!(
            provider = request.provider.as_str(),
            max_tokens,
            prompt_len = request.prompt.len(),
            max_attempts = self.retry.max_attempts,
            "dispatching generation request"
        );

        with_retry(
            &self.retry,
            &self.sleeper,
            |err: &ProviderError| err.is_retryable(retry_server_errors),
            |_attempt| provider.generate(&request),
        )
        .await
        .map_err(|err| {
            let (RetryError::Permanent(inner) | RetryError::Exhausted { last_error: inner, .. }) =
                &err;
            info!(
                provider = provider.name(),
                failure_kind = ?inner.kind(),
                error = %inner,
                "generation failed"
            );
            DispatchError::from(err)
        })
    }
}
