use thiserror::Error;

use crate::config::ProviderKind;

/// Characters of a remote error body kept in [`ProviderError::Remote`].
pub const REMOTE_BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub provider: ProviderKind,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32, provider: ProviderKind) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            provider,
        }
    }
}

/// Generated text on success, a provider failure otherwise.
pub type GenerationResult = Result<String, ProviderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Configuration,
    Transport,
    Remote,
    ContentShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{var} not set")]
    MissingApiKey { var: &'static str },

    #[error("{var} is not a valid header value")]
    InvalidApiKey { var: &'static str },

    #[error("{0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("No candidates in response")]
    NoCandidates,

    #[error("Empty content in response")]
    EmptyContent,

    #[error("Failed to parse response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Builds a remote failure keeping only the head of the response body.
    pub fn remote(status: u16, body: &str) -> Self {
        Self::Remote {
            status,
            body: body.chars().take(REMOTE_BODY_PREVIEW_CHARS).collect(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingApiKey { .. } | Self::InvalidApiKey { .. } => FailureKind::Configuration,
            Self::Transport(_) => FailureKind::Transport,
            Self::Remote { .. } => FailureKind::Remote,
            Self::NoCandidates | Self::EmptyContent | Self::MalformedResponse(_) => {
                FailureKind::ContentShape
            }
        }
    }

    /// Transport failures are always worth another attempt. Remote 5xx and 429
    /// only when `include_server_errors` is set.
    pub fn is_retryable(&self, include_server_errors: bool) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Remote { status, .. } => {
                include_server_errors && (*status == 429 || (500..600).contains(status))
            }
            _ => false,
        }
    }
}
