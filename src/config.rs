use std::env;

const DEFAULT_MODEL_PROVIDER: &str = "anthropic";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-sonnet-20240229";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
const DEFAULT_RETRY_SERVER_ERRORS: bool = false;

/// Providers the dispatcher knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Anthropic,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    /// Case-insensitive lookup; unknown names yield `None` instead of a default.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Some(Self::Anthropic),
            "gemini" => Some(Self::Gemini),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    /// `None` leaves the summed backoff unbounded.
    pub max_total_wait_secs: Option<u64>,
    pub retry_server_errors: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_total_wait_secs: None,
            retry_server_errors: DEFAULT_RETRY_SERVER_ERRORS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Raw `MODEL_PROVIDER` value. Resolved at dispatch time so an unknown
    /// name is reported rather than silently replaced.
    pub model_provider: String,
    pub anthropic: ProviderSettings,
    pub gemini: ProviderSettings,
    pub model_timeout_secs: u64,
    pub retry: RetrySettings,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    pub fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let anthropic = ProviderSettings {
            api_key: parse_api_key(get_var("ANTHROPIC_API_KEY").as_deref()),
            model: get_var("ANTHROPIC_MODEL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            base_url: get_var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
        };
        let gemini = ProviderSettings {
            api_key: parse_api_key(get_var("GEMINI_API_KEY").as_deref()),
            model: get_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: get_var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        };
        let retry = RetrySettings {
            max_attempts: parse_positive_u32(
                get_var("RETRY_MAX_ATTEMPTS").as_deref(),
                DEFAULT_RETRY_MAX_ATTEMPTS,
            ),
            base_delay_ms: parse_u64(
                get_var("RETRY_BASE_DELAY_MS").as_deref(),
                DEFAULT_RETRY_BASE_DELAY_MS,
            ),
            max_total_wait_secs: get_var("RETRY_MAX_TOTAL_WAIT_SECS")
                .and_then(|value| value.trim().parse::<u64>().ok()),
            retry_server_errors: parse_bool(
                get_var("RETRY_SERVER_ERRORS").as_deref(),
                DEFAULT_RETRY_SERVER_ERRORS,
            ),
        };

        Self {
            model_provider: get_var("MODEL_PROVIDER")
                .unwrap_or_else(|| DEFAULT_MODEL_PROVIDER.to_string()),
            anthropic,
            gemini,
            model_timeout_secs: parse_positive_u64(
                get_var("MODEL_TIMEOUT_SECS").as_deref(),
                DEFAULT_MODEL_TIMEOUT_SECS,
            ),
            retry,
        }
    }
}

fn parse_api_key(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_positive_u32(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
