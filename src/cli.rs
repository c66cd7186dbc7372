use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_MAX_TOKENS: u32 = 3000;
pub const DEFAULT_LANGUAGE: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("Usage: llm-relay <prompt_file> [max_tokens] [language]")]
    MissingPromptFile,

    #[error("Invalid max_tokens '{0}': expected a non-negative integer")]
    InvalidMaxTokens(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub prompt_file: PathBuf,
    pub max_tokens: u32,
    pub language: String,
}

impl CliArgs {
    /// Parses positional arguments, excluding the program name. Extra arguments are ignored.
    ///
    /// The prompt path is taken as-is, so it need not be UTF-8.
    pub fn parse(args: impl IntoIterator<Item = OsString>) -> Result<Self, UsageError> {
        let mut args = args.into_iter();
        let prompt_file = args
            .next()
            .map(PathBuf::from)
            .ok_or(UsageError::MissingPromptFile)?;
        let max_tokens = match args.next() {
            Some(raw) => raw
                .to_str()
                .and_then(|value| value.trim().parse::<u32>().ok())
                .ok_or_else(|| {
                    UsageError::InvalidMaxTokens(raw.to_string_lossy().into_owned())
                })?,
            None => DEFAULT_MAX_TOKENS,
        };
        let language = args
            .next()
            .map(|raw| raw.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Self {
            prompt_file,
            max_tokens,
            language,
        })
    }
}
