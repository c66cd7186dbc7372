use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::model::ProviderError;

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    error_chain_matches(err, ErrorKind::ConnectionRefused, "connection refused")
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    error_chain_matches(err, ErrorKind::TimedOut, "timed out")
}

fn error_chain_matches(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

/// Maps a failed send into a transport failure. `api_url` must not carry credentials.
pub(crate) fn transport_error(
    err: reqwest::Error,
    provider: &str,
    api_url: &str,
    timeout_secs: u64,
) -> ProviderError {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return ProviderError::Transport(format!(
            "{provider} request timed out after {timeout_secs}s while calling '{api_url}'. \
             Increase MODEL_TIMEOUT_SECS or retry later."
        ));
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return ProviderError::Transport(format!(
                "Connection refused by {provider} API at '{api_url}'. \
                 Check the configured base URL."
            ));
        }

        return ProviderError::Transport(format!(
            "Failed to connect to {provider} API at '{api_url}'. \
             Check the configured base URL and network connectivity."
        ));
    }

    // The request URL may hold a query-string key, so it is dropped from the message.
    let err = err.without_url();
    ProviderError::Transport(format!(
        "Failed to call {provider} API at '{api_url}': {err}"
    ))
}
