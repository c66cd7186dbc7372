use tracing::debug;

/// Longest prompt, in characters, forwarded to a provider.
pub const MAX_PROMPT_CHARS: usize = 15_000;

/// Removed literally, one pass per pattern, in this order.
pub const FORBIDDEN_PATTERNS: [&str; 5] = ["<script>", "javascript:", "data:", "eval(", "exec("];

/// Strips forbidden substrings, then truncates to [`MAX_PROMPT_CHARS`].
pub fn sanitize(raw: &str) -> String {
    let mut sanitized = raw.to_string();
    for pattern in FORBIDDEN_PATTERNS {
        if sanitized.contains(pattern) {
            sanitized = sanitized.replace(pattern, "");
        }
    }
    let removed_bytes = raw.len() - sanitized.len();

    let truncated = match sanitized.char_indices().nth(MAX_PROMPT_CHARS) {
        Some((cut, _)) => {
            sanitized.truncate(cut);
            true
        }
        None => false,
    };

    if removed_bytes > 0 || truncated {
        debug!(
            removed_bytes,
            truncated,
            prompt_len = sanitized.len(),
            "sanitized prompt"
        );
    }
    sanitized
}
