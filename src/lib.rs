pub mod cli;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod model;
pub mod providers;
pub mod retry;
pub mod sanitize;
pub mod validate;

use std::env;
use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use cli::CliArgs;
use config::Config;
use dispatch::Dispatcher;
use validate::validate;

/// Reads the prompt file named on the command line, generates text for it and
/// prints the result. Validation problems are reported on stderr only.
pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let args = CliArgs::parse(env::args_os().skip(1))?;
    let cfg = Config::from_env();
    info!(
        provider = %cfg.model_provider,
        max_tokens = args.max_tokens,
        language = %args.language,
        max_attempts = cfg.retry.max_attempts,
        "loaded runtime configuration"
    );

    let prompt = fs::read_to_string(&args.prompt_file).with_context(|| {
        format!(
            "Failed to read prompt file '{}'",
            args.prompt_file.display()
        )
    })?;

    let client = Client::builder()
        .build()
        .context("Failed to initialize HTTP client")?;
    let dispatcher = Dispatcher::new(&client, &cfg);
    let content = dispatcher.dispatch(&prompt, args.max_tokens).await?;

    let verdict = validate(&content, &args.language);
    if !verdict.valid {
        info!(
            language = %args.language,
            reason = %verdict.reason,
            "generated content failed validation"
        );
        eprintln!(
            "WARNING: Generated content validation failed: {}",
            verdict.reason
        );
        eprintln!("INFO: Proceeding with unvalidated content");
    }

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{content}")
        .and_then(|()| stdout.flush())
        .context("Failed to write generated text")?;
    Ok(())
}
