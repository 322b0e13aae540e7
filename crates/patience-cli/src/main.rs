//! patience - fetch a URL, waiting out HTTP 429 responses
//!
//! Retries rate-limited requests, sleeping for the server's `Retry-After` hint when
//! one is given and for the configured fallback otherwise.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use patience_core::{fetch_url, FallbackConfig, RetryConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "patience")]
#[command(about = "Fetch URLs, retrying politely on HTTP 429")]
#[command(version)]
struct Cli {
    /// Path to the retry config (defaults to <config dir>/patience/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log retry decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// GET a URL, retrying while the server answers 429
    Fetch(FetchArgs),
}

#[derive(Args, Debug)]
struct FetchArgs {
    url: String,

    /// Total attempts, including the first
    #[arg(short, long)]
    attempts: Option<u32>,

    /// Fixed wait in seconds when no Retry-After is given
    #[arg(long)]
    fallback_secs: Option<u64>,

    /// Print the response body
    #[arg(long)]
    body: bool,
}

/// Command-line flags win over the config file
fn apply_overrides(mut config: RetryConfig, args: &FetchArgs) -> RetryConfig {
    if let Some(attempts) = args.attempts {
        config.max_attempts = attempts.max(1);
    }
    if let Some(secs) = args.fallback_secs {
        config.fallback = FallbackConfig::Fixed { secs };
    }
    config
}

fn load_config(path: Option<PathBuf>) -> Result<RetryConfig> {
    match path.or_else(RetryConfig::default_path) {
        Some(path) => RetryConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => {
            warn!("No config directory available, using defaults");
            Ok(RetryConfig::default())
        }
    }
}

async fn fetch(config: RetryConfig, args: FetchArgs) -> Result<()> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("patience/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;

    let retrying = apply_overrides(config, &args)
        .build()
        .before_sleep(|ctx, delay: Duration| {
            info!(
                "Attempt {} failed with a retryable status, retrying in {:?}",
                ctx.attempt_number, delay
            );
        });

    let response = retrying
        .call(|| fetch_url(&client, &args.url))
        .await
        .with_context(|| format!("fetching {}", args.url))?;

    let status = response.status();
    let body = response.bytes().await.context("reading response body")?;
    println!("{} {} ({} bytes)", status, args.url, body.len());

    if args.body {
        println!("{}", String::from_utf8_lossy(&body));
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config)?;

    match cli.command {
        Command::Fetch(args) => fetch(config, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_args(argv: &[&str]) -> FetchArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Fetch(args) => args,
        }
    }

    #[test]
    fn test_parse_fetch() {
        let args = fetch_args(&["patience", "fetch", "https://example.com", "-a", "5"]);
        assert_eq!(args.url, "https://example.com");
        assert_eq!(args.attempts, Some(5));
        assert_eq!(args.fallback_secs, None);
        assert!(!args.body);
    }

    #[test]
    fn test_missing_url_is_rejected() {
        assert!(Cli::try_parse_from(["patience", "fetch"]).is_err());
    }

    #[test]
    fn test_overrides_replace_config() {
        let args = fetch_args(&[
            "patience",
            "fetch",
            "https://example.com",
            "--attempts",
            "0",
            "--fallback-secs",
            "7",
        ]);
        let config = apply_overrides(RetryConfig::default(), &args);
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.fallback, FallbackConfig::Fixed { secs: 7 });
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let args = fetch_args(&["patience", "fetch", "https://example.com"]);
        let config = apply_overrides(RetryConfig::default(), &args);
        assert_eq!(config, RetryConfig::default());
    }
}
