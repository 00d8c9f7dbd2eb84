//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `pikephish` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use pikephish::config::{
    CLASSIFIER_TIMEOUT_SECS, DB_PATH, DEFAULT_CLASSIFIER_URL, DEFAULT_HISTORY_LIMIT,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_USER_AGENT, FETCH_CONNECT_TIMEOUT_SECS,
    FETCH_READ_TIMEOUT_SECS,
};
use pikephish::initialization::{init_crypto_provider, init_logger_with};
use pikephish::{
    init_resources, observe_urls, open_store, CheckOutcome, CheckSource, Config,
    DuplicatePolicy, HistoryRecord, LogFormat, LogLevel, TrustedDomains, VerdictOrigin,
    WhitelistPolicy,
};

#[derive(Debug, Parser)]
#[command(
    name = "pikephish",
    version,
    about = "Assess URLs for phishing using HTTP, DNS, TLS and HTML signals and a remote classifier"
)]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalOptions {
    /// Log level: error, warn, info, debug or trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    /// Log format: plain or json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    log_format: LogFormat,

    /// History database path
    #[arg(long, env = "PIKEPHISH_DB_PATH", default_value = DB_PATH, global = true)]
    db_path: PathBuf,

    /// Base URL of the classification service
    #[arg(long, env = "PIKEPHISH_CLASSIFIER_URL", default_value = DEFAULT_CLASSIFIER_URL, global = true)]
    classifier_url: String,

    /// History rows kept after each successful check
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT, global = true)]
    history_limit: u32,

    /// Page fetch connect timeout in seconds
    #[arg(long, default_value_t = FETCH_CONNECT_TIMEOUT_SECS, global = true)]
    fetch_connect_timeout_seconds: u64,

    /// Page fetch read timeout in seconds
    #[arg(long, default_value_t = FETCH_READ_TIMEOUT_SECS, global = true)]
    fetch_read_timeout_seconds: u64,

    /// Classifier request timeout in seconds
    #[arg(long, default_value_t = CLASSIFIER_TIMEOUT_SECS, global = true)]
    classifier_timeout_seconds: u64,

    /// User-Agent sent with page fetches
    #[arg(long, default_value = DEFAULT_USER_AGENT, global = true)]
    user_agent: String,

    /// Whether trusted domains skip extraction and classification
    #[arg(long, value_enum, default_value_t = WhitelistPolicy::Ignore, global = true)]
    whitelist_policy: WhitelistPolicy,

    /// Extra trusted domain (repeatable)
    #[arg(long = "trust", value_name = "DOMAIN", global = true)]
    trusted_domains: Vec<String>,

    /// How a new verdict for an already stored URL is written
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Append, global = true)]
    duplicate_policy: DuplicatePolicy,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check one URL (uses the history as a cache)
    Check {
        /// URL or bare host to check
        url: String,
    },
    /// Scan one URL and print its feature record as JSON, without classifying
    Features {
        /// URL or bare host to scan
        url: String,
    },
    /// Show stored verdicts, newest first
    History {
        /// Show every stored verdict
        #[arg(long, conflicts_with = "limit")]
        all: bool,
        /// Number of verdicts to show
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Delete one stored verdict by id
    Delete {
        /// Row id as shown by `history`
        id: i64,
    },
    /// Delete every stored verdict
    Clear,
    /// Check observed URLs in the background, reporting only phishing
    Watch {
        /// File with one observed string per line; `-` or omitted reads stdin
        input: Option<PathBuf>,
        /// Maximum concurrent checks
        #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
        max_concurrency: usize,
    },
}

impl GlobalOptions {
    fn to_config(&self, max_concurrency: usize) -> Config {
        Config {
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            db_path: self.db_path.clone(),
            classifier_url: self.classifier_url.clone(),
            history_limit: self.history_limit,
            fetch_connect_timeout_seconds: self.fetch_connect_timeout_seconds,
            fetch_read_timeout_seconds: self.fetch_read_timeout_seconds,
            classifier_timeout_seconds: self.classifier_timeout_seconds,
            user_agent: self.user_agent.clone(),
            max_concurrency,
            whitelist_policy: self.whitelist_policy,
            duplicate_policy: self.duplicate_policy,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    init_logger_with(cli.options.log_level.clone().into(), cli.options.log_format.clone())
        .context("Failed to initialize logger")?;
    init_crypto_provider();

    if let Err(e) = run(cli).await {
        eprintln!("pikephish error: {e:#}");
        process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let max_concurrency = match &cli.command {
        Command::Watch {
            max_concurrency, ..
        } => *max_concurrency,
        _ => DEFAULT_MAX_CONCURRENCY,
    };
    let config = cli.options.to_config(max_concurrency);
    let trust = Arc::new(TrustedDomains::with_custom(&cli.options.trusted_domains));

    match cli.command {
        Command::Check { url } => {
            let resources = init_resources(&config, trust).await?;
            let result = resources
                .checker
                .check_url(&url, CheckSource::Manual)
                .await;
            resources.shutdown().await;
            print_outcome(&result?);
        }
        Command::Features { url } => {
            let resources = init_resources(&config, trust).await?;
            let target = pikephish::normalize(&url);
            let record = resources.checker.pipeline().scan(&target).await;
            resources.shutdown().await;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::History { all, limit } => {
            let store = open_store(&config).await?;
            let records = if all {
                store.all().await
            } else {
                store.recent(limit.unwrap_or(config.history_limit)).await
            };
            store.close().await;
            print_history(&records?);
        }
        Command::Delete { id } => {
            let store = open_store(&config).await?;
            let deleted = store.delete(id).await;
            store.close().await;
            if deleted? {
                println!("Deleted verdict {id}");
            } else {
                println!("No verdict with id {id}");
            }
        }
        Command::Clear => {
            let store = open_store(&config).await?;
            let removed = store.clear().await;
            store.close().await;
            println!("Removed {} verdict(s)", removed?);
        }
        Command::Watch { input, .. } => {
            let resources = init_resources(&config, trust).await?;
            let reader: Box<dyn tokio::io::AsyncRead + Unpin + Send> = match input {
                Some(path) if path.as_os_str() != "-" => Box::new(
                    tokio::fs::File::open(&path)
                        .await
                        .with_context(|| format!("Failed to open {}", path.display()))?,
                ),
                _ => Box::new(tokio::io::stdin()),
            };
            let lines = futures::stream::unfold(BufReader::new(reader).lines(), |mut lines| async move {
                match lines.next_line().await {
                    Ok(Some(line)) => Some((line, lines)),
                    Ok(None) => None,
                    Err(e) => {
                        log::error!("Failed to read observed input: {e}");
                        None
                    }
                }
            })
            .boxed();
            let summary =
                observe_urls(Arc::clone(&resources.checker), lines, config.max_concurrency).await;
            resources.shutdown().await;
            println!(
                "Observed {} URL(s): {} phishing, {} failed, {} skipped",
                summary.observed, summary.phishing, summary.failed, summary.skipped
            );
        }
    }
    Ok(())
}

fn print_outcome(outcome: &CheckOutcome) {
    let verdict = &outcome.verdict;
    let mark = if verdict.is_phishing { "🚨" } else { "✅" };
    println!(
        "{mark} {} is {} (confidence {:.2})",
        outcome.target, verdict.label, verdict.confidence
    );
    if let Some(reason) = &verdict.reason {
        println!("   reason: {reason}");
    }
    match outcome.origin {
        VerdictOrigin::Cache => println!("   answered from history"),
        VerdictOrigin::Whitelist => println!("   trusted domain, not scanned"),
        VerdictOrigin::Classifier => {}
    }
    if let Some(features) = &outcome.features {
        for error in &features.errors {
            println!("   signal unavailable: {error}");
        }
    }
    if let Some(e) = &outcome.persist_error {
        println!("   warning: verdict not saved to history: {e}");
    }
}

fn print_history(records: &[HistoryRecord]) {
    if records.is_empty() {
        println!("History is empty");
        return;
    }
    for record in records {
        let checked_at = chrono::DateTime::from_timestamp_millis(record.checked_at)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| record.checked_at.to_string());
        println!(
            "{:>5}  {}  {:<10}  {:.2}  {:<10}  {}",
            record.id, checked_at, record.prediction, record.confidence, record.source, record.url
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_defaults() {
        let cli = Cli::try_parse_from(["pikephish", "check", "example.com"]).unwrap();
        assert!(matches!(cli.command, Command::Check { ref url } if url == "example.com"));
        let config = cli.options.to_config(DEFAULT_MAX_CONCURRENCY);
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.whitelist_policy, WhitelistPolicy::Ignore);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Append);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pikephish",
            "check",
            "example.com",
            "--whitelist-policy",
            "skip-trusted",
            "--trust",
            "intranet.corp",
            "--trust",
            "wiki.corp",
            "--history-limit",
            "20",
        ])
        .unwrap();
        assert_eq!(cli.options.whitelist_policy, WhitelistPolicy::SkipTrusted);
        assert_eq!(cli.options.trusted_domains, vec!["intranet.corp", "wiki.corp"]);
        assert_eq!(cli.options.history_limit, 20);
    }

    #[test]
    fn test_history_all_conflicts_with_limit() {
        assert!(Cli::try_parse_from(["pikephish", "history", "--all", "--limit", "3"]).is_err());
        let cli = Cli::try_parse_from(["pikephish", "history", "--limit", "3"]).unwrap();
        assert!(matches!(cli.command, Command::History { all: false, limit: Some(3) }));
    }

    #[test]
    fn test_watch_input_and_concurrency() {
        let cli = Cli::try_parse_from(["pikephish", "watch", "-", "--max-concurrency", "4"]).unwrap();
        match cli.command {
            Command::Watch {
                input,
                max_concurrency,
            } => {
                assert_eq!(input, Some(PathBuf::from("-")));
                assert_eq!(max_concurrency, 4);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_delete_requires_numeric_id() {
        assert!(Cli::try_parse_from(["pikephish", "delete", "abc"]).is_err());
        assert!(Cli::try_parse_from(["pikephish", "delete", "7"]).is_ok());
    }
}
