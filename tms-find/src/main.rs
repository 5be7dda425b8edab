//! tms-find - Transcript search tool
//!
//! Searches a transcript file (one `speaker: text` block per line), prints it
//! with every match highlighted and the current match emphasized, and can
//! replace matches in place or follow the file while it is being edited.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tms_common::config::TomlConfig;
use tms_common::{SearchOptions, Transcript};
use tms_find::follow::{follow, FollowSettings};
use tms_find::render::{render, OutputFormat};
use tms_find::replace::replace_in_file;
use tms_find::FindRequest;

/// Command-line arguments for tms-find
#[derive(Parser, Debug)]
#[command(name = "tms-find")]
#[command(about = "Search and highlight a transcript")]
#[command(version)]
struct Args {
    /// Transcript file (one `speaker: text` block per line)
    file: PathBuf,

    /// Text (or pattern, with --regex) to search for
    query: String,

    /// Match case exactly
    #[arg(short = 'c', long)]
    case_sensitive: bool,

    /// Only match whole words
    #[arg(short = 'w', long)]
    whole_word: bool,

    /// Treat the query as a regular expression
    #[arg(short = 'r', long)]
    regex: bool,

    /// 0-based index of the current match
    #[arg(long, default_value_t = 0)]
    current: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Mark matches with [..] and {..} instead of ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Replace matches with this text and write the file back
    #[arg(long, conflicts_with = "follow")]
    replace: Option<String>,

    /// With --replace, replace every match instead of only the first
    #[arg(long, requires = "replace")]
    all: bool,

    /// Keep running and re-render whenever the file changes
    #[arg(long)]
    follow: bool,

    /// Configuration file (overrides TMS_CONFIG and the platform default)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    /// Command-line flags switch options on over the configured defaults
    fn search_options(&self, defaults: SearchOptions) -> SearchOptions {
        SearchOptions {
            case_sensitive: defaults.case_sensitive || self.case_sensitive,
            whole_word: defaults.whole_word || self.whole_word,
            use_regex: defaults.use_regex || self.regex,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Logs go to stderr so rendered output on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_ascii_lowercase())),
        )
        .init();

    info!(
        "Starting tms-find v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Config is loaded before logging exists, so its source is reported here
    match source.path() {
        Some(path) => info!("Configuration: {}", path.display()),
        None => warn!("No config file found, using built-in defaults"),
    }

    let request = FindRequest {
        query: args.query.clone(),
        options: args.search_options(config.search),
        current: args.current,
    };

    if let Some(replacement) = &args.replace {
        let count = replace_in_file(&args.file, &request, replacement, args.all).await?;
        println!("Replaced {} occurrence(s) of '{}'", count, request.query);
        return Ok(());
    }

    if args.follow {
        let settings = FollowSettings::from(&config);
        let format = args.format;
        let color = !args.no_color;
        let path = args.file.clone();

        return follow(
            &args.file,
            settings,
            move |content: String| {
                let transcript = Transcript::parse(&content);
                match render(&transcript, &request, format, color) {
                    Ok(output) => print_update(&path, &output),
                    Err(e) => error!("Failed to render {}: {:#}", path.display(), e),
                }
            },
            shutdown_signal(),
        )
        .await;
    }

    let content = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let transcript = Transcript::parse(&content);

    let output = render(&transcript, &request, args.format, !args.no_color)?;
    print!("{}", output);

    Ok(())
}

/// Print one follow-mode frame
fn print_update(path: &std::path::Path, output: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "=== {} ===", path.display());
    let _ = write!(stdout, "{}", output);
    let _ = stdout.flush();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
