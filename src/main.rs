//! routewise - CLI entry point.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use routewise::audit::TracingAuditSink;
use routewise::router::extract_intent;
use routewise::{
    AuditedInvoker, ChatRequest, HttpInvoker, KeyPool, MessageContent, RouteOutcome,
    RouterConfig, RoutingEngine, UpstreamInvoker,
};

/// Pick a worker model for a chat request using a decision model.
#[derive(Parser, Debug)]
#[command(name = "routewise")]
#[command(about = "Pick a worker model for a chat request using a decision model")]
#[command(version)]
struct Cli {
    /// Path to router config (TOML)
    #[arg(short, long, global = true, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Route a chat request and print the chosen worker
    Route {
        /// Chat request JSON file, or `-` for stdin
        request: PathBuf,

        /// Also print the reasoning or fallback cause
        #[arg(short, long)]
        verbose: bool,

        /// Write an audit record for every upstream call
        #[arg(long)]
        audit: bool,
    },
    /// Print the decision prompt for a chat request without calling upstream
    Prompt {
        /// Chat request JSON file, or `-` for stdin
        request: PathBuf,
    },
    /// List configured workers
    Workers,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("routewise=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = RouterConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    match cli.command {
        Command::Route {
            request,
            verbose,
            audit,
        } => {
            let request = read_request(&request)?;
            let engine = build_engine(config, audit)?;

            match engine.route(&request).await {
                RouteOutcome::Chosen { model, reasoning } => {
                    println!("{}", model);
                    if verbose {
                        eprintln!("Reason: {}", reasoning);
                    }
                }
                RouteOutcome::Fallback { model, reason } => {
                    println!("{}", model);
                    if verbose {
                        eprintln!("Fallback ({}): {}", reason.kind(), reason);
                    }
                }
            }
        }
        Command::Prompt { request } => {
            let request = read_request(&request)?;
            let Some(intent) = extract_intent(&request) else {
                println!(
                    "No user prompt found; routing would use default worker '{}'",
                    config.default_worker
                );
                return Ok(());
            };

            let engine = build_engine(config, false)?;
            for message in engine.decision_request(&intent).messages {
                if let Some(MessageContent::Text(text)) = message.content {
                    println!("{}", text);
                }
            }
        }
        Command::Workers => {
            for worker in &config.workers {
                let marker = if worker.name == config.default_worker { " (default)" } else { "" };
                println!("{}{}: {}", worker.name, marker, worker.description);
            }
            if !config.is_worker(&config.default_worker) {
                println!("{} (default, not routable)", config.default_worker);
            }
        }
    }

    Ok(())
}

/// Composition root: one engine with its collaborators.
fn build_engine(config: RouterConfig, audit: bool) -> Result<RoutingEngine> {
    let credentials = Arc::new(KeyPool::new(
        config.api_keys.clone(),
        config.max_key_failures,
    ));

    let http = HttpInvoker::new(config.base_url.clone()).context("Failed to create HTTP client")?;
    let upstream: Arc<dyn UpstreamInvoker> = if audit {
        Arc::new(AuditedInvoker::new(Arc::new(http), Arc::new(TracingAuditSink)))
    } else {
        Arc::new(http)
    };

    RoutingEngine::new(Arc::new(config), credentials, upstream).context("Invalid router config")
}

/// Read a chat request from a file, or stdin when the path is `-`.
fn read_request(path: &Path) -> Result<ChatRequest> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request {}", path.display()))?
    };

    serde_json::from_str(&raw).context("Request is not a valid chat request")
}
