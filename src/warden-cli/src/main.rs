//! Warden - authorization pipeline binary.
//!
//! Reads inbound messages as JSON lines on stdin and writes notices and
//! outcomes as JSON lines on stdout. Exits with a failure status when the
//! pipeline halts on a configuration fault.

mod records;
mod serve;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use warden_pipeline::{
    AlreadyInstalled, AuthorizationPipeline, Installer, MarkerFileInstaller, PipelineConfig,
    TokenBucketLimiter,
};
use warden_store::{MemoryStore, Seed};

use crate::records::ChannelNotifier;

/// How long an idle rate limiter bucket is kept.
const BUCKET_TTL: Duration = Duration::from_secs(3600);

/// Warden authorization pipeline
#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Authorize inbound bot messages against roles and settings")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "WARDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Seed file with roles, users, permissions and settings
    #[arg(short, long, env = "WARDEN_SEED")]
    seed: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries records, logs go to stderr
    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    config.apply_env().context("invalid environment override")?;
    Ok(config)
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let seed = Seed::load(&args.seed).await?;
    let store = MemoryStore::from_seed(seed).await?;

    let installer: Arc<dyn Installer> = match &config.install_marker {
        Some(marker) => Arc::new(MarkerFileInstaller::new(
            marker,
            config.messages.setup_required.clone(),
        )),
        None => Arc::new(AlreadyInstalled),
    };

    let limiter = Arc::new(TokenBucketLimiter::new(config.rate_limit));
    let cleanup = limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(BUCKET_TTL);
        loop {
            interval.tick().await;
            cleanup.cleanup(BUCKET_TTL).await;
        }
    });

    let (tx, rx) = mpsc::unbounded_channel();
    let pipeline = AuthorizationPipeline::new(Arc::new(store), Arc::new(ChannelNotifier::new(tx)), config)
        .with_installer(installer)
        .with_rate_limiter(limiter);

    info!("Reading messages from stdin");
    serve::serve(
        Arc::new(pipeline),
        rx,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    setup_logging(&args.log_level, args.json_logs);

    tokio::select! {
        result = run(args) => match result {
            Ok(()) => {
                info!("Warden stopped");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            ExitCode::SUCCESS
        }
    }
}
