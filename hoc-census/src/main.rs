//! hoc-census - census ingestion tool for the Humans-of profile pages
//!
//! Subcommands:
//! - `serve`: admin HTTP API (census upload, single profile, directory)
//! - `ingest`: run a census CSV through the pipeline, write the directory JSON
//! - `add`: ingest one profile from a JSON file of header -> value
//! - `export`: write the current directory JSON without ingesting

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hoc_common::config::{default_config_path, RootFolderInitializer, RootFolderResolver, TomlConfig};
use hoc_common::db::init_database;
use hoc_census::census::{parse_census_csv, RawRow};
use hoc_census::store::SqliteCensusStore;
use hoc_census::{build_router, AppState, CensusPipeline, OutputDirectory};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for hoc-census
#[derive(Parser, Debug)]
#[command(name = "hoc-census")]
#[command(about = "Census ingestion for the Humans-of profile directory")]
#[command(version)]
struct Args {
    /// Root folder holding census.db
    #[arg(short, long, global = true)]
    root_folder: Option<PathBuf>,

    /// TOML config file (defaults to the platform config location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the admin HTTP API
    Serve {
        /// Port to listen on (overrides config file)
        #[arg(short, long, env = "HOC_PORT")]
        port: Option<u16>,
    },
    /// Ingest a census CSV export
    Ingest {
        /// Census CSV file
        csv: PathBuf,
        /// Write the directory JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Ingest a single profile (JSON object keyed by survey headers)
    Add {
        /// Profile JSON file
        profile: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the current directory JSON
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let config = TomlConfig::load_or_default(config_path.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "hoc_census={level},hoc_common={level},tower_http={level}",
                    level = config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting hoc-census v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new("hoc-census")
        .with_config_file(config_path)
        .with_cli_arg(args.root_folder.clone())
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database {}: {}", db_path.display(), e);
            return Err(e).context("Failed to initialize census database");
        }
    };
    let pipeline = CensusPipeline::new(Arc::new(SqliteCensusStore::new(pool)));

    match args.command {
        Command::Serve { port } => serve(pipeline, port.unwrap_or(config.port)).await,
        Command::Ingest { csv, output } => {
            let file = std::fs::File::open(&csv)
                .with_context(|| format!("Failed to open {}", csv.display()))?;
            let rows = parse_census_csv(file)?;
            if rows.is_empty() {
                bail!("{} contains no data rows", csv.display());
            }
            let report = pipeline.ingest_batch(&rows).await?;
            info!(
                "{} profiles processed from {} ({} blank rows skipped). Total {} profiles.",
                report.processed(),
                csv.display(),
                report.skipped,
                report.total_records
            );
            write_directory(&report.directory, output.as_deref())
        }
        Command::Add { profile, output } => {
            let text = std::fs::read_to_string(&profile)
                .with_context(|| format!("Failed to read {}", profile.display()))?;
            let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
                .with_context(|| format!("{} is not a JSON object", profile.display()))?;
            let row = RawRow::from_json_object(object);
            if row.is_blank() {
                bail!("{} contains no values", profile.display());
            }
            let directory = pipeline.process_one(&row).await?;
            write_directory(&directory, output.as_deref())
        }
        Command::Export { output } => {
            let directory = pipeline.directory().await?;
            write_directory(&directory, output.as_deref())
        }
    }
}

async fn serve(pipeline: CensusPipeline, port: u16) -> Result<()> {
    let app = build_router(AppState::new(pipeline));
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("hoc-census listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn write_directory(directory: &OutputDirectory, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(directory)?;
    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote directory ({} profiles) to {}", directory.leaf_count(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
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
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
