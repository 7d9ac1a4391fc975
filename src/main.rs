//! devcamper - bootcamp directory API server

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use devcamper::config::AppConfig;
use devcamper::server::{ServerBuilder, serve_router};
use devcamper::storage::{Collections, seed};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Bootcamp directory API
#[derive(Parser, Debug)]
#[command(name = "devcamper")]
#[command(version, about = "REST backend for bootcamps, courses and their publishers", long_about = None)]
struct Args {
    /// YAML configuration file; environment variables override it
    #[arg(short, long, global = true, env = "DEVCAMPER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Import bootcamps from a JSON file before serving
        #[arg(long, value_name = "FILE")]
        seed: Option<PathBuf>,
    },
    /// Import bootcamps from a JSON file
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Delete all bootcamps, courses and users
    Destroy,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    info!(environment = %config.environment, "configuration loaded");

    let addr = config.bind_address();
    let collections = open_collections(&config).await?;
    let (host, app) = ServerBuilder::new(config)
        .with_collections(collections)
        .build_with_host()?;

    match args.command.unwrap_or(Command::Serve { seed: None }) {
        Command::Serve { seed } => {
            if let Some(file) = seed {
                import(&host, &file).await?;
            }
            serve_router(app, &addr).await?;
        }
        Command::Import { file } => import(&host, &file).await?,
        Command::Destroy => {
            let removed = seed::destroy(&host).await?;
            info!("Data has been destroyed ({} documents)", removed);
        }
    }

    Ok(())
}

async fn import(host: &devcamper::server::ServerHost, file: &Path) -> Result<()> {
    let count = seed::import_bootcamps_file(host, file).await?;
    info!("Imported {} bootcamps from {}", count, file.display());
    Ok(())
}

#[cfg(feature = "mongodb_backend")]
async fn open_collections(config: &AppConfig) -> Result<Collections> {
    match &config.database.uri {
        Some(uri) => Ok(Collections::mongodb(uri, &config.database.name)
            .await
            .context("connecting to MongoDB")?),
        None => {
            warn!("no database URI configured, using in-memory storage");
            Ok(Collections::in_memory())
        }
    }
}

#[cfg(not(feature = "mongodb_backend"))]
async fn open_collections(config: &AppConfig) -> Result<Collections> {
    if config.database.uri.is_some() {
        warn!("database URI ignored: built without the mongodb_backend feature");
    }
    Ok(Collections::in_memory())
}
