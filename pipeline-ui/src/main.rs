//! pipeline-ui - render pipeline tracker web server
//!
//! Resolves the root folder, opens (and migrates) the database inside it and
//! serves the HTML pages and JSON endpoints.

use anyhow::Result;
use clap::Parser;
use pipeline_common::config::{
    RootFolderInitializer, RootFolderResolver, TomlConfig, DEFAULT_HOST, DEFAULT_PORT,
};
use pipeline_common::db::init_database;
use pipeline_ui::api::buildinfo::BUILD_INFO;
use pipeline_ui::{build_router, AppState};
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "pipeline-ui")]
#[command(about = "Render pipeline tracker", long_about = None)]
#[command(version)]
struct Args {
    /// Root folder holding pipeline.db and the images directory
    #[arg(short, long, env = "PIPELINE_ROOT")]
    root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PIPELINE_PORT")]
    port: Option<u16>,

    /// Host address to bind
    #[arg(long, env = "PIPELINE_HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification before anything that can stall
    info!("Starting pipeline-ui {}", BUILD_INFO.summary());

    let args = Args::parse();
    let toml_config = TomlConfig::load();

    let root_folder = RootFolderResolver::new(args.root_folder, toml_config.clone()).resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let images_dir = initializer.images_path();
    info!("Images directory: {}", images_dir.display());

    let state = AppState::new(pool, images_dir);
    let app = build_router(state);

    let host = args
        .host
        .or_else(|| toml_config.as_ref().and_then(|c| c.host.clone()))
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = args
        .port
        .or_else(|| toml_config.as_ref().and_then(|c| c.port))
        .unwrap_or(DEFAULT_PORT);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("pipeline-ui listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
