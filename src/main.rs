use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fachowiec_pro::config;
use fachowiec_pro::persist::JsonFileAdapter;
use fachowiec_pro::server::{self, AppState};

/// Backend for the Fachowiec Pro small-business manager
#[derive(Parser, Debug)]
#[command(name = "fachowiec-pro", version)]
struct Cli {
    /// Directory holding the JSON collection files (overrides DATA_DIR)
    #[arg(long)]
    data_dir: Option<String>,

    /// Address to bind the HTTP API to (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration, CLI flags win over the environment
    let mut config = config::init()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    tracing::info!(data_dir = %config.data_dir, "opening record store");
    let adapter = Arc::new(JsonFileAdapter::new(&config.data_dir)?);
    let state = AppState::new(adapter)?;

    server::run(state, &config.bind_addr).await
}
