//! MarketMind Server
//!
//! Runs the MarketMind prompt-routing API as a standalone HTTP server.

use anyhow::{Context, Result};
use clap::Parser;
use marketmind::{run_server, AppConfig};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "marketmind-server")]
#[command(about = "MarketMind API - sales and marketing assistant over Gemini and Groq")]
struct Args {
    /// Server host
    #[arg(long, default_value = "0.0.0.0", env = "MARKETMIND_HOST")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = 8000, env = "MARKETMIND_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads its env fallbacks
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,marketmind=debug")),
        )
        .init();

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }

    let args = Args::parse();

    let config = AppConfig::from_env().context("Refusing to start")?;

    info!("Starting MarketMind API");
    run_server(config, &args.host, args.port).await
}
