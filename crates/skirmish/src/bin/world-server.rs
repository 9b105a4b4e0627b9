//! Tile strategy server.
//!
//! Hosts one match on a 16x16 map for up to eight players and exits once a
//! single base is left standing.

use clap::Parser;
use skirmish::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,
    /// Port to listen on
    #[arg(short, long, default_value_t = 12345)]
    port: u16,
    /// Seed for map generation and world events. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), SkirmishError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = WorldConfig {
        seed: args.seed,
        ..WorldConfig::default()
    };
    let server = SkirmishServer::<World>::builder()
        .bind(&format!("{}:{}", args.host, args.port))
        .build(config)
        .await?;
    server.run().await
}
