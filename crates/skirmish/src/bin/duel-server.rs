//! Two-player number guessing server.
//!
//! Pairs the first two connections into a duel and starts a new one five
//! seconds after each result.

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
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), SkirmishError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let server = SkirmishServer::<Duel>::builder()
        .bind(&format!("{}:{}", args.host, args.port))
        .build(())
        .await?;
    server.run().await
}
