use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use toon_codec::store::UserStore;

#[derive(Parser)]
#[command(name = "toon-server", about = "User CRUD service speaking TOON and JSON")]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080", env = "TOON_ADDR")]
    addr: SocketAddr,

    /// Start with an empty store instead of the demo users.
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let store = if cli.no_seed {
        UserStore::new()
    } else {
        UserStore::seeded()
    };
    tracing::info!(users = store.len(), "store ready");

    toon_codec::server::serve(cli.addr, Arc::new(store))
        .await
        .with_context(|| format!("serving on {}", cli.addr))
}
