//! Binary TCP server for the blockade session protocol.

use anyhow::Result;
use blockade_server::config::Config;
use blockade_server::server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    server::run(config).await
}
