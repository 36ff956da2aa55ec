use anyhow::Context;
use bcached_server::{Server, ServerConfigLoader};
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod args;

use args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --log-level and --debug
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.level()).into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(filter)
        .init();

    let config = ServerConfigLoader::load(args.config.as_deref(), args.layer())
        .context("failed to load configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        address = %config.address(),
        data_dir = %config.data_dir.display(),
        shards = config.shards,
        "starting bcached"
    );
    info!(sources = ?config.sources, "configuration loaded");

    let server = Server::bind(config)
        .await
        .context("failed to start server")?;
    server.serve().await?;

    Ok(())
}
