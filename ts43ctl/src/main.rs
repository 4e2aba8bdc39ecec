mod app;
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ts43_config::{ConfigLoad, ConfigLoader};

use crate::app::App;
use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let ConfigLoad {
        config,
        source,
        dotenv_path,
    } = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ts43_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = dotenv_path {
        info!(path = %path.display(), "loaded .env file");
    }
    info!(source = ?source, "configuration source");

    let app = App::new(config).await?;
    match cli.command {
        Command::Query { target, json } => app.query(target.id(), json).await,
        Command::Poll { target, wait } => app.poll(target.id(), wait).await,
        Command::Show { target } => app.show(target.id()).await,
        Command::Reset { target } => app.reset(target.id()).await,
    }
}
