use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_site::{
    config::{Cli, Command},
    export::export,
    server::serve,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.config();
    match cli.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(config, cli.addr()).await,
        Command::Export { out_dir } => {
            let report = export(&config, &out_dir).await?;
            info!(pages = report.pages, assets = report.assets, "Site exported to {}", out_dir.display());
            Ok(())
        }
    }
}
