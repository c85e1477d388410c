use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::HttpWalletClient;
use crate::app::App;
use crate::command::SystemClipboard;
use crate::config::KeyResolver;
use crate::wallet::{CategoryFilter, Wallet};

mod api;
mod app;
mod cli;
mod command;
mod config;
mod faq;
mod screen;
mod search;
mod theme;
mod tui;
mod ui;
mod wallet;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting keywallet");

    let args = cli::Args::parse();

    let mut config = config::load()?;
    if let Some(server) = args.server {
        config.server.base_url = server;
    }
    if let Some(theme) = args.theme {
        config.theme.name = theme;
    }

    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let api = Arc::new(HttpWalletClient::new(&config.server)?);
    let wallet = Wallet::new(
        api,
        Arc::new(SystemClipboard),
        resolver.clone(),
        CategoryFilter::from_cli(args.category),
    );

    let mut app = App::new(wallet, resolver, config.theme.name, &config.server.base_url);
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("keywallet").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "keywallet.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
