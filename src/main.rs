use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use optin_modal::config::{self, KeyResolver};

use crate::app::App;

mod app;
mod cli;
mod theme;
mod tui;
mod view;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting optin-modal");

    let args = cli::Args::parse();

    let config = match &args.config {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    };
    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme_name = args.theme.as_deref().unwrap_or(&config.theme.name);
    let theme = theme::theme_from_name(theme_name);

    let mut app = App::new(&config, resolver, theme);
    if args.open {
        app.open_dialog();
    }
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("optin-modal").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "optin-modal.log");
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
