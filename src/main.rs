// src/main.rs — Botify entry point

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use botify::backend::HttpBackend;
use botify::chat::ChatStore;
use botify::cli::{commands, render, Cli, Commands};
use botify::infra::config::Config;
use botify::infra::logger;
use botify::storage::{FileStorage, MemoryStorage, SessionStorage};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging (respects RUST_LOG)
    logger::init_logging(if cli.verbose { "debug" } else { "warn" });

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    // Dispatch subcommands that don't need the backend
    if let Some(Commands::Home) = cli.command {
        botify::cli::home::show_home();
        return Ok(());
    }

    let store = init_store(&cli, &config)?;

    match cli.command {
        None | Some(Commands::Chat) | Some(Commands::Home) => {
            botify::cli::chat::run_chat(store).await
        }
        Some(Commands::New) => commands::run_new(store).await,
        Some(Commands::Chats) => commands::run_chats(&store),
        Some(Commands::Switch { ref id }) => commands::run_switch(store, id).await,
        Some(Commands::Send { health, ref text }) => {
            commands::run_send(store, &text.join(" "), health).await
        }
        Some(Commands::Upload { ref path }) => commands::run_upload(store, path).await,
        Some(Commands::Sos { ref location, yes }) => {
            commands::run_sos(store, location.as_deref(), yes).await
        }
    }
}

/// Wire the store to the HTTP backend, session storage and terminal renderer.
fn init_store(cli: &Cli, config: &Config) -> anyhow::Result<ChatStore> {
    let base_url = config.backend_url(cli.backend.as_deref())?;
    tracing::debug!("Using backend {}", base_url);

    let backend = HttpBackend::with_connect_timeout(
        base_url,
        Duration::from_secs(config.backend.connect_timeout_secs),
    )?;

    let storage: Box<dyn SessionStorage> = if cli.ephemeral {
        Box::new(MemoryStorage::new())
    } else {
        let path = config.storage_path();
        tracing::debug!("Session storage at {}", path.display());
        Box::new(FileStorage::open(path))
    };

    Ok(ChatStore::new(Arc::new(backend), storage).with_observer(render::terminal_renderer()))
}
