//! guestbookd — the guestbook comment daemon.
//!
//! # Usage
//!
//! ```text
//! guestbookd serve --config guestbook.toml --bind 0.0.0.0:8787
//! guestbookd serve --backend memory
//! guestbookd init-db --database-url sqlite://guestbook.db
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use guestbook_core::GuestbookConfig;
use guestbook_core::config::BackendKind;

#[derive(Parser)]
#[command(name = "guestbookd", about = "Guestbook comment API daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Memory,
    Sqlite,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Memory => BackendKind::Memory,
            BackendArg::Sqlite => BackendKind::Sqlite,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Serve the comment API.
    Serve {
        /// Path to guestbook.toml.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Address to listen on.
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Comment backend.
        #[arg(long, value_enum)]
        backend: Option<BackendArg>,

        /// SQLite database URL (overrides DATABASE_URL and the config file).
        #[arg(long)]
        database_url: Option<String>,
    },
    /// Create the comment table and indexes, then exit.
    InitDb {
        /// Path to guestbook.toml.
        #[arg(long)]
        config: Option<PathBuf>,

        /// SQLite database URL (overrides DATABASE_URL and the config file).
        #[arg(long)]
        database_url: Option<String>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GuestbookConfig> {
    let mut config = match path {
        Some(path) => GuestbookConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GuestbookConfig::default(),
    };
    config.apply_env();
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            bind,
            backend,
            database_url,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(backend) = backend {
                config.storage.backend = backend.into();
            }
            if let Some(url) = database_url {
                config.storage.url = url;
            }
            guestbookd::init_tracing(config.log.format);
            guestbookd::serve(&config).await
        }
        Command::InitDb {
            config,
            database_url,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(url) = database_url {
                config.storage.url = url;
            }
            guestbookd::init_tracing(config.log.format);
            guestbookd::init_database(&config).await
        }
    }
}
