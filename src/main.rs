use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use newsdesk::api::{FetchRequest, NewsClient};
use newsdesk::app::{App, AppEvent, FetchKind};
use newsdesk::config::Config;
use newsdesk::render::{DisplayFragment, Renderer};
use newsdesk::settings::SettingsStore;
use newsdesk::storage::{FileStore, KeyValueStore, MemoryStore};
use newsdesk::ui;

/// Get the config directory path (~/.config/newsdesk/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("newsdesk"))
}

fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "newsdesk", version, about = "Terminal news reader for the /apps/news backend")]
struct Args {
    /// Backend base URL (overrides config)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Config file (default: ~/.config/newsdesk/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep settings in memory only
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one category and print it
    Fetch {
        /// Category (default: the saved default category)
        #[arg(long)]
        category: Option<String>,

        /// Search term
        #[arg(long)]
        search: Option<String>,

        /// Alternate source URL
        #[arg(long, value_name = "URL")]
        source: Option<String>,

        /// Print the HTML fragment instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Admin: print a source record as JSON
    Source { id: String },
    /// Admin: import a base64 payload
    Import { data: String },
}

fn init_tracing_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Logs go to a file while the TUI owns the terminal.
fn init_tracing_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory '{}'", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file '{}'", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));

    // Subscriber first, so warnings from Config::load are recorded
    if args.command.is_some() {
        init_tracing_stderr();
    } else {
        let log_path = Config::log_file_hint(&config_path)
            .unwrap_or_else(|| config_dir.join("newsdesk.log"));
        init_tracing_file(&log_path)?;
    }

    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    let store: Arc<dyn KeyValueStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        ensure_config_dir(&config_dir)?;
        Arc::new(FileStore::new(config_dir.join("settings.json")))
    };
    let settings_store = SettingsStore::new(store);

    let client = NewsClient::new(&config.base_url)
        .with_context(|| format!("Invalid backend URL '{}'", config.base_url))?;
    let renderer = Renderer::new(&config.date_format);

    tracing::info!(base_url = %client.base_url(), "Starting newsdesk");

    match args.command {
        Some(Command::Fetch {
            category,
            search,
            source,
            html,
        }) => {
            let category = category.unwrap_or_else(|| settings_store.load().default_category);
            let mut request = FetchRequest::new(category);
            if let Some(term) = search.as_deref() {
                request = request.with_search(term);
            }
            if let Some(url) = source.as_deref() {
                request = request.with_source(url);
            }
            let kind = if request.is_search() {
                FetchKind::Search
            } else {
                FetchKind::Browse
            };

            let (fragment, failed) = match client.fetch_articles(&request).await {
                Ok(articles) => (renderer.render(&articles), false),
                Err(e) => (
                    DisplayFragment::error(kind.failure_headline(), e.to_string()),
                    true,
                ),
            };
            if html {
                println!("{}", fragment.to_html());
            } else {
                println!("{}", fragment.to_plain_text());
            }
            if failed {
                std::process::exit(1);
            }
        }
        Some(Command::Source { id }) => {
            let source = client.fetch_source(&id).await?;
            println!("{}", serde_json::to_string_pretty(&source)?);
        }
        Some(Command::Import { data }) => {
            let count = client.import_data(&data).await?;
            println!("Import successful! {count} items imported.");
        }
        None => {
            let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
            let mut app = App::new(
                client,
                settings_store,
                renderer,
                config.categories.clone(),
                event_tx,
            );
            ui::run(&mut app, event_rx).await?;
        }
    }

    Ok(())
}
