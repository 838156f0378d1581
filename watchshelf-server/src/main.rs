//! # watchshelf
//!
//! Keeps a media library in step with a Simkl account: imports list entries
//! as folders and stub videos, and records finished playbacks.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watchshelf_config::{ConfigLoad, ConfigLoader, ConfigSource, ShelfConfig, load_env_file};
use watchshelf_core::{ExternalIds, ListStatus, PlaybackItem, PlaybackKind};
use watchshelf_server::{AppState, ImportScheduler, create_app};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "watchshelf")]
#[command(about = "Simkl watchlist importer and scrobble reconciler")]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(long, global = true, env = "WATCHSHELF_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// `.env` file to load before reading the configuration
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API and run scheduled imports (default)
    Serve(ServeArgs),
    /// Run one import and print the result as JSON
    Import(ImportArgs),
    /// Record a finished playback
    Scrobble(ScrobbleArgs),
    /// List the configured host libraries
    Libraries,
}

#[derive(ClapArgs, Debug, Clone, Default)]
struct ServeArgs {
    /// Bind address (overrides config)
    #[arg(long, env = "WATCHSHELF_BIND")]
    bind: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
struct ImportArgs {
    /// List status to import instead of the configured one
    #[arg(long)]
    status: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
struct ScrobbleArgs {
    /// Path of the played file
    #[arg(long)]
    path: PathBuf,

    /// movie, series or episode
    #[arg(long)]
    kind: PlaybackKind,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    series_title: Option<String>,

    #[arg(long)]
    year: Option<i32>,

    #[arg(long)]
    tmdb: Option<String>,

    #[arg(long)]
    imdb: Option<String>,

    #[arg(long)]
    tvdb: Option<String>,

    #[arg(long)]
    season: Option<u32>,

    #[arg(long)]
    episode: Option<u32>,
}

impl ScrobbleArgs {
    fn into_item(self) -> PlaybackItem {
        PlaybackItem {
            kind: self.kind,
            path: self.path,
            title: self.title,
            series_title: self.series_title,
            year: self.year,
            season: self.season,
            episode: self.episode,
            ids: ExternalIds {
                simkl: None,
                tmdb: self.tmdb,
                tvdb: self.tvdb,
                imdb: self.imdb,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_file_loaded = load_env_file(cli.env_file.as_deref())?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if env_file_loaded {
        info!("loaded .env file");
    }

    let config = load_config(cli.config)?;

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => run_server(config, args).await,
        Command::Import(args) => run_import(config, args).await,
        Command::Scrobble(args) => run_scrobble(config, args).await,
        Command::Libraries => run_libraries(config).await,
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<ShelfConfig> {
    let mut loader = ConfigLoader::from_env();
    if let Some(path) = path {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        config,
        source,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    match &source {
        ConfigSource::Default => info!("no config file found, using defaults"),
        ConfigSource::EnvInline => info!("config loaded from inline environment json"),
        ConfigSource::EnvPath(path) | ConfigSource::File(path) => {
            info!(path = %path.display(), "config loaded from file")
        }
    }

    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => warn!(message = %warning.message, hint = %hint, "configuration warning"),
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(config)
}

async fn run_server(mut config: ShelfConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let state = AppState::from_config(&config).await?;
    let shutdown = CancellationToken::new();

    let scheduler = ImportScheduler::from_config(state.import_job(&config), &config.schedule)
        .map(|scheduler| scheduler.spawn(shutdown.clone()));

    let app = create_app(state);
    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    info!("Server listening on http://{}", config.server.bind);

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", err);
            }
            info!("Shutdown signal received");
            signal.cancel();
        })
        .await
        .context("server error")?;

    shutdown.cancel();
    if let Some(handle) = scheduler
        && let Err(err) = handle.await
    {
        warn!("Import scheduler task failed: {}", err);
    }

    Ok(())
}

async fn run_import(config: ShelfConfig, args: ImportArgs) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).await?;
    let mut settings = (*state.settings).clone();
    if let Some(status) = args.status.as_deref() {
        settings.list_status = ListStatus::parse_lenient(status);
    }

    let shutdown = CancellationToken::new();
    let cancel = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let progress = |percent: f64| info!(percent, "Import progress");
    let result = state
        .orchestrator
        .import_with(&settings, &shutdown, &progress)
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        anyhow::bail!(result.error.unwrap_or_else(|| "import failed".to_string()));
    }
    Ok(())
}

async fn run_scrobble(config: ShelfConfig, args: ScrobbleArgs) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).await?;
    let token = state
        .orchestrator
        .tokens()
        .current()
        .await
        .context("no Simkl user token configured")?;

    let (success, item) = state
        .reconciler
        .reconcile_scrobble(args.into_item(), &token)
        .await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "success": success, "item": item }))?
    );
    Ok(())
}

async fn run_libraries(config: ShelfConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).await?;
    let libraries = state
        .orchestrator
        .host()
        .list_configured_libraries()
        .await?;
    println!("{}", serde_json::to_string_pretty(&libraries)?);
    Ok(())
}
