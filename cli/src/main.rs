mod config;
mod terminal;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use animal_core::{
    render, Animal, AnimalApi, AnimalClient, AnimalStore, ApiError, IdRange, ListScreen, Transport, UreqTransport,
};
use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Config, ConfigError, URL_ENV};
use terminal::LinePrompt;

#[derive(Debug, Parser)]
#[command(name = "animal-list", version, about = "List, add, rename and delete animals on a remote server")]
struct Cli {
    /// Config file (default: <config dir>/animal-list/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Server root or collection URL; overrides config and ANIMAL_API_URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Only surface delete and update failures
    #[arg(long)]
    legacy_errors: bool,

    /// Run one operation and exit; without one, start the interactive list
    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Print the current list
    List,
    /// Add an animal
    Add {
        name: String,
        /// Use this id instead of a random one from the configured range
        #[arg(long)]
        id: Option<i64>,
    },
    /// Rename the animal with ID
    Rename { id: i64, name: String },
    /// Delete the animal with ID
    Delete { id: i64 },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Name cannot be empty")]
    EmptyName,
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };
    let result = runtime.block_on(run(cli));
    // Requests still stuck on the network must not keep the process alive.
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(std::env::var(URL_ENV).ok(), cli.base_url, cli.legacy_errors);
    config.validate()?;
    init_tracing(&config.log_level);
    info!(base_url = %config.base_url, policy = ?config.error_policy, "starting");

    let transport: Arc<dyn Transport> = Arc::new(UreqTransport::new());
    let api = AnimalApi::new(AnimalClient::new(&config.base_url), transport);
    let store = Arc::new(AnimalStore::new(api, config.error_policy));

    match cli.action {
        Some(action) => {
            run_once(&store, config.id_range, action).await?;
            print!("{}", render::render(&store.snapshot()));
        }
        None => {
            let mut screen = ListScreen::new(store, config.id_range);
            let mut prompt = LinePrompt::new(io::BufReader::new(io::stdin()), io::stdout());
            let failed = terminal::run_interactive(&mut screen, &mut prompt).await;
            info!(failed, "session ended");
        }
    }
    Ok(())
}

/// Load the list, then apply `action`. Load failures abort before any write.
async fn run_once(store: &AnimalStore, ids: IdRange, action: Action) -> Result<(), CliError> {
    store.refresh().await?;
    match action {
        Action::List => {}
        Action::Add { name, id } => {
            let name = non_empty(&name)?;
            let id = id.unwrap_or_else(|| ids.generate());
            store.add(Animal::new(id, name)).await?;
        }
        Action::Rename { id, name } => {
            let name = non_empty(&name)?;
            store.rename(id, name).await?;
        }
        Action::Delete { id } => store.remove(id).await?,
    }
    Ok(())
}

fn non_empty(name: &str) -> Result<&str, CliError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::EmptyName);
    }
    Ok(name)
}
