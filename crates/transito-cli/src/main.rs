use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use transito_infrastructure::AppConfig;
use transito_infrastructure::config::BOT_TOKEN_ENV;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "transito")]
#[command(about = "Transit reporting bot for filling lines", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config dir)
    #[arg(long, global = true, env = "TRANSITO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot until interrupted
    Run,
    /// Print the label a line would get right now
    Label {
        /// Filling line code, e.g. M1
        line: String,
        product: String,
        size: String,
        market: String,
    },
    /// Inspect or edit the SKU catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// List the combos assigned in a chat
    Combos {
        #[arg(allow_negative_numbers = true)]
        chat: i64,
    },
    /// Validate the configuration and catalog
    Check,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List every catalog entry
    List,
    /// Create or replace an entry
    Set {
        /// Catalog key in product|size|market form
        key: String,
        #[arg(long)]
        sku: String,
        /// Shelf life in months
        #[arg(long)]
        shelf_life: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = AppConfig::resolve_path(cli.config.as_deref())
        .context("Failed to locate configuration")?;
    let config = AppConfig::load(Some(&config_path)).context("Failed to load configuration")?;
    let _log_guard = logging::init(&config.data_dir());
    if config_path.exists() {
        info!(path = %config_path.display(), "Loaded configuration");
    } else {
        info!(path = %config_path.display(), "No config file, using defaults");
    }

    let token = std::env::var(BOT_TOKEN_ENV)
        .ok()
        .filter(|token| !token.trim().is_empty());
    if token.is_none() {
        warn!("{BOT_TOKEN_ENV} is not set; the bot cannot connect to Telegram");
    }

    match cli.command {
        Commands::Run => commands::run::execute(&config, token).await?,
        Commands::Label {
            line,
            product,
            size,
            market,
        } => commands::label::execute(&config, &line, product, size, market).await?,
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list(&config).await?,
            CatalogAction::Set {
                key,
                sku,
                shelf_life,
            } => commands::catalog::set(&config, &key, sku, shelf_life).await?,
        },
        Commands::Combos { chat } => commands::combos::execute(&config, chat).await?,
        Commands::Check => commands::check::execute(&config, token.is_some()).await?,
    }

    Ok(())
}
