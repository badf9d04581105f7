//! CLI command definitions and dispatch.

pub mod migrate;
pub mod share;
pub mod wizard;

use clap::{Parser, Subcommand};

use spaceshare_api::AppState;
use spaceshare_core::config::{AppConfig, DatabaseProvider};
use spaceshare_core::error::AppError;
use spaceshare_database::Stores;

use crate::output::{self, OutputFormat};

/// SpaceShare: restricted, revocable share links for space documents
#[derive(Debug, Parser)]
#[command(name = "spaceshare", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Share link management
    Share(share::ShareArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Share(args) => share::execute(args, &self.config, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    let env = std::env::var("SPACESHARE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(config_path, &env)
}

/// Helper: wire stores, storage and services from configuration
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    if config.database.provider == DatabaseProvider::Memory {
        output::print_warning("In-memory stores are selected; nothing outlives this command.");
    }
    let stores = Stores::from_config(&config.database).await?;
    let storage = spaceshare_storage::from_config(&config.storage).await?;
    Ok(AppState::new(config, stores, storage))
}

/// Map a terminal prompt failure into an application error
pub fn prompt_error(err: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {err}"))
}
