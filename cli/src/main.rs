//! # maritaca CLI
//!
//! Command-line front end for inspecting Maritaca request configuration.
//!
//! ## Usage
//!
//! - `maritaca show` - Print the resolved configuration (access key masked)
//! - `maritaca check` - Validate parameter ranges locally

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{check_command, show_command};
use config::CliConfigLoader;

/// maritaca - request configuration for the Maritaca API
#[derive(Parser)]
#[command(name = "maritaca")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and check Maritaca request configuration")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server URL override
    #[arg(long)]
    server_url: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Access key override
    #[arg(long)]
    token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration
    Show,

    /// Validate the resolved configuration
    Check,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(server_url) = &cli.server_url {
        loader = loader.with_server_url_override(server_url.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    if let Some(token) = &cli.token {
        loader = loader.with_token_override(token.clone());
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    maritaca_core::init_tracing_with_debug(cli.verbose);

    let config_loader = build_config_loader(&cli);

    match cli.command.unwrap_or(Commands::Show) {
        Commands::Show => show_command(config_loader).await,
        Commands::Check => check_command(config_loader).await,
    }
}
