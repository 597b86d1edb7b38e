use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod cms;
mod command;
mod config;
mod error;
mod listing;
mod render;
mod server;
mod session;
#[cfg(test)]
mod testing;

use config::Settings;

/// Pitchboard - startup pitch listing and search
#[derive(Parser)]
#[command(name = "pitchboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the listing page (default)
    Serve,
    /// Run one listing query and print the results
    Search {
        /// Search text; omit to list every startup
        query: Option<String>,

        /// Print the resolved listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store a local development session
    Login {
        /// Session id to store
        #[arg(long)]
        id: String,

        /// Display name shown in the page greeting
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },
    /// Remove the local development session
    Logout,
    /// Show the local development session
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins unless --verbose is given
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = cli.settings;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => command::run_serve(settings).await,
        Commands::Search { query, json } => command::run_search(settings, query, json).await,
        Commands::Login { id, name, email } => {
            command::run_login(settings.cache_dir, id, name, email).await
        }
        Commands::Logout => command::run_logout(settings.cache_dir).await,
        Commands::Status => command::run_status(settings.cache_dir).await,
    }
}
