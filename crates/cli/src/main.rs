//! Sokoni CLI - seeding, demo data, and configuration checks.
//!
//! # Usage
//!
//! ```bash
//! # Seed sellers and catalogs from a YAML fixture into the configured backend
//! soko-cli seed --file crates/cli/fixtures/demo-market.yaml
//!
//! # Wipe and re-seed
//! soko-cli seed --file crates/cli/fixtures/demo-market.yaml --clear
//!
//! # Manage the local demo data file (SOKONI_DATA_FILE)
//! soko-cli demo init
//! soko-cli demo show
//! soko-cli demo reset
//!
//! # Validate configuration and backend reachability
//! soko-cli doctor
//! ```
//!
//! # Commands
//!
//! - `seed` - Load sellers/catalogs from a YAML fixture
//! - `demo` - Manage the local demo data file
//! - `doctor` - Validate configuration and ping the backend

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "soko-cli")]
#[command(author, version, about = "Sokoni CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed sellers and catalogs from a YAML fixture
    Seed {
        /// Path to the YAML fixture file
        #[arg(short, long)]
        file: String,

        /// Delete existing sellers and catalogs first
        #[arg(long)]
        clear: bool,
    },
    /// Manage the local demo data file
    Demo {
        #[command(subcommand)]
        action: DemoAction,
    },
    /// Validate configuration and backend reachability
    Doctor,
}

#[derive(Subcommand)]
enum DemoAction {
    /// Create the demo data file with a small starter marketplace
    Init,
    /// Summarize what the demo data file contains
    Show,
    /// Delete the demo data file
    Reset,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { file, clear } => commands::seed::run(&file, clear).await?,
        Commands::Demo { action } => match action {
            DemoAction::Init => commands::demo::init().await?,
            DemoAction::Show => commands::demo::show().await?,
            DemoAction::Reset => commands::demo::reset().await?,
        },
        Commands::Doctor => commands::doctor::run().await?,
    }
    Ok(())
}
