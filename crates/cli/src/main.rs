//! AgriMarket CLI - Chain status, catalog seeding, and pinning tools.
//!
//! # Usage
//!
//! ```bash
//! # Show chain connection status and marketplace summary
//! am-cli status
//!
//! # Seed the marketplace with demo products
//! am-cli seed --count 3
//!
//! # Pin an image to the content-addressed storage network
//! am-cli pin photo.png
//! ```
//!
//! Configuration comes from the same environment variables as the
//! storefront (see `agrimarket-storefront`); seeding and pinning require a
//! signing key and pinning credentials respectively.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "am-cli")]
#[command(author, version, about = "AgriMarket CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show chain connection status and marketplace summary
    Status,
    /// Seed the marketplace with demo products
    Seed {
        /// Number of demo products to create
        #[arg(short, long, default_value_t = 3)]
        count: usize,
    },
    /// Pin an image file to the content-addressed storage network
    Pin {
        /// Path to the image file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "am_cli=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Status => commands::status::run().await,
        Commands::Seed { count } => commands::seed::run(count).await,
        Commands::Pin { path } => commands::pin::run(&path).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
