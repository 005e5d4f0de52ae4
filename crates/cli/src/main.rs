//! Stride CLI - Database migrations and visitor record tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! stride-cli migrate
//!
//! # Show a visitor's durable records
//! stride-cli records show --visitor 5f0c6c8e-3c1e-4f4e-9d3a-2b7d3c0e9a11
//!
//! # Delete a visitor's durable records
//! stride-cli records clear --visitor 5f0c6c8e-3c1e-4f4e-9d3a-2b7d3c0e9a11
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(name = "stride-cli")]
#[command(author, version, about = "Stride storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Inspect or delete a visitor's durable records
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },
}

#[derive(Subcommand)]
enum RecordsAction {
    /// Print the cart, subscribers and feedback stored for a visitor
    Show {
        /// Visitor id (value of the `fs_visitor` cookie)
        #[arg(short, long)]
        visitor: Uuid,
    },
    /// Delete every durable slot stored for a visitor
    Clear {
        /// Visitor id (value of the `fs_visitor` cookie)
        #[arg(short, long)]
        visitor: Uuid,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Records { action } => match action {
            RecordsAction::Show { visitor } => commands::records::show(visitor).await?,
            RecordsAction::Clear { visitor } => commands::records::clear(visitor).await?,
        },
    }
    Ok(())
}
