use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bizdir_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "bizdir")]
#[command(author, version, about = "A terminal business directory browser")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Catalog file to browse (defaults to <data_dir>/catalog.json)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI
    Run,
    /// Print one page of matching businesses
    List {
        /// Case-insensitive search over name, description and owner
        #[arg(short, long)]
        search: Option<String>,
        /// Only show this category (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,
        /// Only show this certification, e.g. "Board Member" (repeatable)
        #[arg(long = "cert")]
        certifications: Vec<String>,
        /// Zero-based page to print
        #[arg(short, long, default_value_t = 0)]
        page: usize,
    },
    /// List categories with record counts
    Categories,
    /// List saved businesses
    Saved,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(path) = cli.catalog {
        config.general.catalog_path = Some(path);
    }
    let config = Arc::new(config);

    let tui = matches!(cli.command, Some(Commands::Run) | None);
    init_logging(&config, tui)?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::List {
            search,
            categories,
            certifications,
            page,
        }) => commands::list::run(&config, search, categories, certifications, page),
        Some(Commands::Categories) => commands::categories::run(&config),
        Some(Commands::Saved) => commands::saved::run(&config),
    }
}

/// The TUI owns the terminal, so it logs to a file in the data directory
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
    );

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}
