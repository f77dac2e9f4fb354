// ABOUTME: Main entry point for the storefront checkout tool
//
// Binary: storefront
// Usage: storefront <COMMAND>
// - checkout: run the checkout / edit wizard for a cart
// - locations: list a business's pickup locations

#![allow(missing_docs)]

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};
use std::io;

use storefront_checkout::cli;

/// Terminal cleanup utility to ensure proper restoration
fn cleanup_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();
    setup_panic_handler();

    let args = cli::Cli::parse();

    let result = match args.command {
        cli::Commands::Checkout(checkout_args) => {
            cli::checkout::execute(checkout_args, args.format).await
        }
        cli::Commands::Locations(locations_args) => {
            cli::locations::execute(locations_args, args.format).await
        }
    };

    if let Err(ref e) = result {
        tracing::error!("Command failed: {:#}", e);
    }
    result
}

fn setup_logging() {
    use std::fs::OpenOptions;
    use std::path::PathBuf;
    use tracing_subscriber::prelude::*;

    let log_dir = dirs::home_dir()
        .map(|home| home.join(".storefront").join("logs"))
        .unwrap_or_else(|| PathBuf::from(".storefront/logs"));

    let _ = std::fs::create_dir_all(&log_dir);

    // One JSONL file per run
    let log_file = log_dir.join(format!(
        "storefront-{}.jsonl",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ));

    let file = match OpenOptions::new().create(true).append(true).open(&log_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Logging disabled: cannot open {}: {}", log_file.display(), e);
            return;
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_writer(file)
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_checkout=info".into()),
        )
        .init();
}

fn setup_panic_handler() {
    use tracing::error;

    std::panic::set_hook(Box::new(|panic_info| {
        // Ensure terminal is restored before logging the panic
        cleanup_terminal();

        error!("Application panicked: {}", panic_info);
        eprintln!("Application panicked: {}", panic_info);
        eprintln!("Please check the logs for more details.");
    }));
}
