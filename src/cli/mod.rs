// ABOUTME: CLI argument parsing and command routing for the storefront tool
//
// Provides command-line interface for:
// - Running the checkout / edit wizard (checkout)
// - Listing a business's pickup locations (locations)

pub mod checkout;
pub mod locations;
pub mod util;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Storefront dashboard tools - place and edit orders from the terminal
#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for commands
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the checkout wizard for a cart, or edit a placed order
    Checkout(CheckoutArgs),

    /// List pickup locations for a business
    Locations(LocationsArgs),
}

/// Arguments for the checkout command
#[derive(clap::Args)]
pub struct CheckoutArgs {
    /// Business the order belongs to
    #[arg(long)]
    pub business: String,

    /// JSON file with the cart: [{"productId", "name", "unitPrice", "quantity"}]
    #[arg(long)]
    pub cart: PathBuf,

    /// Place this existing draft order instead of creating a new one
    #[arg(long, conflicts_with = "edit")]
    pub draft_order: Option<String>,

    /// The order is already linked to a known customer
    #[arg(long)]
    pub linked: bool,

    /// Edit a placed order described by this JSON file
    #[arg(long)]
    pub edit: Option<PathBuf>,

    /// Override the session role (agent, manager, customer, anonymous)
    #[arg(long)]
    pub role: Option<String>,
}

/// Arguments for the locations command
#[derive(clap::Args)]
pub struct LocationsArgs {
    /// Business whose locations to list
    #[arg(long)]
    pub business: String,
}
