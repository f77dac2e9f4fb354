// ABOUTME: CLI locations command - list a business's pickup locations

use super::{util, LocationsArgs, OutputFormat};
use crate::api::{CheckoutApi, Location};
use crate::config::AppConfig;
use anyhow::Result;

/// Execute the locations command
pub async fn execute(args: LocationsArgs, format: OutputFormat) -> Result<()> {
    let config = AppConfig::load()?;
    let session = config.session.store()?;
    let api = util::api_client(&config, &session)?;

    let locations = api.locations_for_business(&args.business).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&locations)?),
        OutputFormat::Text => output_text(&locations),
    }

    Ok(())
}

fn output_text(locations: &[Location]) {
    if locations.is_empty() {
        println!("No locations found.");
        return;
    }

    println!("{:<12} {:<25} {:<30} {:<20} PHONE", "ID", "NAME", "ADDRESS", "CITY");
    println!("{}", "-".repeat(100));

    for location in locations {
        println!(
            "{:<12} {:<25} {:<30} {:<20} {}",
            util::truncate(&location.id, 12),
            util::truncate(&location.name, 25),
            util::truncate(&location.street_address, 30),
            util::truncate(&location.city, 20),
            location.phone_number
        );
    }
}
