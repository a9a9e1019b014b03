//! Command handlers. Output goes to stdout; logs go to stderr.

use std::sync::Arc;

use wbdash_core::{AppConfig, Catalog, SummaryCache};
use wbdash_marketplace::{MarketplaceClient, RefreshOutcome, Refresher};

fn load_catalog(config: &AppConfig) -> anyhow::Result<Catalog> {
    Ok(wbdash_core::load_catalog(&config.catalog_path)?)
}

/// Runs one refresh cycle and prints the resulting summaries.
///
/// With an empty `codes` list every catalog entry is printed in catalog
/// order.
///
/// # Errors
///
/// Returns an error if the catalog or client cannot be built, or if both
/// orders and stocks fail upstream.
pub(crate) async fn run_refresh(config: &AppConfig, codes: &[String]) -> anyhow::Result<()> {
    let catalog = Arc::new(load_catalog(config)?);
    let client = MarketplaceClient::from_config(config)?;
    let refresher = Refresher::new(client, Arc::clone(&catalog), Arc::new(SummaryCache::new()));

    match refresher.refresh().await {
        RefreshOutcome::Published { products, updated_at } => {
            tracing::info!(products, %updated_at, "refresh published");
        }
        RefreshOutcome::Failed => anyhow::bail!("refresh failed: orders and stocks both unavailable"),
        RefreshOutcome::Skipped => anyhow::bail!("refresh skipped unexpectedly"),
    }

    let wanted: Vec<&str> = if codes.is_empty() {
        catalog.iter().map(|entry| entry.code.as_str()).collect()
    } else {
        codes.iter().map(String::as_str).collect()
    };
    let summaries = refresher.cache().query(&wanted);
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

/// Prints the catalog as an aligned table.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or fails validation.
pub(crate) fn run_catalog(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    println!("{:<12}{:<14}NAME", "CODE", "EXTERNAL ID");
    for entry in catalog.iter() {
        println!(
            "{:<12}{:<14}{}",
            entry.code, entry.external_id, entry.display_name
        );
    }
    println!("{} products", catalog.len());
    Ok(())
}

/// Validates config and catalog together.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the client cannot be
/// built from the configured base URLs.
pub(crate) fn run_check_config(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    MarketplaceClient::from_config(config)?;
    println!("{config:#?}");
    println!("catalog: {} products from {}", catalog.len(), config.catalog_path.display());
    Ok(())
}
