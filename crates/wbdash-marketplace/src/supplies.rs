use serde_json::Value;

use crate::client::MarketplaceClient;
use crate::error::UpstreamError;
use crate::fields::{rows_of, SUPPLY_ENVELOPE_KEYS};

/// Fetches the seller's supplies list as raw JSON objects.
///
/// Supplies are passed through untouched; an absent or malformed response
/// yields an empty list.
///
/// # Errors
///
/// Returns [`UpstreamError::Http`] on network failure or timeout.
pub async fn fetch_supplies(client: &MarketplaceClient) -> Result<Vec<Value>, UpstreamError> {
    let body = client.get(&client.supplies_url(), &[]).await?;
    let supplies = body
        .as_ref()
        .and_then(|b| rows_of(b, SUPPLY_ENVELOPE_KEYS))
        .map(<[Value]>::to_vec)
        .unwrap_or_default();
    tracing::info!(count = supplies.len(), "supplies: pull complete");
    Ok(supplies)
}
