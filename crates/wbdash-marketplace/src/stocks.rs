//! Stocks pull: one request for current warehouse stock, grouped per product key.

use serde_json::Value;
use wbdash_core::{StockEntry, StocksByKey, DEFAULT_WAREHOUSE};

use crate::client::MarketplaceClient;
use crate::error::UpstreamError;
use crate::fields::{
    first_key, first_number, first_text, rows_of, to_count, STOCK_ENVELOPE_KEYS,
    STOCK_KEY_FIELDS, STOCK_QUANTITY_FIELDS, WAREHOUSE_FIELDS,
};

/// Fetches current stock rows and groups them per product key.
///
/// An absent or malformed response yields an empty map.
///
/// # Errors
///
/// Returns [`UpstreamError::Http`] on network failure or timeout.
pub async fn fetch_stocks(client: &MarketplaceClient) -> Result<StocksByKey, UpstreamError> {
    let body = client.get(&client.stocks_url(), &[]).await?;
    let stocks = body.as_ref().map(group_stock_rows).unwrap_or_default();
    tracing::info!(keys = stocks.len(), "stocks: pull complete");
    Ok(stocks)
}

/// Groups a stocks response body into per-key warehouse lists.
///
/// A row carrying a nested `stocks` array expands into one entry per
/// element. A flat row becomes a single entry under [`DEFAULT_WAREHOUSE`]
/// with the row's own quantity. Rows sharing a key append in upstream order.
#[must_use]
pub fn group_stock_rows(body: &Value) -> StocksByKey {
    let mut grouped = StocksByKey::new();
    let Some(rows) = rows_of(body, STOCK_ENVELOPE_KEYS) else {
        return grouped;
    };

    for row in rows {
        let Some(key) = first_key(row, STOCK_KEY_FIELDS) else {
            continue;
        };
        let entries = grouped.entry(key).or_default();
        match row.get("stocks").and_then(Value::as_array) {
            Some(per_warehouse) => entries.extend(per_warehouse.iter().map(stock_entry)),
            None => entries.push(StockEntry::new(DEFAULT_WAREHOUSE, stock_quantity(row))),
        }
    }
    grouped
}

fn stock_entry(value: &Value) -> StockEntry {
    let warehouse = first_text(value, WAREHOUSE_FIELDS).unwrap_or(DEFAULT_WAREHOUSE);
    StockEntry::new(warehouse, stock_quantity(value))
}

fn stock_quantity(value: &Value) -> u64 {
    first_number(value, STOCK_QUANTITY_FIELDS)
        .and_then(to_count)
        .unwrap_or(0)
}
