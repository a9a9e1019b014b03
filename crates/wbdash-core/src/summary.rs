//! Per-product summary model and the merge that builds it.
//!
//! Orders and stocks arrive keyed by whatever identifier the upstream row
//! carried (supplier article or marketplace id). [`build_summaries`] joins
//! both maps against the catalog, trying the external id first and the code
//! second.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ProductCatalogEntry};
use crate::window::{daily_series, WINDOW_DAYS};

/// Warehouse label used when an upstream stock row names none.
pub const DEFAULT_WAREHOUSE: &str = "Склад";

/// Order totals for one product key over the lookback window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderAggregate {
    pub daily: BTreeMap<NaiveDate, u64>,
    pub total_quantity: u64,
    pub total_revenue: f64,
}

impl OrderAggregate {
    /// Adds one order row. A row without a usable date still counts toward
    /// the totals but fills no daily bucket.
    pub fn record(&mut self, date: Option<NaiveDate>, quantity: u64, amount: f64) {
        if let Some(date) = date {
            *self.daily.entry(date).or_insert(0) += quantity;
        }
        self.total_quantity += quantity;
        self.total_revenue += amount;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    #[serde(rename = "warehouse")]
    pub warehouse_name: String,
    #[serde(rename = "qty")]
    pub quantity: u64,
}

impl StockEntry {
    #[must_use]
    pub fn new(warehouse_name: impl Into<String>, quantity: u64) -> Self {
        Self {
            warehouse_name: warehouse_name.into(),
            quantity,
        }
    }
}

pub type OrdersByKey = HashMap<String, OrderAggregate>;
pub type StocksByKey = HashMap<String, Vec<StockEntry>>;

/// The published unit served to the dashboard.
///
/// Field names on the wire are the ones the dashboard script reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub code: String,
    #[serde(rename = "wb_id")]
    pub external_id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "image")]
    pub image_url: String,
    /// One value per window day, oldest first, ending today.
    #[serde(rename = "dailyOrders")]
    pub daily_orders: [u64; WINDOW_DAYS],
    #[serde(rename = "totalQty30")]
    pub total_quantity_30: u64,
    /// Revenue truncated toward zero.
    #[serde(rename = "revenue30")]
    pub total_revenue_30: i64,
    pub stocks: Vec<StockEntry>,
}

impl ProductSummary {
    #[must_use]
    pub fn from_parts(
        entry: &ProductCatalogEntry,
        orders: Option<&OrderAggregate>,
        stocks: &[StockEntry],
        today: NaiveDate,
    ) -> Self {
        let empty = OrderAggregate::default();
        let orders = orders.unwrap_or(&empty);

        Self {
            code: entry.code.clone(),
            external_id: entry.external_id.clone(),
            display_name: entry.display_name.clone(),
            image_url: entry.image_url.clone(),
            daily_orders: daily_series(&orders.daily, today),
            total_quantity_30: orders.total_quantity,
            total_revenue_30: truncate_revenue(orders.total_revenue),
            stocks: stocks.to_vec(),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_revenue(revenue: f64) -> i64 {
    if revenue.is_finite() {
        revenue.trunc() as i64
    } else {
        0
    }
}

/// Builds one summary per catalog entry, in catalog order.
///
/// Every entry yields a summary even when neither map has data for it.
#[must_use]
pub fn build_summaries(
    catalog: &Catalog,
    orders: &OrdersByKey,
    stocks: &StocksByKey,
    today: NaiveDate,
) -> Vec<ProductSummary> {
    catalog
        .iter()
        .map(|entry| {
            let order_agg = orders
                .get(&entry.external_id)
                .or_else(|| orders.get(&entry.code));
            let stock_list = [&entry.external_id, &entry.code]
                .into_iter()
                .filter_map(|key| stocks.get(key))
                .find(|list| !list.is_empty())
                .map_or(&[][..], Vec::as_slice);
            ProductSummary::from_parts(entry, order_agg, stock_list, today)
        })
        .collect()
}
