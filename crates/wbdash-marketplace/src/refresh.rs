//! Refresh orchestration.
//!
//! One cycle pulls orders, stocks, and supplies concurrently, builds a
//! summary per catalog entry, and publishes the result to the cache as a
//! single snapshot. Cycles never overlap: [`Refresher::refresh`] waits for an
//! in-flight cycle to finish, [`Refresher::try_refresh`] skips instead.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use wbdash_core::{build_summaries, Catalog, OrdersByKey, Snapshot, StocksByKey, SummaryCache};

use crate::client::MarketplaceClient;
use crate::orders::fetch_orders;
use crate::stocks::fetch_stocks;
use crate::supplies::fetch_supplies;

/// Result of a single refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot was published.
    Published {
        products: usize,
        updated_at: DateTime<Utc>,
    },
    /// Another cycle was already running.
    Skipped,
    /// Both orders and stocks failed; the previous snapshot was kept.
    Failed,
}

#[derive(Debug)]
pub struct Refresher {
    client: MarketplaceClient,
    catalog: Arc<Catalog>,
    cache: Arc<SummaryCache>,
    running: tokio::sync::Mutex<()>,
}

impl Refresher {
    #[must_use]
    pub fn new(client: MarketplaceClient, catalog: Arc<Catalog>, cache: Arc<SummaryCache>) -> Self {
        Self {
            client,
            catalog,
            cache,
            running: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<SummaryCache> {
        &self.cache
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Runs one cycle, waiting for any in-flight cycle to finish first.
    pub async fn refresh(&self) -> RefreshOutcome {
        let _guard = self.running.lock().await;
        self.run_cycle(Utc::now()).await
    }

    /// Runs one cycle unless another is in flight, in which case returns
    /// [`RefreshOutcome::Skipped`] immediately.
    pub async fn try_refresh(&self) -> RefreshOutcome {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::info!("refresh: previous cycle still running, skipping");
            return RefreshOutcome::Skipped;
        };
        self.run_cycle(Utc::now()).await
    }

    async fn run_cycle(&self, started_at: DateTime<Utc>) -> RefreshOutcome {
        tracing::info!(products = self.catalog.len(), "refresh: cycle started");

        let (orders, stocks, supplies) = tokio::join!(
            fetch_orders(&self.client, started_at),
            fetch_stocks(&self.client),
            fetch_supplies(&self.client),
        );

        let (orders, stocks) = match (orders, stocks) {
            (Err(orders_err), Err(stocks_err)) => {
                tracing::error!(
                    orders_error = %orders_err,
                    stocks_error = %stocks_err,
                    "refresh: orders and stocks both failed, keeping previous snapshot"
                );
                return RefreshOutcome::Failed;
            }
            (orders, stocks) => (
                orders.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "refresh: orders pull failed, using empty orders");
                    OrdersByKey::new()
                }),
                stocks.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "refresh: stocks pull failed, using empty stocks");
                    StocksByKey::new()
                }),
            ),
        };
        let supplies = supplies.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "refresh: supplies pull failed, using empty list");
            Vec::new()
        });

        let summaries = build_summaries(&self.catalog, &orders, &stocks, started_at.date_naive());
        let products = summaries.len();
        let updated_at = Utc::now();
        self.cache.publish(Snapshot::new(updated_at, summaries, supplies));

        tracing::info!(
            products,
            order_keys = orders.len(),
            stock_keys = stocks.len(),
            elapsed_ms = (updated_at - started_at).num_milliseconds(),
            "refresh: snapshot published"
        );
        RefreshOutcome::Published {
            products,
            updated_at,
        }
    }
}
