pub mod client;
pub mod error;
pub mod fields;
pub mod orders;
pub mod refresh;
pub mod stocks;
pub mod supplies;

pub use client::MarketplaceClient;
pub use error::UpstreamError;
pub use orders::{fetch_orders, ingest_order_rows, MAX_PAGES, PAGE_SIZE};
pub use refresh::{RefreshOutcome, Refresher};
pub use stocks::{fetch_stocks, group_stock_rows};
pub use supplies::fetch_supplies;
