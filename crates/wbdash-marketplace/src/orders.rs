//! Orders pull: pages through the 30-day order feed and aggregates rows per
//! product key.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use wbdash_core::{lookback_start, OrdersByKey};

use crate::client::MarketplaceClient;
use crate::error::UpstreamError;
use crate::fields::{
    first_key, first_number, first_text, rows_of, to_count, ORDER_AMOUNT_FIELDS,
    ORDER_DATE_FIELDS, ORDER_ENVELOPE_KEYS, ORDER_KEY_FIELDS, ORDER_QUANTITY_FIELDS,
};

/// Rows requested per page (`take`).
pub const PAGE_SIZE: usize = 1000;

/// Upper bound on pages per pull. Guards against an upstream that keeps
/// returning full pages forever.
pub const MAX_PAGES: usize = 500;

/// Fetches every order row since `now - 30 days` and aggregates it.
///
/// Requests pages of [`PAGE_SIZE`] with an increasing `skip` offset and stops
/// at the first page that is absent, empty, or shorter than a full page.
///
/// **All-or-nothing semantics**: a transport failure on any page discards the
/// rows already aggregated and returns the error, so the caller never sees a
/// partially built map for a failed pull.
///
/// # Errors
///
/// - [`UpstreamError::Http`] on network failure or timeout.
/// - [`UpstreamError::PaginationLimit`] after [`MAX_PAGES`] full pages.
pub async fn fetch_orders(
    client: &MarketplaceClient,
    now: DateTime<Utc>,
) -> Result<OrdersByKey, UpstreamError> {
    let url = client.orders_url();
    let date_from = lookback_start(now).format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let today = now.date_naive();

    let mut orders = OrdersByKey::new();
    let mut skip = 0usize;
    let mut page_count = 0usize;
    let mut row_count = 0usize;

    loop {
        page_count += 1;
        if page_count > MAX_PAGES {
            return Err(UpstreamError::PaginationLimit {
                endpoint: url.to_string(),
                max_pages: MAX_PAGES,
            });
        }

        let params = [
            ("dateFrom", date_from.clone()),
            ("take", PAGE_SIZE.to_string()),
            ("skip", skip.to_string()),
        ];
        let Some(body) = client.get(&url, &params).await? else {
            break;
        };
        let Some(rows) = rows_of(&body, ORDER_ENVELOPE_KEYS) else {
            break;
        };
        if rows.is_empty() {
            break;
        }

        let skipped = ingest_order_rows(&mut orders, rows, today);
        if skipped > 0 {
            tracing::debug!(skipped, skip, "orders: rows without a product key skipped");
        }
        row_count += rows.len();

        if rows.len() < PAGE_SIZE {
            break;
        }
        skip += PAGE_SIZE;
    }

    tracing::info!(
        pages = page_count,
        rows = row_count,
        keys = orders.len(),
        "orders: pull complete"
    );
    Ok(orders)
}

/// Folds `rows` into `orders`, merging into existing aggregates.
///
/// Returns the number of rows skipped for lacking a product key.
pub fn ingest_order_rows(orders: &mut OrdersByKey, rows: &[Value], today: NaiveDate) -> usize {
    let mut skipped = 0;
    for row in rows {
        let Some(key) = first_key(row, ORDER_KEY_FIELDS) else {
            skipped += 1;
            continue;
        };
        let quantity = first_number(row, ORDER_QUANTITY_FIELDS)
            .and_then(to_count)
            .unwrap_or(1);
        let amount = first_number(row, ORDER_AMOUNT_FIELDS).unwrap_or(0.0);
        let date = order_date(row, today);

        orders.entry(key).or_default().record(date, quantity, amount);
    }
    skipped
}

/// Calendar day of an order row.
///
/// Uses the first ten characters of the first date field present. A row with
/// no date field is dated `today`; a row whose date does not parse gets
/// `None` and lands in no daily bucket.
fn order_date(row: &Value, today: NaiveDate) -> Option<NaiveDate> {
    let Some(raw) = first_text(row, ORDER_DATE_FIELDS) else {
        return Some(today);
    };
    let day: String = raw.chars().take(10).collect();
    NaiveDate::parse_from_str(&day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
    }

    #[test]
    fn rows_group_by_first_available_key() {
        let rows = vec![
            json!({ "supplierArticle": "Y299.", "quantity": 2, "totalPrice": 500, "createdAt": "2026-10-17T09:00:00Z" }),
            json!({ "nmId": 300_568_253, "price": "250.5", "date": "2026-10-18" }),
        ];
        let mut orders = OrdersByKey::new();
        assert_eq!(ingest_order_rows(&mut orders, &rows, today()), 0);

        let by_code = &orders["Y299."];
        assert_eq!(by_code.total_quantity, 2);
        assert_eq!(by_code.daily.get(&NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()), Some(&2));

        let by_id = &orders["300568253"];
        assert_eq!(by_id.total_quantity, 1);
        assert!((by_id.total_revenue - 250.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rows_without_key_are_skipped() {
        let rows = vec![
            json!({ "quantity": 4 }),
            json!({ "supplierArticle": "", "nmId": null }),
            json!({ "article": "B10." }),
        ];
        let mut orders = OrdersByKey::new();
        assert_eq!(ingest_order_rows(&mut orders, &rows, today()), 2);
        assert_eq!(orders.len(), 1);
    }

    #[test]
    fn quantity_defaults_to_one_when_missing_or_invalid() {
        let rows = vec![
            json!({ "nmId": 1 }),
            json!({ "nmId": 1, "quantity": 0 }),
            json!({ "nmId": 1, "quantity": "lots" }),
            json!({ "nmId": 1, "quantity": "3" }),
        ];
        let mut orders = OrdersByKey::new();
        ingest_order_rows(&mut orders, &rows, today());
        assert_eq!(orders["1"].total_quantity, 6);
    }

    #[test]
    fn missing_date_counts_as_today() {
        let rows = vec![json!({ "nmId": 7, "quantity": 2 })];
        let mut orders = OrdersByKey::new();
        ingest_order_rows(&mut orders, &rows, today());
        assert_eq!(orders["7"].daily.get(&today()), Some(&2));
    }

    #[test]
    fn unparsable_date_counts_toward_totals_only() {
        let rows = vec![json!({ "nmId": 7, "createdAt": "18.10.2026", "price": 10 })];
        let mut orders = OrdersByKey::new();
        ingest_order_rows(&mut orders, &rows, today());
        let agg = &orders["7"];
        assert!(agg.daily.is_empty());
        assert_eq!(agg.total_quantity, 1);
        assert!((agg.total_revenue - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn repeated_ingest_merges_additively() {
        let page = vec![json!({ "nmId": 9, "quantity": 1, "price": 100, "createdAt": "2026-10-10" })];
        let mut orders = OrdersByKey::new();
        ingest_order_rows(&mut orders, &page, today());
        ingest_order_rows(&mut orders, &page, today());
        let agg = &orders["9"];
        assert_eq!(agg.total_quantity, 2);
        assert_eq!(agg.daily.len(), 1);
        assert!((agg.total_revenue - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_price_wins_over_price() {
        let rows = vec![json!({ "nmId": 5, "totalPrice": 900, "price": 300 })];
        let mut orders = OrdersByKey::new();
        ingest_order_rows(&mut orders, &rows, today());
        assert!((orders["5"].total_revenue - 900.0).abs() < f64::EPSILON);
    }
}
