use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use wbdash_core::ProductSummary;

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct SummaryQuery {
    pub codes: Option<String>,
}

/// Splits a comma-separated `codes` parameter, dropping blanks.
fn parse_codes(raw: Option<&str>) -> Vec<&str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .collect()
}

pub(super) async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Json<Vec<ProductSummary>> {
    let codes = parse_codes(query.codes.as_deref());
    Json(state.cache.query(&codes))
}

pub(super) async fn get_supplies(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.cache.read().supplies.clone())
}
