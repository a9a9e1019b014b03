//! Field extraction for loosely-shaped upstream rows.
//!
//! Marketplace responses are not consistent about field names: the same
//! logical value shows up under different keys depending on the endpoint and
//! API version. Each logical value has an ordered list of candidate keys;
//! the first candidate holding a usable value wins.
//!
//! "Usable" means: a non-blank string, or a non-zero number. `null`,
//! booleans, `0`, `""`, arrays and objects are treated as absent.

use serde_json::Value;

/// Candidate keys for the product key of an order row.
pub const ORDER_KEY_FIELDS: &[&str] = &["supplierArticle", "article", "supplierArticleId", "nmId"];
pub const ORDER_QUANTITY_FIELDS: &[&str] = &["quantity"];
pub const ORDER_AMOUNT_FIELDS: &[&str] = &["totalPrice", "price"];
pub const ORDER_DATE_FIELDS: &[&str] = &["createdAt", "dateCreate", "date"];

/// Candidate keys for the product key of a stock row.
pub const STOCK_KEY_FIELDS: &[&str] = &["supplierArticle", "supplierArticleId", "nmId"];
pub const WAREHOUSE_FIELDS: &[&str] = &["warehouseName", "warehouse", "whName"];
pub const STOCK_QUANTITY_FIELDS: &[&str] = &["quantity", "qty"];

/// Envelope keys that may wrap the row array of each endpoint.
pub const ORDER_ENVELOPE_KEYS: &[&str] = &["orders", "data"];
pub const STOCK_ENVELOPE_KEYS: &[&str] = &["data", "stocks", "rows"];
pub const SUPPLY_ENVELOPE_KEYS: &[&str] = &["supplies", "data"];

/// Returns the row array of a response body.
///
/// Accepts a bare array, or an object holding a non-empty array under one
/// of `envelope_keys` (first match wins). Anything else is `None`.
#[must_use]
pub fn rows_of<'a>(body: &'a Value, envelope_keys: &[&str]) -> Option<&'a [Value]> {
    if let Some(rows) = body.as_array() {
        return Some(rows);
    }
    envelope_keys
        .iter()
        .filter_map(|key| body.get(key))
        .filter_map(Value::as_array)
        .find(|rows| !rows.is_empty())
        .map(Vec::as_slice)
}

/// First usable candidate rendered as a product key.
///
/// Strings are trimmed; integral numbers render without a fractional part
/// so `300568253` and `"300568253"` produce the same key.
#[must_use]
pub fn first_key(row: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match row.get(field)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                (i != 0).then(|| i.to_string())
            } else if let Some(u) = n.as_u64() {
                (u != 0).then(|| u.to_string())
            } else {
                n.as_f64().filter(|f| *f != 0.0).map(render_float)
            }
        }
        _ => None,
    })
}

/// First non-blank string candidate.
#[must_use]
pub fn first_text<'a>(row: &'a Value, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|field| row.get(field).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// First candidate that parses as a finite, non-zero number.
///
/// Numeric strings such as `"12.50"` are accepted.
#[must_use]
pub fn first_number(row: &Value, fields: &[&str]) -> Option<f64> {
    fields
        .iter()
        .filter_map(|field| row.get(field))
        .filter_map(as_number)
        .find(|n| n.is_finite() && *n != 0.0)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn render_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

/// Converts a count to a non-negative integer, truncating any fraction.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn to_count(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 1.0).then(|| value.trunc() as u64)
}
