//! HTTP client for the marketplace seller APIs.
//!
//! Two hosts are involved: the suppliers API (orders, supplies) and the
//! statistics API (stocks). Both take the seller token verbatim in the
//! `Authorization` header.

use std::time::Duration;

use reqwest::{header::AUTHORIZATION, Client, Url};
use serde_json::Value;

use crate::error::UpstreamError;

const ORDERS_PATH: &str = "api/v3/orders";
const SUPPLIES_PATH: &str = "api/v3/supplies";
const STOCKS_PATH: &str = "api/v1/supplier/stocks";

/// Authenticated GET client for the marketplace APIs.
///
/// Performs no retries. A failed call yields no data for this cycle and the
/// next scheduled refresh tries again.
#[derive(Clone)]
pub struct MarketplaceClient {
    client: Client,
    token: String,
    suppliers_base: Url,
    statistics_base: Url,
}

impl std::fmt::Debug for MarketplaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceClient")
            .field("token", &"[redacted]")
            .field("suppliers_base", &self.suppliers_base.as_str())
            .field("statistics_base", &self.statistics_base.as_str())
            .finish_non_exhaustive()
    }
}

impl MarketplaceClient {
    /// Creates a client with the given per-request timeout and base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`UpstreamError::InvalidBaseUrl`] if either
    /// base URL does not parse.
    pub fn new(
        token: &str,
        timeout_secs: u64,
        suppliers_base_url: &str,
        statistics_base_url: &str,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("wbdash/0.1 (seller-dashboard)")
            .build()?;

        Ok(Self {
            client,
            token: token.to_owned(),
            suppliers_base: normalise_base(suppliers_base_url)?,
            statistics_base: normalise_base(statistics_base_url)?,
        })
    }

    /// Creates a client from the application config.
    ///
    /// # Errors
    ///
    /// See [`MarketplaceClient::new`].
    pub fn from_config(config: &wbdash_core::AppConfig) -> Result<Self, UpstreamError> {
        Self::new(
            &config.wb_token,
            config.request_timeout_secs,
            &config.suppliers_base_url,
            &config.statistics_base_url,
        )
    }

    #[must_use]
    pub fn orders_url(&self) -> Url {
        join(&self.suppliers_base, ORDERS_PATH)
    }

    #[must_use]
    pub fn supplies_url(&self) -> Url {
        join(&self.suppliers_base, SUPPLIES_PATH)
    }

    #[must_use]
    pub fn stocks_url(&self) -> Url {
        join(&self.statistics_base, STOCKS_PATH)
    }

    /// Sends an authenticated GET and parses the body as JSON.
    ///
    /// Returns `Ok(None)` for any non-success status or a body that is not
    /// valid JSON; both are logged at `warn`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] on network, TLS, or timeout failure.
    pub async fn get(
        &self,
        url: &Url,
        params: &[(&str, String)],
    ) -> Result<Option<Value>, UpstreamError> {
        let response = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, &self.token)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                url = %url,
                status = status.as_u16(),
                "upstream returned non-success status; treating as no data"
            );
            return Ok(None);
        }

        let body = response.text().await?;
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "upstream body is not valid JSON; treating as no data");
                Ok(None)
            }
        }
    }
}

/// Ensures the base URL ends with exactly one slash so relative joins keep
/// any path prefix.
fn normalise_base(base_url: &str) -> Result<Url, UpstreamError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| UpstreamError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(UpstreamError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }
    Ok(url)
}

fn join(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let base_path = base.path().trim_end_matches('/');
    url.set_path(&format!("{base_path}/{path}"));
    url
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
