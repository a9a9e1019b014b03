use thiserror::Error;

/// Failures that abort an upstream pull.
///
/// A non-success HTTP status or an unparsable body is not an error here: the
/// client reports those as "no data" and the caller carries on.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("pagination limit reached for {endpoint}: exceeded {max_pages} pages")]
    PaginationLimit { endpoint: String, max_pages: usize },
}
