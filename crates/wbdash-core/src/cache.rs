//! In-memory holder of the latest published summaries.
//!
//! The whole [`Snapshot`] is swapped in one atomic pointer store. A reader
//! takes an `Arc` to the current snapshot and keeps it for the duration of
//! its query, so it sees either the previous complete snapshot or the new
//! one, never entries from both.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};

use crate::summary::ProductSummary;

/// One refresh cycle's published output.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// `None` until the first successful refresh.
    pub updated_at: Option<DateTime<Utc>>,
    pub summaries: HashMap<String, ProductSummary>,
    /// Raw supply objects as returned upstream.
    pub supplies: Vec<serde_json::Value>,
}

impl Snapshot {
    /// Builds a snapshot keyed by product code.
    #[must_use]
    pub fn new(
        updated_at: DateTime<Utc>,
        summaries: Vec<ProductSummary>,
        supplies: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            updated_at: Some(updated_at),
            summaries: summaries.into_iter().map(|s| (s.code.clone(), s)).collect(),
            supplies,
        }
    }

    /// Summaries for `codes` in request order; unknown codes are skipped.
    #[must_use]
    pub fn query<S: AsRef<str>>(&self, codes: &[S]) -> Vec<ProductSummary> {
        codes
            .iter()
            .filter_map(|code| self.summaries.get(code.as_ref()).cloned())
            .collect()
    }
}

/// Shared cache. The refresh orchestrator is the only writer.
#[derive(Debug)]
pub struct SummaryCache {
    current: ArcSwap<Snapshot>,
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryCache {
    /// Creates a cache holding an empty, never-refreshed snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    /// Replaces the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }

    #[must_use]
    pub fn read(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    #[must_use]
    pub fn query<S: AsRef<str>>(&self, codes: &[S]) -> Vec<ProductSummary> {
        self.read().query(codes)
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.current.load().updated_at
    }
}
