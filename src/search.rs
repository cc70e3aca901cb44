//! Live location search: waits out a quiet period after each keystroke and
//! drops results that a newer query has overtaken.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use tracing::debug;

use crate::geocoding::{GeocodeError, Geocoder};
use crate::models::GeocodeResult;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Shorter (trimmed) queries never reach the geocoder.
pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "results", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Results for the newest query.
    Results(Vec<GeocodeResult>),
    /// Query too short to search; the result list should be emptied.
    Cleared,
    /// A newer query arrived first; leave the UI alone.
    Superseded,
}

pub struct LocationSearch<G> {
    geocoder: Arc<G>,
    debounce: Duration,
    latest: AtomicU64,
}

impl<G: Geocoder> LocationSearch<G> {
    pub fn new(geocoder: Arc<G>, debounce: Duration) -> Self {
        Self {
            geocoder,
            debounce,
            latest: AtomicU64::new(0),
        }
    }

    pub fn geocoder(&self) -> &Arc<G> {
        &self.geocoder
    }

    fn issue_token(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }

    /// Invalidate anything pending, e.g. when the picker closes.
    pub fn cancel(&self) {
        self.issue_token();
    }

    pub async fn search(&self, query: &str) -> Result<SearchOutcome, GeocodeError> {
        let token = self.issue_token();
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(SearchOutcome::Cleared);
        }

        sleep(self.debounce).await;
        if !self.is_current(token) {
            debug!(query, "search superseded before dispatch");
            return Ok(SearchOutcome::Superseded);
        }

        let result = self.geocoder.search_location(query).await;
        if !self.is_current(token) {
            debug!(query, "discarding stale search response");
            return Ok(SearchOutcome::Superseded);
        }
        result.map(SearchOutcome::Results)
    }
}
