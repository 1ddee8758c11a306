// ── Per-collection tuning ──

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default bound on any single remote call made by a collection.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How the current page is reconciled after a successful update.
///
/// Creates always prepend locally and removals always drop the row
/// locally; only updates vary, since an edit can move a row under the
/// active ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileStrategy {
    /// Replace the matching row in place; pagination metadata untouched.
    Patch,
    /// Re-fetch the current page with the current query.
    #[default]
    Refetch,
}

/// Whether `next_page`/`previous_page` keep the active search term.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SearchRetention {
    #[default]
    Reset,
    Retain,
}

/// What happens to the memoised full list after a write on the same entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum FullListPolicy {
    /// Never drop the cache implicitly; only `refresh_all` reloads it.
    Keep,
    /// Drop the cache after every successful save or remove.
    #[default]
    InvalidateOnWrite,
}

/// Construction-time options for a [`Collection`](super::Collection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionOptions {
    /// Ordering used when a fetch does not name one.
    pub default_ordering: Option<String>,
    pub reconcile: ReconcileStrategy,
    pub search_retention: SearchRetention,
    pub full_list: FullListPolicy,
    pub request_timeout: Duration,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            default_ordering: None,
            reconcile: ReconcileStrategy::default(),
            search_retention: SearchRetention::default(),
            full_list: FullListPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl CollectionOptions {
    pub fn with_ordering(mut self, ordering: impl Into<String>) -> Self {
        self.default_ordering = Some(ordering.into());
        self
    }

    pub fn with_reconcile(mut self, reconcile: ReconcileStrategy) -> Self {
        self.reconcile = reconcile;
        self
    }

    pub fn with_search_retention(mut self, retention: SearchRetention) -> Self {
        self.search_retention = retention;
        self
    }

    pub fn with_full_list(mut self, policy: FullListPolicy) -> Self {
        self.full_list = policy;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
