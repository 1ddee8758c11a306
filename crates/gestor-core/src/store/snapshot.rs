// ── Published collection state ──
//
// Every mutation replaces the whole snapshot in the watch channel, so
// readers never observe a half-applied page.

use std::collections::BTreeMap;
use std::sync::Arc;

use gestor_api::{ListQuery, Page, Record, RecordId};

use crate::error::CoreError;

/// Observable lifecycle of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CollectionStatus {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// At least one action is awaiting the server.
    Loading,
    /// The last settled action succeeded.
    Loaded,
    /// The last settled action failed; the page is the previous one.
    Error,
}

/// Result of a list request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the current page.
    Applied,
    /// A newer request was issued while this one was in flight; the
    /// response was dropped.
    Superseded,
    /// Already at the first/last page; no request was made.
    Unchanged,
}

/// Named dependency sets, keyed by slot name.
pub type DependencySets = BTreeMap<String, Arc<Vec<Record>>>;

/// Immutable view of one collection at a point in time.
#[derive(Debug, Clone, Default)]
pub struct CollectionSnapshot {
    pub page: Arc<Page>,
    /// Query that produced `page`.
    pub query: ListQuery,
    pub in_flight: usize,
    /// Status of the last settled action (never `Loading`).
    pub settled: CollectionStatus,
    pub last_error: Option<CoreError>,
    pub full_list: Option<Arc<Vec<Record>>>,
    pub dependencies: Arc<DependencySets>,
    /// Bumped on every published change.
    pub version: u64,
}

impl CollectionSnapshot {
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn status(&self) -> CollectionStatus {
        if self.loading() {
            CollectionStatus::Loading
        } else {
            self.settled
        }
    }

    pub fn items(&self) -> &[Record] {
        &self.page.items
    }

    /// Find a record on the current page.
    pub fn find(&self, id: &RecordId) -> Option<&Record> {
        self.page
            .items
            .iter()
            .find(|record| record.id().as_ref() == Some(id))
    }

    pub fn dependency(&self, slot: &str) -> Option<&Arc<Vec<Record>>> {
        self.dependencies.get(slot)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn loading_overrides_settled_status() {
        let mut snap = CollectionSnapshot {
            settled: CollectionStatus::Error,
            ..CollectionSnapshot::default()
        };
        assert_eq!(snap.status(), CollectionStatus::Error);
        snap.in_flight = 2;
        assert_eq!(snap.status(), CollectionStatus::Loading);
    }

    #[test]
    fn find_matches_by_id() {
        let items = vec![
            Record::try_from(json!({"id": 1, "nome": "A"})).unwrap_or_default(),
            Record::try_from(json!({"id": 2, "nome": "B"})).unwrap_or_default(),
        ];
        let snap = CollectionSnapshot {
            page: Arc::new(Page::single(items)),
            ..CollectionSnapshot::default()
        };
        let found = snap.find(&RecordId::Int(2)).map(|r| r.display_field("nome"));
        assert_eq!(found.as_deref(), Some("B"));
        assert!(snap.find(&RecordId::Int(3)).is_none());
    }
}
