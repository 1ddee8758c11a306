// ── Paginated collection container ──
//
// One instance per entity per session. Holds the displayed page, the
// memoised full list and the dependency sets, and publishes every
// change through a `watch` channel as a fresh `CollectionSnapshot`.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use gestor_api::{ListQuery, Page, Record, RecordId, RemoteResource};

use crate::error::CoreError;
use crate::store::dependency::{DependencyLoader, DependencyReport};
use crate::store::options::{CollectionOptions, FullListPolicy, ReconcileStrategy, SearchRetention};
use crate::store::snapshot::{CollectionSnapshot, CollectionStatus, FetchOutcome};
use crate::stream::CollectionStream;

/// Stateful container for one entity's list view.
pub struct Collection {
    resource: Arc<dyn RemoteResource>,
    options: CollectionOptions,
    dependencies: DependencyLoader,
    state: watch::Sender<CollectionSnapshot>,
    /// Last sequence number handed to a list request.
    sequence: AtomicU64,
    /// Serialises full-list loads so concurrent callers share one request.
    full_list_lock: Mutex<()>,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("resource", &self.resource.name())
            .field("options", &self.options)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Keeps `in_flight` raised while an action runs.
///
/// Dropped on every exit path, including when the action future itself
/// is dropped before completion.
struct InFlight<'a> {
    state: &'a watch::Sender<CollectionSnapshot>,
}

impl<'a> InFlight<'a> {
    fn enter(state: &'a watch::Sender<CollectionSnapshot>) -> Self {
        state.send_modify(|snap| {
            snap.in_flight += 1;
            snap.version += 1;
        });
        Self { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|snap| {
            snap.in_flight = snap.in_flight.saturating_sub(1);
            snap.version += 1;
        });
    }
}

impl Collection {
    pub fn new(resource: Arc<dyn RemoteResource>, options: CollectionOptions) -> Self {
        let (state, _) = watch::channel(CollectionSnapshot::default());
        Self {
            resource,
            options,
            dependencies: DependencyLoader::default(),
            state,
            sequence: AtomicU64::new(0),
            full_list_lock: Mutex::new(()),
        }
    }

    pub fn with_dependencies(mut self, dependencies: DependencyLoader) -> Self {
        self.dependencies = dependencies;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// REST resource name of the backing adapter.
    pub fn name(&self) -> &str {
        self.resource.name()
    }

    pub fn options(&self) -> &CollectionOptions {
        &self.options
    }

    pub fn resource(&self) -> &Arc<dyn RemoteResource> {
        &self.resource
    }

    pub fn dependency_slots(&self) -> impl Iterator<Item = &str> {
        self.dependencies.slots()
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        self.state.borrow().clone()
    }

    pub fn page(&self) -> Arc<Page> {
        Arc::clone(&self.state.borrow().page)
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading()
    }

    pub fn status(&self) -> CollectionStatus {
        self.state.borrow().status()
    }

    pub fn last_error(&self) -> Option<CoreError> {
        self.state.borrow().last_error.clone()
    }

    pub fn full_list(&self) -> Option<Arc<Vec<Record>>> {
        self.state.borrow().full_list.clone()
    }

    pub fn dependency(&self, slot: &str) -> Option<Arc<Vec<Record>>> {
        self.state.borrow().dependency(slot).cloned()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> CollectionStream {
        CollectionStream::new(self.state.subscribe())
    }

    // ── Page fetching ────────────────────────────────────────────────

    /// Fetch `page` with `search`; `None` ordering means the default one.
    pub async fn fetch_page(
        &self,
        page: u32,
        search: &str,
        ordering: Option<&str>,
    ) -> Result<FetchOutcome, CoreError> {
        let ordering = ordering
            .map(str::to_owned)
            .or_else(|| self.options.default_ordering.clone());
        let query = ListQuery::page(page)
            .with_search(search)
            .with_ordering(ordering);
        self.fetch(query).await
    }

    /// Fetch an arbitrary query and make it the current page on success.
    ///
    /// Only the most recently issued request may publish; an older
    /// response, successful or not, comes back as `Superseded`.
    pub async fn fetch(&self, query: ListQuery) -> Result<FetchOutcome, CoreError> {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight::enter(&self.state);
        debug!(resource = self.name(), seq, page = query.page, "fetching page");

        let result = self.call(self.resource.list_page(&query)).await;

        if self.sequence.load(Ordering::SeqCst) != seq {
            debug!(resource = self.name(), seq, "stale response discarded");
            return Ok(FetchOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                self.succeed(|snap| {
                    snap.page = Arc::new(page);
                    snap.query = query;
                });
                Ok(FetchOutcome::Applied)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Re-fetch the current page with the current query.
    pub async fn refresh(&self) -> Result<FetchOutcome, CoreError> {
        let query = self.current_query();
        self.fetch(query).await
    }

    pub async fn next_page(&self) -> Result<FetchOutcome, CoreError> {
        let (page, query) = {
            let snap = self.state.borrow();
            (Arc::clone(&snap.page), snap.query.clone())
        };
        if page.is_last() {
            return Ok(FetchOutcome::Unchanged);
        }
        self.fetch(self.step(query, page.page.saturating_add(1)))
            .await
    }

    pub async fn previous_page(&self) -> Result<FetchOutcome, CoreError> {
        let (page, query) = {
            let snap = self.state.borrow();
            (Arc::clone(&snap.page), snap.query.clone())
        };
        if page.is_first() {
            return Ok(FetchOutcome::Unchanged);
        }
        self.fetch(self.step(query, page.page.saturating_sub(1)))
            .await
    }

    fn step(&self, mut query: ListQuery, page: u32) -> ListQuery {
        query.page = page;
        if self.options.search_retention == SearchRetention::Reset {
            query.search.clear();
        }
        query
    }

    /// Query of the displayed page, or the default query before any fetch.
    fn current_query(&self) -> ListQuery {
        let query = self.state.borrow().query.clone();
        if query.ordering.is_some() {
            query
        } else {
            query.with_ordering(self.options.default_ordering.clone())
        }
    }

    // ── Full list ────────────────────────────────────────────────────

    /// Memoised unpaginated list.
    ///
    /// Returns the cache without a network call while it is non-empty.
    pub async fn fetch_all(&self) -> Result<Arc<Vec<Record>>, CoreError> {
        let _lock = self.full_list_lock.lock().await;
        let cached = self
            .state
            .borrow()
            .full_list
            .clone()
            .filter(|list| !list.is_empty());
        if let Some(list) = cached {
            return Ok(list);
        }
        self.load_full_list().await
    }

    /// Reload the full list regardless of the cache.
    pub async fn refresh_all(&self) -> Result<Arc<Vec<Record>>, CoreError> {
        let _lock = self.full_list_lock.lock().await;
        self.load_full_list().await
    }

    pub fn invalidate_full_list(&self) {
        self.state.send_if_modified(|snap| {
            if snap.full_list.take().is_some() {
                snap.version += 1;
                true
            } else {
                false
            }
        });
    }

    async fn load_full_list(&self) -> Result<Arc<Vec<Record>>, CoreError> {
        let _guard = InFlight::enter(&self.state);
        let ordering = self.options.default_ordering.as_deref();
        debug!(resource = self.name(), "fetching full list");

        match self.call(self.resource.list_all(None, ordering)).await {
            Ok(records) => {
                let list = Arc::new(records);
                self.succeed(|snap| snap.full_list = Some(Arc::clone(&list)));
                Ok(list)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Create (no id) or update (id present) a record.
    ///
    /// A created record is prepended to the current page without
    /// touching the totals. Updates reconcile per `ReconcileStrategy`.
    pub async fn save(&self, record: Record) -> Result<Record, CoreError> {
        let _guard = InFlight::enter(&self.state);

        if record.is_draft() {
            let created = self
                .call(self.resource.create(&record))
                .await
                .map_err(|e| self.fail(e))?;
            debug!(resource = self.name(), id = ?created.id(), "record created");
            self.succeed(|snap| {
                let mut page = (*snap.page).clone();
                page.items.insert(0, created.clone());
                snap.page = Arc::new(page);
            });
            self.after_write();
            return Ok(created);
        }

        let updated = self
            .call(self.resource.update(&record))
            .await
            .map_err(|e| self.fail(e))?;
        debug!(resource = self.name(), id = ?updated.id(), "record updated");
        self.after_write();

        match self.options.reconcile {
            ReconcileStrategy::Patch => {
                let id = updated.id();
                self.succeed(|snap| {
                    let mut page = (*snap.page).clone();
                    if let Some(slot) = page.items.iter_mut().find(|r| r.id() == id) {
                        *slot = updated.clone();
                    }
                    snap.page = Arc::new(page);
                });
            }
            ReconcileStrategy::Refetch => {
                if let Err(e) = self.refresh().await {
                    warn!(resource = self.name(), error = %e, "refetch after update failed");
                }
            }
        }
        Ok(updated)
    }

    /// Delete by id and drop the row from the current page.
    pub async fn remove(&self, id: &RecordId) -> Result<(), CoreError> {
        let _guard = InFlight::enter(&self.state);

        self.call(self.resource.delete(id))
            .await
            .map_err(|e| self.fail(e))?;
        debug!(resource = self.name(), %id, "record deleted");

        self.succeed(|snap| {
            if snap.page.items.iter().any(|r| r.id().as_ref() == Some(id)) {
                let mut page = (*snap.page).clone();
                page.items.retain(|r| r.id().as_ref() != Some(id));
                snap.page = Arc::new(page);
            }
        });
        self.after_write();
        Ok(())
    }

    fn after_write(&self) {
        if self.options.full_list == FullListPolicy::InvalidateOnWrite {
            self.invalidate_full_list();
        }
    }

    // ── Dependencies ─────────────────────────────────────────────────

    /// Load every declared dependency set concurrently.
    ///
    /// Slots that loaded are published even when others failed; the
    /// first failure becomes the last error.
    pub async fn load_dependencies(&self) -> DependencyReport {
        if self.dependencies.is_empty() {
            return DependencyReport::default();
        }
        let _guard = InFlight::enter(&self.state);
        let report = self.dependencies.load().await;

        let publish_sets = |snap: &mut CollectionSnapshot| {
            let mut sets = (*snap.dependencies).clone();
            sets.extend(
                report
                    .loaded
                    .iter()
                    .map(|(slot, records)| (slot.clone(), Arc::clone(records))),
            );
            snap.dependencies = Arc::new(sets);
        };
        match report.first_error() {
            Some(e) => {
                self.publish(publish_sets);
                self.fail(e.clone());
            }
            None => self.succeed(publish_sets),
        }
        report
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Run a remote call under the request timeout.
    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, gestor_api::Error>>,
    ) -> Result<T, CoreError> {
        let limit = self.options.request_timeout;
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result.map_err(|e| CoreError::from(e).for_resource(self.name())),
            Err(_) => Err(CoreError::timed_out(limit)),
        }
    }

    fn publish(&self, apply: impl FnOnce(&mut CollectionSnapshot)) {
        self.state.send_modify(|snap| {
            apply(snap);
            snap.version += 1;
        });
    }

    /// Publish a successful action: settle as `Loaded` and clear the last error.
    fn succeed(&self, apply: impl FnOnce(&mut CollectionSnapshot)) {
        self.publish(|snap| {
            apply(snap);
            snap.settled = CollectionStatus::Loaded;
            snap.last_error = None;
        });
    }

    /// Record an error as the last error and hand it back.
    fn fail(&self, err: CoreError) -> CoreError {
        warn!(resource = self.name(), error = %err, "collection action failed");
        self.publish(|snap| {
            snap.settled = CollectionStatus::Error;
            snap.last_error = Some(err.clone());
        });
        err
    }
}
