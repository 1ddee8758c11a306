// ── Dependency-set loader ──
//
// Foreign-key choices for a form come from other entities' lists. All
// sources are fetched concurrently; each successful result lands in its
// own slot even when siblings fail.

use std::fmt;
use std::sync::Arc;

use futures_util::future::{BoxFuture, join_all};
use tracing::{debug, warn};

use gestor_api::Record;

use crate::error::CoreError;
use crate::store::snapshot::DependencySets;

/// Future produced by a dependency supplier.
pub type DependencyFuture = BoxFuture<'static, Result<Vec<Record>, CoreError>>;

type Supplier = Arc<dyn Fn() -> DependencyFuture + Send + Sync>;

/// Declarative list of `(slot, supplier)` pairs.
#[derive(Clone, Default)]
pub struct DependencyLoader {
    sources: Vec<(String, Supplier)>,
}

impl fmt::Debug for DependencyLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyLoader")
            .field("slots", &self.slots().collect::<Vec<_>>())
            .finish()
    }
}

impl DependencyLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot. A later slot with the same name replaces the earlier one.
    pub fn with<F>(mut self, slot: impl Into<String>, supplier: F) -> Self
    where
        F: Fn() -> DependencyFuture + Send + Sync + 'static,
    {
        let slot = slot.into();
        self.sources.retain(|(name, _)| *name != slot);
        self.sources.push((slot, Arc::new(supplier)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|(name, _)| name.as_str())
    }

    /// Run every supplier concurrently and collect per-slot results.
    ///
    /// Never fails as a whole; failures are logged and reported.
    pub async fn load(&self) -> DependencyReport {
        let futs = self.sources.iter().map(|(slot, supplier)| {
            let slot = slot.clone();
            let fut = supplier();
            async move { (slot, fut.await) }
        });

        let mut report = DependencyReport::default();
        for (slot, result) in join_all(futs).await {
            match result {
                Ok(records) => {
                    debug!(slot = %slot, count = records.len(), "dependency set loaded");
                    report.loaded.insert(slot, Arc::new(records));
                }
                Err(e) => {
                    warn!(slot = %slot, error = %e, "dependency set failed to load");
                    report.failed.push((slot, e));
                }
            }
        }
        report
    }
}

/// Outcome of [`DependencyLoader::load`].
#[derive(Debug, Clone, Default)]
pub struct DependencyReport {
    pub loaded: DependencySets,
    pub failed: Vec<(String, CoreError)>,
}

impl DependencyReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn first_error(&self) -> Option<&CoreError> {
        self.failed.first().map(|(_, e)| e)
    }
}
