// ── Client-side collection state ──

mod collection;
mod dependency;
mod options;
mod snapshot;

pub use collection::Collection;
pub use dependency::{DependencyFuture, DependencyLoader, DependencyReport};
pub use options::{
    CollectionOptions, DEFAULT_REQUEST_TIMEOUT, FullListPolicy, ReconcileStrategy, SearchRetention,
};
pub use snapshot::{CollectionSnapshot, CollectionStatus, DependencySets, FetchOutcome};
