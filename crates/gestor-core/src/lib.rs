// gestor-core: per-session collection state between gestor-api and the CLI.

pub mod catalog;
pub mod config;
pub mod error;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{Dependency, DependencySource, Entity, ReportKind};
pub use config::{DEFAULT_BASE_URL, EntityTuning, SessionConfig, TlsVerification};
pub use error::CoreError;
pub use session::Session;
pub use store::{
    Collection, CollectionOptions, CollectionSnapshot, CollectionStatus, DependencyLoader,
    DependencyReport, FetchOutcome, FullListPolicy, ReconcileStrategy, SearchRetention,
};
pub use stream::CollectionStream;

// Record types are part of this crate's API surface.
pub use gestor_api::{FieldErrors, ListQuery, Page, Record, RecordId};
