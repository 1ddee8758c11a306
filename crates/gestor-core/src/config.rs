// ── Runtime session configuration ──
//
// Describes *where* the backend lives and how each collection behaves.
// Never touches disk: the CLI builds a `SessionConfig` and hands it in.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use gestor_api::{TlsMode, TransportConfig};

use crate::catalog::Entity;
use crate::store::{
    CollectionOptions, DEFAULT_REQUEST_TIMEOUT, FullListPolicy, ReconcileStrategy, SearchRetention,
};

/// Development backend address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

impl From<TlsVerification> for TlsMode {
    fn from(tls: TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Per-entity overrides on top of the catalog's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTuning {
    pub ordering: Option<String>,
    pub reconcile: Option<ReconcileStrategy>,
    pub search_retention: Option<SearchRetention>,
    pub full_list: Option<FullListPolicy>,
}

/// Everything needed to open a [`Session`](crate::Session).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// API root, e.g. `http://localhost:8000/api`.
    pub url: Url,
    pub tls: TlsVerification,
    /// HTTP client timeout.
    pub timeout: Duration,
    /// Upper bound for any single collection action.
    pub request_timeout: Duration,
    pub search_retention: SearchRetention,
    pub full_list: FullListPolicy,
    pub entities: BTreeMap<Entity, EntityTuning>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            search_retention: SearchRetention::default(),
            full_list: FullListPolicy::default(),
            entities: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            ..Self::default()
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone().into(),
            ..TransportConfig::default()
        }
        .with_timeout(self.timeout)
    }

    /// Catalog defaults, then session-wide settings, then entity overrides.
    pub fn collection_options(&self, entity: Entity) -> CollectionOptions {
        let tuning = self.entities.get(&entity).cloned().unwrap_or_default();

        let mut options = CollectionOptions::default()
            .with_reconcile(tuning.reconcile.unwrap_or_else(|| entity.reconcile()))
            .with_search_retention(tuning.search_retention.unwrap_or(self.search_retention))
            .with_full_list(tuning.full_list.unwrap_or(self.full_list))
            .with_request_timeout(self.request_timeout);

        if let Some(ordering) = tuning
            .ordering
            .or_else(|| entity.default_ordering().map(str::to_owned))
        {
            options = options.with_ordering(ordering);
        }
        options
    }
}
