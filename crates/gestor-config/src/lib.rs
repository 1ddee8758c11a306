//! Shared configuration for the Gestor CLI.
//!
//! A TOML file plus `GESTOR_*` environment variables, translated into
//! `gestor_core::SessionConfig`. The CLI layers its own flag overrides
//! on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gestor_core::{
    DEFAULT_BASE_URL, Entity, EntityTuning, FullListPolicy, ReconcileStrategy, SearchRetention,
    SessionConfig, TlsVerification,
};

/// Environment variable that points at an alternate config file.
pub const CONFIG_PATH_ENV: &str = "GESTOR_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// API root of the backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP client timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Upper bound on a single collection action, in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Default output format for the CLI.
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub search_retention: SearchRetention,

    #[serde(default)]
    pub full_list: FullListPolicy,

    /// Per-entity overrides keyed by entity name (`product`, `payment-method`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entities: BTreeMap<String, EntityOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            request_timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            output: default_output(),
            search_retention: SearchRetention::default(),
            full_list: FullListPolicy::default(),
            entities: BTreeMap::new(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_output() -> String {
    "table".into()
}

/// Overrides for one entity's collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntityOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconcile: Option<ReconcileStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_retention: Option<SearchRetention>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_list: Option<FullListPolicy>,
}

impl From<&EntityOverride> for EntityTuning {
    fn from(o: &EntityOverride) -> Self {
        Self {
            ordering: o.ordering.clone(),
            reconcile: o.reconcile,
            search_retention: o.search_retention,
            full_list: o.full_list,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `GESTOR_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("app", "gestor", "gestor").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("gestor");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the file at `path`, then `GESTOR_*` variables.
///
/// Nested keys use a double underscore:
/// `GESTOR_ENTITIES__PRODUCT__ORDERING=nome`.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GESTOR_").ignore(&["config"]).split("__"))
}

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Build a `SessionConfig`, validating the URL and entity names.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        let url: url::Url = self.base_url.parse().map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {}", self.base_url),
        })?;

        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        let mut entities = BTreeMap::new();
        for (name, tuning) in &self.entities {
            entities.insert(parse_entity(name)?, EntityTuning::from(tuning));
        }

        Ok(SessionConfig {
            url,
            tls,
            timeout: Duration::from_secs(self.timeout),
            request_timeout: Duration::from_secs(self.request_timeout),
            search_retention: self.search_retention,
            full_list: self.full_list,
            entities,
        })
    }
}

/// Accept both `payment-method` and the env-friendly `payment_method`.
fn parse_entity(name: &str) -> Result<Entity, ConfigError> {
    Entity::from_str(&name.replace('_', "-")).map_err(|_| ConfigError::Validation {
        field: format!("entities.{name}"),
        reason: "unknown entity".into(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, 30);
        assert_eq!(config.output, "table");
    }

    #[test]
    fn file_values_and_entity_tables_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
base_url = "https://erp.example.com/api"
request_timeout = 5
search_retention = "retain"

[entities.product]
ordering = "nome"
full_list = "keep"

[entities.payment_method]
reconcile = "patch"
"#,
        );

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.request_timeout, 5);
        assert_eq!(config.search_retention, SearchRetention::Retain);

        let session = config.to_session_config().unwrap();
        assert_eq!(session.url.as_str(), "https://erp.example.com/api");
        assert_eq!(session.request_timeout, Duration::from_secs(5));

        let product = session.collection_options(Entity::Product);
        assert_eq!(product.default_ordering.as_deref(), Some("nome"));
        assert_eq!(product.full_list, FullListPolicy::Keep);
        assert_eq!(product.search_retention, SearchRetention::Retain);

        let methods = session.collection_options(Entity::PaymentMethod);
        assert_eq!(methods.reconcile, ReconcileStrategy::Patch);
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let config = Config {
            entities: BTreeMap::from([("widgets".to_owned(), EntityOverride::default())]),
            ..Config::default()
        };
        let err = config.to_session_config().unwrap_err();
        assert!(err.to_string().contains("entities.widgets"));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let config = Config {
            base_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.to_session_config(),
            Err(ConfigError::Validation { ref field, .. }) if field == "base_url"
        ));
    }

    #[test]
    fn tls_prefers_insecure_over_ca() {
        let config = Config {
            insecure: true,
            ca_cert: Some("/etc/ssl/gestor.pem".into()),
            ..Config::default()
        };
        assert_eq!(
            config.to_session_config().unwrap().tls,
            TlsVerification::DangerAcceptInvalid
        );
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            base_url: "http://10.0.0.5:8000/api".into(),
            entities: BTreeMap::from([(
                "sale".to_owned(),
                EntityOverride {
                    reconcile: Some(ReconcileStrategy::Patch),
                    ..EntityOverride::default()
                },
            )]),
            ..Config::default()
        };

        save_config_to(&config, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }
}
