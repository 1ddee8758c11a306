// REST HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, JSON verbs, and the
// status-code mapping shared by every resource adapter. Resource paths
// are relative (`produtos/`, `produtos/7/`); the base URL carries the
// API root (e.g. `http://localhost:8000/api/`).

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, FieldErrors};
use crate::transport::TransportConfig;

/// Raw HTTP client for the backend's REST resources.
///
/// Cheap to clone; `reqwest::Client` is reference-counted internally.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl RestClient {
    /// Create a client from a base URL and a `TransportConfig`.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout_secs: 0,
        })
    }

    /// The API root every resource path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ensure the path ends in `/` so relative joins append instead of replace.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative resource path onto the base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    pub async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    pub async fn put_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        if body.trim().is_empty() {
            trace!(%status, "empty success body");
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let path = resp.url().path().to_owned();
        let raw = resp.text().await.unwrap_or_default();
        error_from_status(status.as_u16(), &path, raw)
    }
}

/// Map a non-2xx response onto the error taxonomy.
///
/// 404 is always `NotFound`; other 4xx answers carrying a JSON object
/// become `Validation`; everything else is `Server`.
pub(crate) fn error_from_status(status: u16, path: &str, raw: String) -> Error {
    if status == 404 {
        return Error::NotFound {
            path: path.to_owned(),
        };
    }

    if (400..500).contains(&status) {
        if let Some(field_errors) = parse_field_errors(&raw) {
            return Error::Validation {
                status,
                field_errors,
            };
        }
    }

    Error::Server { status, body: raw }
}

/// Parse a Django-REST style error body: `{field: [msg, ...] | msg}`.
fn parse_field_errors(raw: &str) -> Option<FieldErrors> {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
        return None;
    };
    if map.is_empty() {
        return None;
    }

    let errors = map
        .into_iter()
        .map(|(field, value)| {
            let messages = match value {
                Value::String(s) => vec![s],
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
                other => vec![other.to_string()],
            };
            (field, messages)
        })
        .collect();
    Some(errors)
}
