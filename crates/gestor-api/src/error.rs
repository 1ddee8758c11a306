use std::collections::BTreeMap;

use thiserror::Error;

/// Field name -> messages, as returned by the backend on a rejected write.
///
/// Non-field messages are kept under the key the server used
/// (`non_field_errors`, `detail`).
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Top-level error type for the `gestor-api` crate.
///
/// Covers every failure mode of a REST resource call: transport,
/// non-2xx responses, and payload decoding. `gestor-core` maps these
/// into the container's stored error value.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Responses ───────────────────────────────────────────────────
    /// 5xx, or any status without a structured body.
    #[error("Server error (HTTP {status}): {}", preview(.body))]
    Server { status: u16, body: String },

    /// 4xx with a structured field-error body.
    #[error("Validation failed (HTTP {status}): {}", summarize(.field_errors))]
    Validation {
        status: u16,
        field_errors: FieldErrors,
    },

    /// 404 on any resource path.
    #[error("Not found: {path}")]
    NotFound { path: String },

    // ── Caller errors ───────────────────────────────────────────────
    /// The record carries no `id`, so it cannot be addressed.
    #[error("Record has no id; cannot {operation}")]
    MissingId { operation: &'static str },

    /// The resource does not expose this operation.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if no response reached the client.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout { .. } | Self::Tls(_)
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Timeout { .. } => true,
            Self::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the user can fix the input and resubmit.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::MissingId { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Structured field errors, if this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }
}

fn preview(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}

/// One-line rendering: `nome: obrigatório; preco: inválido`.
pub(crate) fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_lists_fields() {
        let mut field_errors = FieldErrors::new();
        field_errors.insert("nome".into(), vec!["Este campo é obrigatório.".into()]);
        field_errors.insert("preco".into(), vec!["Valor inválido.".into(), "Negativo.".into()]);

        let err = Error::Validation {
            status: 400,
            field_errors,
        };
        assert_eq!(
            err.to_string(),
            "Validation failed (HTTP 400): nome: Este campo é obrigatório.; preco: Valor inválido., Negativo."
        );
        assert!(err.is_validation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn server_errors_retry_only_on_5xx() {
        let bad_gateway = Error::Server {
            status: 502,
            body: String::new(),
        };
        let forbidden = Error::Server {
            status: 403,
            body: "nope".into(),
        };
        assert!(bad_gateway.is_retryable());
        assert!(!forbidden.is_retryable());
        assert!(!forbidden.is_network());
    }

    #[test]
    fn timeout_counts_as_network() {
        let err = Error::Timeout { timeout_secs: 5 };
        assert!(err.is_network());
        assert!(err.is_retryable());
    }

    #[test]
    fn server_display_truncates_long_bodies() {
        let err = Error::Server {
            status: 500,
            body: "x".repeat(500),
        };
        assert!(err.to_string().len() < 260);
    }
}
