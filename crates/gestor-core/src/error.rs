// ── Core error types ──
//
// The value a collection stores as its last error and hands back to
// callers. Unlike `gestor_api::Error` it is `Clone` and carries no
// transport handles, so it can live inside a published snapshot.

use thiserror::Error;

use gestor_api::FieldErrors;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Retryable ────────────────────────────────────────────────────
    /// No response reached the client (refused, DNS, TLS, timeout).
    #[error("Network error: {message}")]
    Network { message: String, timed_out: bool },

    /// 5xx or an unexpected status.
    #[error("Server error (HTTP {status})")]
    Server { status: u16, body: String },

    // ── User-fixable ─────────────────────────────────────────────────
    /// 4xx with field messages; the form should stay open.
    #[error("Validation failed: {}", render_fields(.field_errors))]
    Validation { field_errors: FieldErrors },

    /// The record has no identifier.
    #[error("Record has no id; cannot {operation}")]
    MissingId { operation: String },

    // ── Other ────────────────────────────────────────────────────────
    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Operation '{operation}' is not available for {resource}")]
    Unsupported { resource: String, operation: String },

    #[error("Unexpected response: {message}")]
    Decode { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Transport and server failures; worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Input problems; retrying without changes will fail again.
    pub fn is_user_fixable(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::MissingId { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { field_errors } => Some(field_errors),
            _ => None,
        }
    }

    pub(crate) fn timed_out(after: std::time::Duration) -> Self {
        Self::Network {
            message: format!("request timed out after {}ms", after.as_millis()),
            timed_out: true,
        }
    }

    /// Attach the resource name to an `Unsupported` coming from the API layer.
    pub(crate) fn for_resource(self, resource: &str) -> Self {
        match self {
            Self::Unsupported { operation, .. } => Self::Unsupported {
                resource: resource.to_owned(),
                operation,
            },
            other => other,
        }
    }
}

fn render_fields(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<gestor_api::Error> for CoreError {
    fn from(err: gestor_api::Error) -> Self {
        match err {
            gestor_api::Error::Transport(ref e) => CoreError::Network {
                message: e.to_string(),
                timed_out: e.is_timeout(),
            },
            gestor_api::Error::Timeout { timeout_secs } => CoreError::Network {
                message: format!("request timed out after {timeout_secs}s"),
                timed_out: true,
            },
            gestor_api::Error::Tls(msg) => CoreError::Network {
                message: format!("TLS error: {msg}"),
                timed_out: false,
            },
            gestor_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            gestor_api::Error::Server { status, body } => CoreError::Server { status, body },
            gestor_api::Error::Validation { field_errors, .. } => {
                CoreError::Validation { field_errors }
            }
            gestor_api::Error::NotFound { path } => CoreError::NotFound { path },
            gestor_api::Error::MissingId { operation } => CoreError::MissingId {
                operation: operation.to_owned(),
            },
            gestor_api::Error::UnsupportedOperation(op) => CoreError::Unsupported {
                resource: String::new(),
                operation: op.to_owned(),
            },
            gestor_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_timeout_becomes_network_error() {
        let err = CoreError::from(gestor_api::Error::Timeout { timeout_secs: 3 });
        assert!(matches!(err, CoreError::Network { timed_out: true, .. }));
        assert!(err.is_retryable());
        assert!(!err.is_user_fixable());
    }

    #[test]
    fn validation_is_user_fixable_not_retryable() {
        let mut field_errors = FieldErrors::new();
        field_errors.insert("nome".into(), vec!["obrigatório".into()]);
        let err = CoreError::from(gestor_api::Error::Validation {
            status: 400,
            field_errors,
        });
        assert!(err.is_user_fixable());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Validation failed: nome: obrigatório");
    }

    #[test]
    fn client_side_server_errors_are_not_retryable() {
        let err = CoreError::from(gestor_api::Error::Server {
            status: 409,
            body: String::new(),
        });
        assert!(!err.is_retryable());
    }

    #[test]
    fn unsupported_gets_resource_name() {
        let err = CoreError::from(gestor_api::Error::UnsupportedOperation("delete"))
            .for_resource("estoques");
        assert_eq!(
            err.to_string(),
            "Operation 'delete' is not available for estoques"
        );
    }
}
