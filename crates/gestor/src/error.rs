//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use gestor_config::ConfigError;
use gestor_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the backend: {reason}")]
    #[diagnostic(
        code(gestor::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             Point at another one with --base-url or `base_url` in the config file.\n\
             Use --insecure (-k) for self-signed certificates."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out: {reason}")]
    #[diagnostic(
        code(gestor::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { reason: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(gestor::not_found),
        help("Run: gestor {list_command} to see available records")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("The backend rejected the record")]
    #[diagnostic(code(gestor::rejected), help("{details}"))]
    Rejected { details: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(gestor::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response: {message}")]
    #[diagnostic(code(gestor::decode))]
    Decode { message: String },

    // ── Unsupported ──────────────────────────────────────────────────

    #[error("Operation '{operation}' is not available for {resource}")]
    #[diagnostic(
        code(gestor::unsupported),
        help("Run: gestor entities to see which writes each entity accepts.")
    )]
    Unsupported { resource: String, operation: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(gestor::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(gestor::config_exists),
        help("Pass --force to overwrite it, or edit it directly.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(gestor::config),
        help("Check the config file (gestor config path) and GESTOR_* variables.")
    )]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(gestor::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(gestor::json), help("Check the JSON payload and try again."))]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    #[diagnostic(code(gestor::internal))]
    Internal(String),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Unsupported { .. } => exit_code::PERMISSION,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ConfigExists { .. }
            | Self::Config(_)
            | Self::Json(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network {
                message,
                timed_out: true,
            } => CliError::Timeout { reason: message },

            CoreError::Network { message, .. } => CliError::ConnectionFailed { reason: message },

            CoreError::Server { status, body } => CliError::ApiError {
                status,
                message: preview(&body),
            },

            CoreError::Validation { field_errors } => CliError::Rejected {
                details: field_errors
                    .iter()
                    .map(|(field, messages)| format!("{field}: {}", messages.join("; ")))
                    .collect::<Vec<_>>()
                    .join("\n"),
            },

            CoreError::MissingId { operation } => CliError::Validation {
                field: "id".into(),
                reason: format!("the record has no id; cannot {operation}"),
            },

            CoreError::NotFound { path } => CliError::NotFound {
                resource_type: "record".into(),
                identifier: path,
                list_command: "<entity> list".into(),
            },

            CoreError::Unsupported {
                resource,
                operation,
            } => CliError::Unsupported {
                resource,
                operation,
            },

            CoreError::Decode { message } => CliError::Decode { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

/// First line of a response body, capped for display.
fn preview(body: &str) -> String {
    const MAX: usize = 200;
    let line = body.lines().next().unwrap_or_default().trim();
    if line.is_empty() {
        return "(empty body)".into();
    }
    match line.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &line[..cut]),
        None => line.to_owned(),
    }
}
