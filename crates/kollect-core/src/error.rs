// ── Core error types ──
//
// User-facing errors from kollect-core. Consumers never see HTTP status
// codes or raw JSON failures directly; the `From<kollect_api::Error>` impl
// folds transport-layer errors into the reconciliation taxonomy.

use thiserror::Error;

use crate::model::{ActionKind, Platform};

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Snapshot errors ──────────────────────────────────────────────
    /// The backend could not be reached, answered with a server error,
    /// or did not answer within the fetch timeout.
    #[error("Fetch failed: {message}")]
    Fetch { message: String },

    /// A payload arrived but could not be interpreted.
    #[error("Malformed backend payload: {message}")]
    Parse { message: String },

    // ── Action errors ────────────────────────────────────────────────
    /// The backend rejected submitted credentials or a disconnect.
    #[error("Rejected by backend: {message}")]
    Auth { message: String },

    /// Another action for the same platform has not finished yet.
    #[error("A {pending} request for {platform} is already in progress")]
    Busy {
        platform: Platform,
        pending: ActionKind,
    },

    /// A required local tool is missing on the backend host.
    #[error("{tool} is not installed on the backend host; {fallback}")]
    ToolingMissing { tool: String, fallback: String },

    /// Credentials failed local validation before any network call.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: &str, reason: &str) -> Self {
        Self::Validation {
            field: field.to_owned(),
            reason: reason.to_owned(),
        }
    }

    /// Returns `true` for `Busy`.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<kollect_api::Error> for CoreError {
    fn from(err: kollect_api::Error) -> Self {
        match err {
            kollect_api::Error::Rejected { message, .. } => CoreError::Auth { message },
            kollect_api::Error::Deserialization { message, body: _ } => {
                CoreError::Parse { message }
            }
            kollect_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            kollect_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            kollect_api::Error::File { path, source } => CoreError::Validation {
                field: "kubeconfig".into(),
                reason: format!("cannot read {path}: {source}"),
            },
            kollect_api::Error::Timeout { timeout_ms } => CoreError::Fetch {
                message: format!("timed out after {timeout_ms}ms"),
            },
            kollect_api::Error::Backend { status, message } => CoreError::Fetch {
                message: format!("HTTP {status}: {message}"),
            },
            kollect_api::Error::Transport(e) => CoreError::Fetch {
                message: e.to_string(),
            },
        }
    }
}
