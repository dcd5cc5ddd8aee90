use thiserror::Error;

/// Top-level error type for the `kollect-api` crate.
///
/// Covers every failure mode of the aggregator backend surface:
/// transport, rejected requests, and malformed payloads.
/// `kollect-core` maps these into its reconciliation error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The client-side request timeout elapsed.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// The backend rejected a configure/disconnect/chat request.
    ///
    /// `message` is the human-readable text from the `{error}` or
    /// `{message}` body field when present.
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend answered with a non-success status on a read endpoint.
    #[error("Backend error (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Local file could not be read (kubeconfig upload).
    #[error("Failed to read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
