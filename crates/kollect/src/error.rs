//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use kollect_config::ConfigError;
use kollect_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const UNAVAILABLE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the kollect backend: {message}")]
    #[diagnostic(
        code(kollect::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             Point at another one with --backend or set it in your profile."
        )
    )]
    ConnectionFailed { message: String },

    #[error("Backend sent data that could not be read: {message}")]
    #[diagnostic(code(kollect::malformed_response))]
    Malformed { message: String },

    // ── Actions ──────────────────────────────────────────────────────
    #[error("Rejected by backend: {message}")]
    #[diagnostic(
        code(kollect::rejected),
        help("Check the credentials and try again.")
    )]
    Rejected { message: String },

    #[error("{platform} already has a {pending} in progress")]
    #[diagnostic(
        code(kollect::busy),
        help("Wait for the running action to finish, then retry.")
    )]
    Busy { platform: String, pending: String },

    #[error("{tool} is not available on the backend host")]
    #[diagnostic(code(kollect::tooling_missing), help("{fallback}"))]
    ToolingMissing { tool: String, fallback: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(kollect::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(kollect::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: kollect config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(kollect::config),
        help("Inspect the file with: kollect config show")
    )]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(kollect::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Missing {field}")]
    #[diagnostic(
        code(kollect::missing_input),
        help("Pass it with --{flag}, or run in a terminal to be prompted.")
    )]
    MissingInput { field: String, flag: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(kollect::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Malformed { .. } => exit_code::CONNECTION,
            Self::Rejected { .. } => exit_code::AUTH,
            Self::Busy { .. } => exit_code::CONFLICT,
            Self::ToolingMissing { .. } => exit_code::UNAVAILABLE,
            Self::Validation { .. }
            | Self::MissingInput { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::Config { .. } => exit_code::USAGE,
            Self::Internal(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Fetch { message } => Self::ConnectionFailed { message },
            CoreError::Parse { message } => Self::Malformed { message },
            CoreError::Auth { message } => Self::Rejected { message },
            CoreError::Busy { platform, pending } => Self::Busy {
                platform: platform.label().into(),
                pending: pending.to_string(),
            },
            CoreError::ToolingMissing { tool, fallback } => Self::ToolingMissing { tool, fallback },
            CoreError::Validation { field, reason } => Self::Validation { field, reason },
            CoreError::Config { message } => Self::Config { message },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { profile } => {
                let cfg = kollect_config::load_config_or_default();
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                Self::ProfileNotFound {
                    name: profile,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                }
            }
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
