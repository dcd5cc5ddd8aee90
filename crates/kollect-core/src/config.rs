// ── Runtime dashboard configuration ──
//
// These types describe *how* to reach the aggregator backend and how
// often to reconcile. They never touch disk: the CLI builds a
// `DashboardConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Where platform state is read from on every pass.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SnapshotMode {
    /// One `GET /api/data` covering every platform.
    #[default]
    Bulk,
    /// One `GET /api/{platform}/status` per platform, fetched concurrently.
    PerPlatform,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one dashboard session.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend base URL (e.g. `http://localhost:8080`).
    pub url: Url,
    pub snapshot_mode: SnapshotMode,
    pub tls: TlsVerification,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Upper bound on each snapshot or status fetch within a pass.
    pub fetch_timeout: Duration,
    /// Time between timer-triggered passes. Zero disables the timer.
    pub refresh_interval: Duration,
}

impl DashboardConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

    pub fn new(url: Url) -> Self {
        Self {
            url,
            snapshot_mode: SnapshotMode::default(),
            tls: TlsVerification::default(),
            timeout: Self::DEFAULT_TIMEOUT,
            fetch_timeout: Self::DEFAULT_FETCH_TIMEOUT,
            refresh_interval: Self::DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub(crate) fn transport(&self) -> kollect_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => kollect_api::TlsMode::System,
            TlsVerification::CustomCa(path) => kollect_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => kollect_api::TlsMode::DangerAcceptInvalid,
        };
        kollect_api::TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
