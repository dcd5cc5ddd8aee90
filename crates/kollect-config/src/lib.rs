//! Profile configuration for the kollect CLI.
//!
//! TOML profiles merged with `KOLLECT_` environment overrides, and
//! translation into `kollect_core::DashboardConfig`. The core never reads
//! files; the CLI layers its flag overrides on top of what this crate
//! resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kollect_core::{DashboardConfig, SnapshotMode, TlsVerification};

/// Backend address used when no profile names one.
pub const DEFAULT_BACKEND: &str = "http://localhost:8080";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

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
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Explicit name, then the configured default, then `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// Look up a profile. The `default` profile always exists: when the
    /// file does not define it, it points at [`DEFAULT_BACKEND`].
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == "default" => Ok(Profile::default()),
            None => Err(ConfigError::UnknownProfile {
                profile: name.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Aggregator backend base URL (e.g., "http://localhost:8080").
    pub backend: String,

    /// `bulk` reads `/api/data`; `per-platform` reads `/api/{platform}/status`.
    #[serde(default)]
    pub snapshot_source: SnapshotMode,

    /// Seconds between background passes. Zero disables the timer.
    pub refresh_interval_secs: Option<u64>,

    /// Upper bound on each fetch within a pass.
    pub fetch_timeout_secs: Option<u64>,

    /// Per-request HTTP timeout.
    pub timeout: Option<u64>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND)
    }
}

impl Profile {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            snapshot_source: SnapshotMode::default(),
            refresh_interval_secs: None,
            fetch_timeout_secs: None,
            timeout: None,
            ca_cert: None,
            insecure: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "kollect", "kollect").map_or_else(
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
    p.push("kollect");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// Environment keys nest on double underscores, so
/// `KOLLECT_PROFILES__LAB__BACKEND` sets `profiles.lab.backend`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("KOLLECT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or unreadable.
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

/// Build a `DashboardConfig` from a profile, with no flag overrides.
pub fn profile_to_dashboard_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<DashboardConfig, ConfigError> {
    let url = parse_backend(&profile.backend)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = DashboardConfig::new(url);
    config.snapshot_mode = profile.snapshot_source;
    config.tls = tls;
    config.timeout = positive_secs("timeout", profile.timeout.unwrap_or(defaults.timeout))?;
    if let Some(secs) = profile.fetch_timeout_secs {
        config.fetch_timeout = positive_secs("fetch_timeout_secs", secs)?;
    }
    if let Some(secs) = profile.refresh_interval_secs {
        config.refresh_interval = Duration::from_secs(secs);
    }
    Ok(config)
}

/// Parse and check a backend base URL.
pub fn parse_backend(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.trim().parse().map_err(|_| ConfigError::Validation {
        field: "backend".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "backend".into(),
            reason: format!("expected an http or https URL, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn positive_secs(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(Duration::from_secs(secs))
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
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profiles_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
default_profile = "lab"

[profiles.lab]
backend = "http://10.0.0.5:8080"
snapshot_source = "per-platform"
refresh_interval_secs = 0
fetch_timeout_secs = 5
"#,
        );

        let cfg = load_config_from(&path).unwrap();
        let name = cfg.active_profile_name(None);
        assert_eq!(name, "lab");

        let profile = cfg.profile(&name).unwrap();
        assert_eq!(profile.snapshot_source, SnapshotMode::PerPlatform);

        let dash = profile_to_dashboard_config(&profile, &cfg.defaults).unwrap();
        assert_eq!(dash.url.as_str(), "http://10.0.0.5:8080/");
        assert_eq!(dash.refresh_interval, Duration::ZERO);
        assert_eq!(dash.fetch_timeout, Duration::from_secs(5));
        assert_eq!(dash.timeout, Duration::from_secs(30));
        assert_eq!(dash.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn explicit_profile_name_wins() {
        let cfg = Config::default();
        assert_eq!(cfg.active_profile_name(Some("prod")), "prod");
        assert!(matches!(
            cfg.profile("prod"),
            Err(ConfigError::UnknownProfile { .. })
        ));
        assert_eq!(cfg.profile("default").unwrap().backend, DEFAULT_BACKEND);
    }

    #[test]
    fn insecure_takes_precedence_over_ca_cert() {
        let mut profile = Profile::new("https://kollect.internal");
        profile.ca_cert = Some(PathBuf::from("/etc/ca.pem"));
        let dash = profile_to_dashboard_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(
            dash.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ca.pem"))
        );

        profile.insecure = Some(true);
        let dash = profile_to_dashboard_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(dash.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn rejects_bad_backend_and_zero_timeouts() {
        assert!(parse_backend("not a url").is_err());
        assert!(parse_backend("ftp://host").is_err());

        let mut profile = Profile::default();
        profile.fetch_timeout_secs = Some(0);
        let err = profile_to_dashboard_config(&profile, &Defaults::default()).unwrap_err();
        assert!(err.to_string().contains("fetch_timeout_secs"));
    }

    #[test]
    fn save_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new("http://127.0.0.1:9000"));
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles, cfg.profiles);
    }
}
