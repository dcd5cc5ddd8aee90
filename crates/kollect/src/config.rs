//! CLI configuration: thin wrapper around `kollect_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--backend, --source, --insecure, --timeout, --output, --color).

use std::time::Duration;

use clap::ValueEnum;
use kollect_core::{DashboardConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use kollect_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Fill the effective output format and color mode: flag, then the
/// config file's `[defaults]`.
pub fn apply_output_defaults(global: &mut GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    global.output = match global.output_flag {
        Some(ref format) => format.clone(),
        None => parse_default("defaults.output", &cfg.defaults.output)?,
    };
    global.color = match global.color_flag {
        Some(ref mode) => mode.clone(),
        None => parse_default("defaults.color", &cfg.defaults.color)?,
    };
    Ok(())
}

fn parse_default<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw.trim(), true).map_err(|_| CliError::Config {
        message: format!("{field}: unknown value '{raw}'"),
    })
}

/// Build a `DashboardConfig` from the config file, profile, and flags.
///
/// Flag overrides take priority over profile values. `--backend` alone is
/// enough to run without any config file.
pub fn resolve(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match (cfg.profile(&profile_name), &global.backend) {
        (Ok(profile), _) => profile,
        // An unknown profile is fine when the backend is given explicitly.
        (Err(_), Some(backend)) if global.profile.is_none() => Profile::new(backend.clone()),
        (Err(e), _) => return Err(e.into()),
    };

    resolve_profile(&profile, &cfg, global)
}

/// Translate a `Profile` + global flags into a `DashboardConfig`.
pub fn resolve_profile(
    profile: &Profile,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<DashboardConfig, CliError> {
    let mut dashboard = kollect_config::profile_to_dashboard_config(profile, &cfg.defaults)?;

    // 1. Backend URL (flag > env > profile)
    if let Some(ref backend) = global.backend {
        dashboard.url = kollect_config::parse_backend(backend)?;
    }

    // 2. Snapshot source
    if let Some(source) = global.source {
        dashboard.snapshot_mode = source.into();
    }

    // 3. TLS verification
    if global.insecure {
        dashboard.tls = TlsVerification::DangerAcceptInvalid;
    }

    // 4. Timeout
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        dashboard.timeout = Duration::from_secs(secs);
    }

    Ok(dashboard)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, ColorMode, OutputFormat};

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["kollect"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn config_defaults_apply_without_flags() {
        let mut cfg = Config::default();
        cfg.defaults.output = "json".into();
        cfg.defaults.color = "never".into();

        let mut opts = global(&[]);
        apply_output_defaults(&mut opts, &cfg).unwrap();
        assert_eq!(opts.output, OutputFormat::Json);
        assert_eq!(opts.color, ColorMode::Never);
    }

    #[test]
    fn flags_beat_config_defaults() {
        let mut cfg = Config::default();
        cfg.defaults.output = "json".into();

        let mut opts = global(&["-o", "plain", "--color", "always"]);
        apply_output_defaults(&mut opts, &cfg).unwrap();
        assert_eq!(opts.output, OutputFormat::Plain);
        assert_eq!(opts.color, ColorMode::Always);
    }

    #[test]
    fn unknown_config_default_is_a_config_error() {
        let mut cfg = Config::default();
        cfg.defaults.output = "xml".into();

        let mut opts = global(&[]);
        let err = apply_output_defaults(&mut opts, &cfg).unwrap_err();
        assert!(matches!(err, CliError::Config { ref message } if message.contains("defaults.output")));
    }
}
