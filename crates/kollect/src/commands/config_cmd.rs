//! Config subcommand handlers.

use dialoguer::{Input, Select};

use kollect_core::SnapshotMode;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# unable to render config: {e}"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let active = config::active_profile_name(global, &cfg);
            let out = output::render_single(&global.output, &cfg, format_config, |_| active.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("kollect configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let backend: String = Input::new()
                .with_prompt("Backend URL")
                .default(kollect_config::DEFAULT_BACKEND.into())
                .validate_with(|input: &String| {
                    kollect_config::parse_backend(input)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let source_choices = &[
                "Bulk inventory (one request per refresh)",
                "Per-platform status (one request per platform)",
            ];
            let source = Select::new()
                .with_prompt("Connection state source")
                .items(source_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let refresh: u64 = Input::new()
                .with_prompt("Refresh interval in seconds (0 disables)")
                .default(30)
                .interact_text()
                .map_err(prompt_err)?;

            let mut profile = Profile::new(backend.trim());
            profile.snapshot_source = if source == 0 {
                SnapshotMode::Bulk
            } else {
                SnapshotMode::PerPlatform
            };
            profile.refresh_interval_secs = Some(refresh);

            let mut cfg = config::load_config_or_default();
            cfg.default_profile = Some(profile_name.clone());
            cfg.profiles.insert(profile_name.clone(), profile);

            let path = config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: kollect status");
            Ok(())
        }
    }
}
