//! Configure and disconnect handlers.

use kollect_core::{Ack, ActionKind, Dashboard, KubeconfigSource, Platform, PlatformCredentials};

use crate::cli::{ConfigureArgs, ConfigureCommand, DisconnectArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Credential collection ───────────────────────────────────────────

fn credentials(cmd: ConfigureCommand) -> Result<PlatformCredentials, CliError> {
    Ok(match cmd {
        ConfigureCommand::Aws {
            access_key,
            secret_key,
        } => PlatformCredentials::Aws {
            access_key: util::text_or_prompt(access_key, "Access key ID", "access-key")?,
            secret_key: util::secret_or_prompt(secret_key, "Secret access key", "secret-key")?,
        },
        ConfigureCommand::Azure {
            subscription_id,
            tenant_id,
            client_id,
            client_secret,
        } => PlatformCredentials::Azure {
            subscription_id: util::text_or_prompt(
                subscription_id,
                "Subscription ID",
                "subscription-id",
            )?,
            tenant_id: util::text_or_prompt(tenant_id, "Tenant ID", "tenant-id")?,
            client_id: util::text_or_prompt(client_id, "Client ID", "client-id")?,
            client_secret: util::secret_or_prompt(client_secret, "Client secret", "client-secret")?,
        },
        ConfigureCommand::AzureCli => PlatformCredentials::AzureCli,
        ConfigureCommand::Kubernetes { kubeconfig, path } => {
            PlatformCredentials::Kubernetes(match (kubeconfig, path) {
                (Some(file), _) => KubeconfigSource::from_file(&file)?,
                (None, Some(path)) => KubeconfigSource::BackendPath(path),
                (None, None) => {
                    return Err(CliError::MissingInput {
                        field: "kubeconfig".into(),
                        flag: "kubeconfig".into(),
                    });
                }
            })
        }
        ConfigureCommand::Veeam {
            server_url,
            username,
            password,
        } => PlatformCredentials::Veeam {
            server_url: util::text_or_prompt(server_url, "Server URL", "server-url")?,
            username: util::text_or_prompt(username, "Username", "username")?,
            password: util::secret_or_prompt(password, "Password", "password")?,
        },
    })
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn configure(
    dashboard: &Dashboard,
    args: ConfigureArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let credentials = credentials(args.command)?;
    let platform = credentials.platform();
    let ack = dashboard.configure(platform, &credentials).await?;
    report(dashboard, &ack, global)
}

pub async fn disconnect(
    dashboard: &Dashboard,
    args: DisconnectArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let platform = Platform::from(args.platform);
    let prompt = format!("Do you want to disconnect from {}?", platform.label());
    if !util::confirm(&prompt, "disconnect", global.yes)? {
        return Ok(());
    }
    let ack = dashboard.disconnect(platform).await?;
    report(dashboard, &ack, global)
}

fn report(dashboard: &Dashboard, ack: &Ack, global: &GlobalOpts) -> Result<(), CliError> {
    let board = dashboard.board();
    let state = board.state(ack.platform);
    let color = output::should_color(&global.color);

    let out = output::render_single(
        &global.output,
        ack,
        |a| {
            let verb = match a.action {
                ActionKind::Configure => "configured",
                ActionKind::Disconnect => "disconnected",
            };
            let mut text = format!("✓ {} {verb}", a.platform.label());
            if let Some(ref message) = a.message {
                text.push_str(&format!(": {message}"));
            }
            if let Some(state) = state {
                text.push_str(&format!("\n  state: {}", output::paint_state(state, color)));
            }
            text
        },
        |a| a.platform.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
