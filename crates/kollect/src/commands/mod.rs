//! Command dispatch: bridges CLI args -> dashboard calls -> output formatting.

pub mod actions;
pub mod chat;
pub mod config_cmd;
pub mod inventory;
pub mod status;
pub mod util;

use kollect_core::{Dashboard, DashboardConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: DashboardConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(config, global).await,
        Command::Watch(args) => status::watch(config, args, global).await,
        cmd => {
            let dashboard = Dashboard::new(config)?;
            match cmd {
                Command::Configure(args) => actions::configure(&dashboard, args, global).await,
                Command::Disconnect(args) => actions::disconnect(&dashboard, args, global).await,
                Command::Inventory(args) => inventory::handle(&dashboard, args, global).await,
                Command::Chat(args) => chat::handle(&dashboard, args, global).await,
                // Handled before dispatch
                Command::Status
                | Command::Watch(_)
                | Command::Config(_)
                | Command::Completions(_) => unreachable!(),
            }
        }
    }
}
