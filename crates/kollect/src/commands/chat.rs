//! Chat relay handler.

use kollect_core::{ChatReply, Dashboard};

use crate::cli::{ChatArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    dashboard: &Dashboard,
    args: ChatArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let message = args.message.join(" ");
    let spinner = util::spinner(global, "Waiting for the assistant...");
    let reply = dashboard.chat(&message).await;
    spinner.finish_and_clear();
    let reply = reply?;

    let out = output::render_single(
        &global.output,
        &reply,
        |r: &ChatReply| r.response.clone(),
        |r: &ChatReply| r.response.clone(),
    )?;
    output::print_output(&out, global.quiet);

    if reply.update_ui && !global.quiet {
        eprintln!("(platform state refreshed; run `kollect status` to see it)");
    }
    Ok(())
}
