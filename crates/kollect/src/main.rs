mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        mut global,
        command,
    } = cli;

    let command = match command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "kollect", &mut std::io::stdout());
            return Ok(());
        }
        other => other,
    };

    config::apply_output_defaults(&mut global, &config::load_config_or_default())?;

    match command {
        // Config commands don't need a backend
        Command::Config(args) => commands::config_cmd::handle(args, &global),

        cmd => {
            let dashboard_config = config::resolve(&global)?;
            tracing::debug!(command = ?cmd, backend = %dashboard_config.url, "dispatching command");
            commands::dispatch(cmd, dashboard_config, &global).await
        }
    }
}
