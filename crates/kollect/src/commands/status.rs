//! Status and watch handlers.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use kollect_core::{
    BoardView, ConnectionState, Dashboard, DashboardConfig, Indicator, IndicatorAction, Platform,
    Reason,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct IndicatorRow {
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Since")]
    since: String,
}

impl IndicatorRow {
    fn new(indicator: &Indicator, color: bool) -> Self {
        Self {
            platform: indicator.platform.label().into(),
            state: output::paint_state(indicator.state, color),
            reason: indicator.reason.to_string(),
            action: action_hint(indicator.action),
            since: local_time(indicator.changed_at),
        }
    }
}

fn action_hint(action: IndicatorAction) -> String {
    match action {
        IndicatorAction::OpenConfiguration(p) => format!("kollect configure {p}"),
        IndicatorAction::ConfirmDisconnect(p) => format!("kollect disconnect {p}"),
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

// ── Status ──────────────────────────────────────────────────────────

pub async fn handle(config: DashboardConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let spinner = util::spinner(global, "Checking platform connections...");
    let board = Dashboard::oneshot(config, |dashboard| async move { Ok(dashboard.board()) }).await;
    spinner.finish_and_clear();
    let board = board?;

    let indicators: Vec<&Indicator> = board.indicators.values().collect();
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &indicators,
        |i| IndicatorRow::new(i, color),
        |i| format!("{} {}", i.platform, i.state),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Watch ───────────────────────────────────────────────────────────

/// One indicator transition, as printed by `watch`.
#[derive(Debug, Serialize)]
struct Change<'a> {
    at: DateTime<Utc>,
    platform: Platform,
    from: ConnectionState,
    to: ConnectionState,
    reason: &'a Reason,
}

fn changes<'a>(previous: &BoardView, current: &'a BoardView) -> Vec<Change<'a>> {
    current
        .indicators
        .values()
        .filter_map(|now| {
            let before = previous.state(now.platform)?;
            (before != now.state).then_some(Change {
                at: now.changed_at,
                platform: now.platform,
                from: before,
                to: now.state,
                reason: &now.reason,
            })
        })
        .collect()
}

fn render_change(change: &Change<'_>, format: &OutputFormat, color: bool) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(format!(
            "{}  {:<10}  {} -> {}  ({})",
            local_time(change.at),
            change.platform.label(),
            output::paint_state(change.from, color),
            output::paint_state(change.to, color),
            change.reason
        )),
        OutputFormat::Plain => Ok(format!("{} {}", change.platform, change.to)),
        // One JSON document per line so the stream can be piped.
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            output::render_json(change, true)
        }
    }
}

pub async fn watch(
    mut config: DashboardConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(secs) = args.interval {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        config.refresh_interval = Duration::from_secs(secs);
    }

    let dashboard = Dashboard::new(config)?;
    let mut rx = dashboard.indicators();
    let mut previous = rx.borrow_and_update().clone();
    let color = output::should_color(&global.color);

    dashboard.start().await;
    if !global.quiet && matches!(global.output, OutputFormat::Table) {
        eprintln!("Watching {} (Ctrl-C to stop)", dashboard.config().url);
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = rx.borrow_and_update().clone();
                for change in changes(&previous, &current) {
                    output::print_output(&render_change(&change, &global.output, color)?, global.quiet);
                }
                previous = current;
            }
        }
    }

    dashboard.shutdown().await;
    Ok(())
}
