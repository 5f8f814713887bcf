//! Periodic polling handler built on the coordinator.

use std::time::Duration;

use owo_colors::OwoColorize;

use apcups_core::{MAX_POLL_INTERVAL, MIN_POLL_INTERVAL, PollConfig, PollStatus, UpsCoordinator};
use apcups_snmp::UpsSnmpClient;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::data;

pub async fn handle(
    client: UpsSnmpClient,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let sensors = data::selected_sensors(&args.select.sensors)?;
    let include_binary = args.select.sensors.is_empty();

    let interval = Duration::from_secs(args.interval).clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL);
    let coordinator = UpsCoordinator::new(client, PollConfig { interval });
    coordinator.first_refresh().await?;

    let mut rx = coordinator.subscribe();
    let mut remaining = args.count;

    if let Some(snapshot) = coordinator.current_snapshot() {
        emit(&snapshot, PollStatus::Fresh, &sensors, include_binary, global);
        remaining = decrement(remaining);
    }

    while remaining != Some(0) {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow().clone();
                if state.status == PollStatus::AuthRequired {
                    coordinator.close().await;
                    return Err(CliError::AuthFailed {
                        message: "the agent rejected our credentials while polling".into(),
                    });
                }
                if let Some(snapshot) = state.snapshot {
                    emit(&snapshot, state.status, &sensors, include_binary, global);
                    remaining = decrement(remaining);
                }
            }
        }
    }

    coordinator.close().await;
    Ok(())
}

fn decrement(remaining: Option<u64>) -> Option<u64> {
    remaining.map(|n| n.saturating_sub(1))
}

fn emit(
    snapshot: &apcups_core::UpsSnapshot,
    status: PollStatus,
    sensors: &[&'static apcups_core::SensorSpec],
    include_binary: bool,
    global: &GlobalOpts,
) {
    let report = data::build_report(snapshot, sensors, include_binary);

    // Table mode gets a timestamp/freshness header between cycles.
    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        let stamp = report.taken_at.format("%Y-%m-%d %H:%M:%S");
        let label = status_label(status);
        if output::should_color(&global.color) {
            let colored = match status {
                PollStatus::Fresh => label.green().to_string(),
                PollStatus::Stale => label.yellow().to_string(),
                _ => label.to_owned(),
            };
            println!("{stamp}  [{colored}]");
        } else {
            println!("{stamp}  [{label}]");
        }
    }

    output::print_output(&data::render_report(&report, global), global.quiet);
}

fn status_label(status: PollStatus) -> &'static str {
    match status {
        PollStatus::Fresh => "fresh",
        PollStatus::Stale => "stale",
        PollStatus::Pending => "pending",
        PollStatus::AuthRequired => "auth required",
    }
}
