//! One-shot sensor read and the report shape shared with `watch`.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use apcups_core::{BINARY_SENSORS, ProjectedValue, SENSORS, SensorSpec, UpsSnapshot, sensor};
use apcups_snmp::UpsSnmpClient;

use crate::cli::{DataArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// One poll, projected through the sensor catalog.
#[derive(Serialize)]
pub struct DataReport {
    pub taken_at: DateTime<Utc>,
    pub sensors: Vec<SensorReading>,
    pub binary: Vec<BinaryReading>,
}

#[derive(Serialize)]
pub struct SensorReading {
    pub key: &'static str,
    pub label: &'static str,
    pub value: ProjectedValue,
    pub unit: Option<&'static str>,
}

#[derive(Serialize)]
pub struct BinaryReading {
    pub key: &'static str,
    pub label: &'static str,
    pub state: Option<bool>,
}

pub async fn handle(
    client: &UpsSnmpClient,
    args: &DataArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let sensors = selected_sensors(&args.select.sensors)?;
    let values = client.get_all_data().await?;
    let snapshot = UpsSnapshot::new(values);

    // Binary indicators ride along when no explicit filter is given.
    let report = build_report(&snapshot, &sensors, args.select.sensors.is_empty());
    output::print_output(&render_report(&report, global), global.quiet);
    Ok(())
}

/// Resolve a `--sensors` filter against the catalog; empty means all.
pub fn selected_sensors(keys: &[String]) -> Result<Vec<&'static SensorSpec>, CliError> {
    if keys.is_empty() {
        return Ok(SENSORS.iter().collect());
    }
    keys.iter()
        .map(|key| {
            sensor(key).ok_or_else(|| CliError::Validation {
                field: "sensors".into(),
                reason: format!("unknown sensor '{key}' (run: apcups sensors)"),
            })
        })
        .collect()
}

pub fn build_report(
    snapshot: &UpsSnapshot,
    sensors: &[&'static SensorSpec],
    include_binary: bool,
) -> DataReport {
    DataReport {
        taken_at: snapshot.taken_at,
        sensors: sensors
            .iter()
            .map(|spec| SensorReading {
                key: spec.key,
                label: spec.label,
                value: spec.project(snapshot),
                unit: spec.unit,
            })
            .collect(),
        binary: if include_binary {
            BINARY_SENSORS
                .iter()
                .map(|spec| BinaryReading {
                    key: spec.key,
                    label: spec.label,
                    state: spec.evaluate(snapshot),
                })
                .collect()
        } else {
            Vec::new()
        },
    }
}

pub fn render_report(report: &DataReport, global: &GlobalOpts) -> String {
    output::render(&global.output, report, table, plain)
}

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "Sensor")]
    sensor: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: &'static str,
}

fn table(report: &DataReport) -> String {
    let mut rows: Vec<SensorRow> = report
        .sensors
        .iter()
        .map(|reading| SensorRow {
            sensor: reading.label,
            value: reading.value.to_string(),
            unit: reading.unit.unwrap_or(""),
        })
        .collect();
    rows.extend(report.binary.iter().map(|reading| SensorRow {
        sensor: reading.label,
        value: tri_state(reading.state).to_owned(),
        unit: "",
    }));
    output::render_table(&rows)
}

fn plain(report: &DataReport) -> String {
    let mut lines = String::new();
    for reading in &report.sensors {
        let _ = writeln!(lines, "{} {}", reading.key, reading.value);
    }
    for reading in &report.binary {
        let _ = writeln!(lines, "{} {}", reading.key, tri_state(reading.state));
    }
    lines.trim_end().to_owned()
}

fn tri_state(state: Option<bool>) -> &'static str {
    match state {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
    }
}
