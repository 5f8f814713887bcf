//! Sensor catalog listing.

use serde::Serialize;
use tabled::Tabled;

use apcups_core::{BINARY_SENSORS, DEFAULT_SENSORS, SENSORS};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct CatalogEntry {
    key: &'static str,
    label: &'static str,
    unit: Option<&'static str>,
    kind: &'static str,
    default: bool,
}

#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Label")]
    label: &'static str,
    #[tabled(rename = "Unit")]
    unit: &'static str,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Default")]
    default: &'static str,
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let mut entries: Vec<CatalogEntry> = SENSORS
        .iter()
        .map(|spec| CatalogEntry {
            key: spec.key,
            label: spec.label,
            unit: spec.unit,
            kind: "sensor",
            default: DEFAULT_SENSORS.contains(&spec.key),
        })
        .collect();
    entries.extend(BINARY_SENSORS.iter().map(|spec| CatalogEntry {
        key: spec.key,
        label: spec.label,
        unit: None,
        kind: "binary",
        default: true,
    }));

    let rendered = output::render(&global.output, &entries, |e| table(e), |e| plain(e));
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn table(entries: &[CatalogEntry]) -> String {
    let rows: Vec<CatalogRow> = entries
        .iter()
        .map(|entry| CatalogRow {
            key: entry.key,
            label: entry.label,
            unit: entry.unit.unwrap_or(""),
            kind: entry.kind,
            default: if entry.default { "yes" } else { "" },
        })
        .collect();
    output::render_table(&rows)
}

fn plain(entries: &[CatalogEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.key)
        .collect::<Vec<_>>()
        .join("\n")
}
