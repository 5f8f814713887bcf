//! Device identity handler.

use tabled::Tabled;

use apcups_snmp::{UpsIdentity, UpsSnmpClient};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

pub async fn handle(client: &UpsSnmpClient, global: &GlobalOpts) -> Result<(), CliError> {
    let identity = client.get_identity().await?;
    let rendered = output::render(&global.output, &identity, table, plain);
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn table(identity: &UpsIdentity) -> String {
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_owned());
    let rows = vec![
        FieldRow {
            field: "Model",
            value: text(&identity.model),
        },
        FieldRow {
            field: "Name",
            value: text(&identity.name),
        },
        FieldRow {
            field: "Firmware",
            value: text(&identity.firmware),
        },
        FieldRow {
            field: "Serial",
            value: text(&identity.serial),
        },
        FieldRow {
            field: "Manufactured",
            value: text(&identity.manufacture_date),
        },
    ];
    output::render_table(&rows)
}

fn plain(identity: &UpsIdentity) -> String {
    identity.serial.clone().unwrap_or_default()
}
