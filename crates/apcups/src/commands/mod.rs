//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod data;
pub mod identity;
pub mod sensors;
pub mod util;
pub mod watch;

use apcups_snmp::UpsSnmpClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: UpsSnmpClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Test => test::handle(&client, global).await,
        Command::Identity => identity::handle(&client, global).await,
        Command::Data(args) => data::handle(&client, &args, global).await,
        Command::Watch(args) => watch::handle(client, &args, global).await,
        // Sensors is handled before dispatch
        Command::Sensors => unreachable!(),
    }
}
