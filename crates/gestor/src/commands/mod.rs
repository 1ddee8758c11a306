//! Command dispatch: bridges CLI args -> session actions -> output formatting.

pub mod config_cmd;
pub mod entities;
pub mod records;
pub mod report;
pub mod stock;
pub mod util;

use gestor_core::Session;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    session: &Session,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match cmd {
        Command::Stock(args) => stock::handle(session, args, global, format).await,
        Command::Report(args) => report::handle(session, args, global, format).await,
        // Entities, Config and Completions are handled before dispatch
        cmd => match cmd.into_records() {
            Ok((entity, command)) => {
                records::handle(session, entity, command, global, format).await
            }
            Err(_) => unreachable!(),
        },
    }
}
