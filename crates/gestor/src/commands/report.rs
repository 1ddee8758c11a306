//! Report generation.

use gestor_core::{Entity, ReportKind, Session};

use crate::cli::{GlobalOpts, OutputFormat, ReportArgs, ReportCommand};
use crate::error::CliError;

use super::{records, util};

pub async fn handle(
    session: &Session,
    args: ReportArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        ReportCommand::Generate { kind, payload } => {
            let kind = ReportKind::from(kind);
            let parameters = util::read_payload(&payload)?;
            let created = session.generate_report(kind, parameters).await?;
            if !global.quiet {
                match created.id() {
                    Some(id) => eprintln!("{kind} report {id} generated"),
                    None => eprintln!("{kind} report generated"),
                }
            }

            let reports = session.collection(Entity::from(kind));
            if let Some(err) = reports.last_error() {
                eprintln!("warning: report list reload failed: {err}");
                return Ok(());
            }
            records::print_page(&reports, format, global);
            Ok(())
        }
    }
}
