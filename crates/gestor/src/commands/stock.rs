//! Stock command handlers.

use gestor_core::{Entity, RecordId, Session};

use crate::cli::{GlobalOpts, OutputFormat, StockArgs, StockCommand};
use crate::error::CliError;
use crate::output;

use super::{records, util};

pub async fn handle(
    session: &Session,
    args: StockArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        StockCommand::Records(command) => {
            records::handle(session, Entity::Stock, command, global, format).await
        }

        StockCommand::Move(payload) => {
            let movement = util::read_payload(&payload)?;
            let created = session.register_stock_movement(movement).await?;
            if !global.quiet {
                match created.id() {
                    Some(id) => eprintln!("Stock movement {id} registered"),
                    None => eprintln!("Stock movement registered"),
                }
            }

            let stock = session.collection(Entity::Stock);
            if let Some(err) = stock.last_error() {
                eprintln!("warning: stock reload failed: {err}");
                return Ok(());
            }
            records::print_page(&stock, format, global);
            Ok(())
        }

        StockCommand::Movements { product } => {
            let page = session
                .stock_movements(&RecordId::parse(&product))
                .await?;
            output::print_output(&output::render_page(format, &page), global.quiet);
            Ok(())
        }
    }
}
