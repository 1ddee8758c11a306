//! Record command handlers, shared by every entity.

use gestor_core::{Collection, CoreError, Entity, FetchOutcome, RecordId, Session};

use crate::cli::{GlobalOpts, OutputFormat, PageArgs, RecordCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    session: &Session,
    entity: Entity,
    command: RecordCommand,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let collection = session.collection(entity);

    match command {
        RecordCommand::List(args) => {
            load_page(&collection, &args).await?;
            print_page(&collection, format, global);
            Ok(())
        }

        RecordCommand::Next(args) => {
            load_page(&collection, &args).await?;
            if collection.next_page().await? == FetchOutcome::Unchanged && !global.quiet {
                eprintln!("Already on the last page");
            }
            print_page(&collection, format, global);
            Ok(())
        }

        RecordCommand::Prev(args) => {
            load_page(&collection, &args).await?;
            if collection.previous_page().await? == FetchOutcome::Unchanged && !global.quiet {
                eprintln!("Already on the first page");
            }
            print_page(&collection, format, global);
            Ok(())
        }

        RecordCommand::All { refresh } => {
            let list = if refresh {
                collection.refresh_all().await?
            } else {
                collection.fetch_all().await?
            };
            output::print_output(&output::render_records(format, &list), global.quiet);
            Ok(())
        }

        RecordCommand::Create(payload) => {
            let record = util::read_payload(&payload)?.without_id();
            let created = collection.save(record).await?;
            if !global.quiet {
                eprintln!("{entity} created");
            }
            output::print_output(&output::render_record(format, &created), global.quiet);
            Ok(())
        }

        RecordCommand::Update { id, payload } => {
            let id = RecordId::parse(&id);
            let mut record = util::read_payload(&payload)?;
            record.set_id(&id);
            let updated = collection
                .save(record)
                .await
                .map_err(|e| not_found_as(entity, &id, e))?;
            if !global.quiet {
                eprintln!("{entity} {id} updated");
            }
            output::print_output(&output::render_record(format, &updated), global.quiet);
            Ok(())
        }

        RecordCommand::Delete { id } => {
            let id = RecordId::parse(&id);
            if !util::confirm(&format!("Delete {entity} {id}?"), "delete", global.yes)? {
                return Ok(());
            }
            collection
                .remove(&id)
                .await
                .map_err(|e| not_found_as(entity, &id, e))?;
            if !global.quiet {
                eprintln!("{entity} {id} deleted");
            }
            Ok(())
        }

        RecordCommand::Deps => show_dependencies(&collection, entity, global, format).await,
    }
}

async fn load_page(collection: &Collection, args: &PageArgs) -> Result<(), CliError> {
    collection
        .fetch_page(args.page, &args.search, args.ordering.as_deref())
        .await?;
    Ok(())
}

pub(crate) fn print_page(collection: &Collection, format: OutputFormat, global: &GlobalOpts) {
    output::print_output(&output::render_page(format, &collection.page()), global.quiet);
}

async fn show_dependencies(
    collection: &Collection,
    entity: Entity,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    if collection.dependency_slots().next().is_none() {
        if !global.quiet {
            eprintln!("{entity} has no dependency lists");
        }
        return Ok(());
    }

    let report = collection.load_dependencies().await;
    for (slot, err) in &report.failed {
        eprintln!("warning: {slot}: {err}");
    }
    if report.loaded.is_empty() {
        if let Some(err) = report.first_error() {
            return Err(err.clone().into());
        }
    }

    let out = match format {
        OutputFormat::Table | OutputFormat::Plain => report
            .loaded
            .iter()
            .map(|(slot, records)| {
                format!(
                    "{slot} ({})\n{}",
                    records.len(),
                    output::render_records(format, records)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Json => output::render_json_pretty(&report.loaded),
        OutputFormat::JsonCompact => output::render_json_compact(&report.loaded),
        OutputFormat::Yaml => output::render_yaml(&report.loaded),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Name the entity and id instead of the raw path.
fn not_found_as(entity: Entity, id: &RecordId, err: CoreError) -> CliError {
    if err.is_not_found() {
        CliError::NotFound {
            resource_type: entity.to_string(),
            identifier: id.to_string(),
            list_command: format!("{entity} list"),
        }
    } else {
        err.into()
    }
}
