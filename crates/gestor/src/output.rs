//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Records have no fixed
//! shape, so their tables are built column-by-column from the keys present;
//! typed rows use the `Tabled` derive. Structured formats use serde, plain
//! emits one id per line.

use std::io::{self, Write};

use tabled::{Table, Tabled, builder::Builder, settings::Style};

use gestor_core::{Page, Record};

use crate::cli::OutputFormat;

const EMPTY: &str = "No records.";

// ── Render dispatchers ───────────────────────────────────────────────

/// Render one page of records; tables get a pagination footer.
pub fn render_page(format: OutputFormat, page: &Page) -> String {
    match format {
        OutputFormat::Table => {
            let footer = format!(
                "Page {}/{} · {} record(s)",
                page.page, page.total_pages, page.total_items
            );
            if page.items.is_empty() {
                format!("{EMPTY}\n{footer}")
            } else {
                format!("{}\n{footer}", render_record_table(&page.items))
            }
        }
        OutputFormat::Json => render_json_pretty(page),
        OutputFormat::JsonCompact => render_json_compact(page),
        OutputFormat::Yaml => render_yaml(page),
        OutputFormat::Plain => plain_ids(&page.items),
    }
}

/// Render a record sequence (full lists, dependency sets).
pub fn render_records(format: OutputFormat, records: &[Record]) -> String {
    match format {
        OutputFormat::Table if records.is_empty() => EMPTY.into(),
        OutputFormat::Table => render_record_table(records),
        OutputFormat::Json => render_json_pretty(records),
        OutputFormat::JsonCompact => render_json_compact(records),
        OutputFormat::Yaml => render_yaml(records),
        OutputFormat::Plain => plain_ids(records),
    }
}

/// Render a single record; tables list it field by field.
pub fn render_record(format: OutputFormat, record: &Record) -> String {
    match format {
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for field in record.fields() {
                builder.push_record([field.to_owned(), record.display_field(field)]);
            }
            let mut table = builder.build();
            table.with(Style::rounded());
            table.to_string()
        }
        OutputFormat::Json => render_json_pretty(record),
        OutputFormat::JsonCompact => render_json_compact(record),
        OutputFormat::Yaml => render_yaml(record),
        OutputFormat::Plain => record.id().map_or_else(String::new, |id| id.to_string()),
    }
}

/// Render typed rows: `Tabled` for tables, serde otherwise.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

/// Columns are the union of all keys, in first-seen order.
fn render_record_table(records: &[Record]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for field in record.fields() {
            if !columns.contains(&field) {
                columns.push(field);
            }
        }
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| (*c).to_owned()));
    for record in records {
        builder.push_record(columns.iter().map(|c| record.display_field(c)));
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn plain_ids(records: &[Record]) -> String {
    records
        .iter()
        .filter_map(Record::id)
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).expect("serialization should not fail")
}

/// YAML output.
pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}
