//! Entity catalog listing.

use serde::Serialize;
use tabled::Tabled;

use gestor_core::{DependencySource, Entity};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Tabled)]
struct EntityRow {
    #[tabled(rename = "Entity")]
    name: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Ordering")]
    ordering: String,
    #[tabled(rename = "After edit")]
    reconcile: String,
    #[tabled(rename = "Writes")]
    writes: String,
    #[tabled(rename = "Depends on")]
    dependencies: String,
}

impl From<Entity> for EntityRow {
    fn from(entity: Entity) -> Self {
        let caps = entity.capabilities();
        let writes: Vec<&str> = [
            (caps.create, "create"),
            (caps.update, "update"),
            (caps.delete, "delete"),
        ]
        .into_iter()
        .filter_map(|(allowed, name)| allowed.then_some(name))
        .collect();

        let dependencies: Vec<String> = entity
            .dependencies()
            .iter()
            .map(|dep| match dep.source {
                DependencySource::Collection(_) => dep.slot().to_owned(),
                DependencySource::Filtered(_, filters) => {
                    let query: Vec<String> =
                        filters.iter().map(|(k, v)| format!("{k}={v}")).collect();
                    format!("{}?{}", dep.slot(), query.join("&"))
                }
            })
            .collect();

        Self {
            name: entity.to_string(),
            resource: entity.resource().to_owned(),
            ordering: entity.default_ordering().unwrap_or("-").to_owned(),
            reconcile: entity.reconcile().to_string(),
            writes: if writes.is_empty() {
                "-".into()
            } else {
                writes.join(", ")
            },
            dependencies: dependencies.join(", "),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(global: &GlobalOpts, format: OutputFormat) {
    let rows: Vec<EntityRow> = Entity::all().map(EntityRow::from).collect();
    let out = output::render_list(format, &rows, Clone::clone, |row| row.name.clone());
    output::print_output(&out, global.quiet);
}
