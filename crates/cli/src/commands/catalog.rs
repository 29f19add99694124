use serde::Serialize;

use ordena_agent::demo::demo_catalog_text;
use ordena_core::CatalogSnapshot;

use crate::commands::{serialize_payload, CommandResult};

#[derive(Debug, Serialize)]
struct CatalogReport {
    command: &'static str,
    entry_count: usize,
    entries: Vec<CatalogEntryReport>,
}

#[derive(Debug, Serialize)]
struct CatalogEntryReport {
    name: String,
    category: String,
    unit_price: String,
    aliases: Vec<String>,
}

pub fn run() -> CommandResult {
    let snapshot = CatalogSnapshot::parse_text(demo_catalog_text());
    let entries = snapshot
        .entries()
        .iter()
        .map(|entry| CatalogEntryReport {
            name: entry.canonical_name.clone(),
            category: entry.category.clone(),
            unit_price: entry.unit_price.to_string(),
            aliases: entry.aliases.clone(),
        })
        .collect::<Vec<_>>();

    let report =
        CatalogReport { command: "catalog", entry_count: entries.len(), entries };
    CommandResult::success(serialize_payload(&report))
}
