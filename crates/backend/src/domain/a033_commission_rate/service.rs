use anyhow::Result;
use contracts::domain::a033_commission_rate::aggregate::{RateEntry, RateTable};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;

use super::repository;

/// Groups flat rate entries into one table per rep title
pub fn group_by_title(entries: Vec<RateEntry>) -> HashMap<String, RateTable> {
    let mut tables: HashMap<String, RateTable> = HashMap::new();
    for entry in entries {
        tables
            .entry(entry.title.clone())
            .or_insert_with(|| RateTable {
                title: entry.title.clone(),
                rates: Vec::new(),
            })
            .rates
            .push(entry);
    }
    tables
}

/// Human-readable list of (title, segment, status) keys that occur more than once
pub fn find_duplicates(tables: &HashMap<String, RateTable>) -> Vec<String> {
    let mut found: Vec<String> = tables
        .values()
        .flat_map(|table| {
            table
                .duplicate_keys()
                .into_iter()
                .map(move |(segment, status)| {
                    format!("{}/{}/{}", table.title, segment.code(), status)
                })
        })
        .collect();
    found.sort();
    found
}

pub async fn load_rate_tables(db: &DatabaseConnection) -> Result<HashMap<String, RateTable>> {
    let entries = repository::list_all(db).await?;
    let tables = group_by_title(entries);
    tracing::info!("Loaded rate tables for {} titles", tables.len());
    Ok(tables)
}
