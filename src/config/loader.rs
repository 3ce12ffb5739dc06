//! Load entity config from the embedded defaults or a JSON file, and resolve it for runtime use.

use crate::config::resolved::{ColumnInfo, EntityRegistry, ResolvedEntity};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use crate::query::{SortDirection, SortSpec};
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_ENTITIES: &str = include_str!("entities.json");

pub fn parse_entities(raw: &str) -> Result<Vec<EntityConfig>, ConfigError> {
    let file: EntitiesFile = serde_json::from_str(raw).map_err(|e| ConfigError::Load(e.to_string()))?;
    Ok(file.entities)
}

/// Entities shipped with the crate.
pub fn builtin_entities() -> Result<Vec<EntityConfig>, ConfigError> {
    parse_entities(BUILTIN_ENTITIES)
}

pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Vec<EntityConfig>, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    parse_entities(&raw)
}

/// Build the registry from config (validates first).
pub fn resolve(entities: &[EntityConfig]) -> Result<EntityRegistry, ConfigError> {
    validate(entities)?;

    let mut resolved = Vec::with_capacity(entities.len());
    let mut entity_by_path = HashMap::new();

    for e in entities {
        let mut columns: Vec<ColumnInfo> = BASE_COLUMNS
            .iter()
            .map(|(name, ty)| ColumnInfo {
                name: name.to_string(),
                type_name: ty.to_string(),
            })
            .collect();
        for c in &e.columns {
            if columns.iter().any(|b| b.name == c.name) {
                continue;
            }
            columns.push(ColumnInfo {
                name: c.name.clone(),
                type_name: c.type_.clone(),
            });
        }

        let default_sort = match &e.default_sort {
            Some(s) => SortSpec::new(s.column.clone(), SortDirection::parse(s.direction.as_deref())),
            None => SortSpec::new("updatedAt", SortDirection::Desc),
        };

        let entity = ResolvedEntity {
            path_segment: e.path_segment.clone(),
            table: e.table.clone(),
            collection: e.collection.clone().unwrap_or_else(|| e.path_segment.clone()),
            columns,
            filters: e.filters.clone(),
            search_columns: e.search_columns.clone(),
            sort_columns: e.sort_columns.clone(),
            default_sort,
            sensitive_columns: e.sensitive_columns.iter().cloned().collect(),
        };
        entity_by_path.insert(e.path_segment.clone(), entity.clone());
        resolved.push(entity);
    }

    Ok(EntityRegistry {
        entities: resolved,
        entity_by_path,
    })
}
