//! Config validation: identifiers, declared columns and path uniqueness.

use crate::config::{EntityConfig, BASE_COLUMNS, COLUMN_TYPES};
use crate::error::ConfigError;
use crate::query::is_valid_identifier;
use std::collections::HashSet;

fn check_identifier(entity: &str, name: &str) -> Result<(), ConfigError> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            entity: entity.to_string(),
            name: name.to_string(),
        })
    }
}

fn validate_entity(e: &EntityConfig) -> Result<(), ConfigError> {
    let entity = e.path_segment.as_str();
    check_identifier(entity, entity)?;
    check_identifier(entity, &e.table)?;
    if let Some(c) = &e.collection {
        check_identifier(entity, c)?;
    }

    let mut declared: HashSet<&str> = BASE_COLUMNS.iter().map(|(name, _)| *name).collect();
    for c in &e.columns {
        check_identifier(entity, &c.name)?;
        if !COLUMN_TYPES.contains(&c.type_.as_str()) {
            return Err(ConfigError::UnsupportedType {
                entity: entity.to_string(),
                type_name: c.type_.clone(),
            });
        }
        declared.insert(c.name.as_str());
    }

    let referenced = [
        ("filter", &e.filters),
        ("search", &e.search_columns),
        ("sort", &e.sort_columns),
        ("sensitive", &e.sensitive_columns),
    ];
    for (kind, columns) in referenced {
        for column in columns.iter() {
            if !declared.contains(column.as_str()) {
                return Err(ConfigError::UnknownColumn {
                    entity: entity.to_string(),
                    kind,
                    column: column.clone(),
                });
            }
        }
    }
    if let Some(sort) = &e.default_sort {
        if !declared.contains(sort.column.as_str()) {
            return Err(ConfigError::UnknownColumn {
                entity: entity.to_string(),
                kind: "default sort",
                column: sort.column.clone(),
            });
        }
    }
    Ok(())
}

pub fn validate(entities: &[EntityConfig]) -> Result<(), ConfigError> {
    let mut path_segments = HashSet::new();
    for e in entities {
        validate_entity(e)?;
        if !path_segments.insert(e.path_segment.as_str()) {
            return Err(ConfigError::DuplicatePathSegment(e.path_segment.clone()));
        }
    }
    Ok(())
}
