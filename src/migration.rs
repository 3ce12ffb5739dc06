//! Entity tables: `CREATE TABLE IF NOT EXISTS` for every entity in the registry.

use crate::config::{EntityRegistry, ResolvedEntity};
use crate::error::AppError;
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// PostgreSQL type for a config type name. Unknown names are stored as text.
fn pg_type(type_name: &str) -> &'static str {
    match type_name {
        "integer" => "BIGINT",
        "double" => "DOUBLE PRECISION",
        "boolean" => "BOOLEAN",
        "timestamptz" => "TIMESTAMPTZ",
        "uuid" => "UUID",
        "jsonb" => "JSONB",
        _ => "TEXT",
    }
}

fn column_def(name: &str, type_name: &str) -> String {
    let ty = pg_type(type_name);
    match name {
        "id" => format!("{} {} PRIMARY KEY DEFAULT gen_random_uuid()", quote(name), ty),
        "recordStatus" => format!("{} {} NOT NULL DEFAULT TRUE", quote(name), ty),
        "createdAt" | "updatedAt" => format!("{} {} NOT NULL DEFAULT NOW()", quote(name), ty),
        _ => format!("{} {}", quote(name), ty),
    }
}

/// DDL for one entity table.
pub fn create_table_sql(entity: &ResolvedEntity) -> String {
    let cols: Vec<String> = entity
        .columns
        .iter()
        .map(|c| column_def(&c.name, &c.type_name))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quote(&entity.table),
        cols.join(",\n  ")
    )
}

/// Idempotent: existing tables are left as they are.
pub async fn apply_migrations(pool: &PgPool, registry: &EntityRegistry) -> Result<(), AppError> {
    for entity in &registry.entities {
        let ddl = create_table_sql(entity);
        tracing::debug!(table = %entity.table, sql = %ddl, "migration");
        sqlx::query(&ddl).execute(pool).await?;
    }
    tracing::info!(tables = registry.entities.len(), "migrations applied");
    Ok(())
}
