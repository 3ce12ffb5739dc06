//! Database bootstrap: make sure the target database exists before the pool connects to it.

use crate::error::AppError;
use sqlx::ConnectOptions;
use std::str::FromStr;

/// Connect to the `postgres` maintenance database and create the database named in `database_url` if missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::InvalidArgument(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split a connection URL into (maintenance URL, database name). Query parameters carry over.
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let (without_query, query) = match url.split_once('?') {
        Some((u, q)) => (u, Some(q)),
        None => (url, None),
    };
    let path_start = without_query
        .rfind('/')
        .filter(|i| *i > without_query.find("//").map(|j| j + 1).unwrap_or(0))
        .ok_or_else(|| AppError::InvalidArgument("DATABASE_URL: no database path".into()))?
        + 1;
    let db_name = without_query[path_start..].trim().to_string();
    let mut admin_url = format!("{}postgres", &without_query[..path_start]);
    if let Some(q) = query {
        admin_url.push('?');
        admin_url.push_str(q);
    }
    Ok((admin_url, db_name))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
