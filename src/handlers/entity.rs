//! Entity handlers: paginated list and read by id, from the requested data source.

use crate::config::{data_source_param, ResolvedEntity};
use crate::error::AppError;
use crate::pagination::PaginatedResult;
use crate::query::{DataSource, ListRequest};
use crate::response::{both_paginated_response, paginated_response, success_one_ok, BothSources};
use crate::service::{
    with_retry, with_timeout, DocumentStorePaginator, InMemoryPaginator, Paginator, RelationalPaginator,
};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::collections::HashMap;

fn entity_for<'a>(state: &'a AppState, path_segment: &str) -> Result<&'a ResolvedEntity, AppError> {
    state
        .registry
        .entity_by_path(path_segment)
        .ok_or_else(|| AppError::NotFound(format!("entity '{}'", path_segment)))
}

fn parse_id(id_str: &str) -> Result<String, AppError> {
    uuid::Uuid::parse_str(id_str)
        .map(|u| u.to_string())
        .map_err(|_| AppError::InvalidArgument("invalid uuid".into()))
}

fn relational(state: &AppState, entity: &ResolvedEntity) -> RelationalPaginator {
    RelationalPaginator::new(state.sql.clone(), entity.table.clone(), Vec::new())
}

fn stripped(entity: &ResolvedEntity, page: PaginatedResult<Value>) -> PaginatedResult<Value> {
    page.map(|mut row| {
        entity.strip_sensitive(&mut row);
        row
    })
}

async fn list_sql(state: &AppState, entity: &ResolvedEntity, request: &ListRequest) -> Result<PaginatedResult<Value>, AppError> {
    let paginator = relational(state, entity);
    with_timeout(state.request_timeout, with_retry(state.retry, || paginator.paginate(request))).await
}

async fn list_nosql(state: &AppState, entity: &ResolvedEntity, request: &ListRequest) -> Result<PaginatedResult<Value>, AppError> {
    let paginator = DocumentStorePaginator::new(state.documents.clone(), entity.collection.clone());
    with_timeout(state.request_timeout, paginator.paginate(request)).await
}

async fn list_fake(state: &AppState, entity: &ResolvedEntity, request: &ListRequest) -> Result<PaginatedResult<Value>, AppError> {
    let paginator = InMemoryPaginator::new(state.documents.list(&entity.collection));
    with_timeout(state.request_timeout, paginator.paginate(request)).await
}

async fn read_sql(state: &AppState, entity: &ResolvedEntity, id: &str) -> Result<Option<Value>, AppError> {
    let paginator = relational(state, entity);
    with_timeout(state.request_timeout, with_retry(state.retry, || paginator.find_by_id(id))).await
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let entity = entity_for(&state, &path_segment)?;
    let source = data_source_param(&params)?;
    let request = entity.list_request(&params)?;
    tracing::debug!(entity = %entity.path_segment, ?source, page = request.page.page, "list");

    let response = match source {
        DataSource::Sql => paginated_response(stripped(entity, list_sql(&state, entity, &request).await?)),
        DataSource::Nosql => paginated_response(stripped(entity, list_nosql(&state, entity, &request).await?)),
        DataSource::Fake => paginated_response(stripped(entity, list_fake(&state, entity, &request).await?)),
        DataSource::Both => {
            let (sql, nosql) = tokio::try_join!(
                list_sql(&state, entity, &request),
                list_nosql(&state, entity, &request)
            )?;
            both_paginated_response(stripped(entity, sql), stripped(entity, nosql))
        }
    };
    Ok(response)
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let entity = entity_for(&state, &path_segment)?;
    let source = data_source_param(&params)?;
    let id = parse_id(&id_str)?;

    let (sql, nosql) = match source {
        DataSource::Sql => (read_sql(&state, entity, &id).await?, None),
        DataSource::Nosql | DataSource::Fake => (None, state.documents.find_by_id(&entity.collection, &id)),
        DataSource::Both => (
            read_sql(&state, entity, &id).await?,
            state.documents.find_by_id(&entity.collection, &id),
        ),
    };
    let strip = |row: Option<Value>| {
        row.map(|mut r| {
            entity.strip_sensitive(&mut r);
            r
        })
    };
    let (sql, nosql) = (strip(sql), strip(nosql));

    let response = match source {
        DataSource::Both if sql.is_none() && nosql.is_none() => return Err(AppError::NotFound(id_str)),
        DataSource::Both => success_one_ok(BothSources { sql, nosql }).into_response(),
        _ => {
            let row = sql.or(nosql).ok_or(AppError::NotFound(id_str))?;
            success_one_ok(row).into_response()
        }
    };
    Ok(response)
}
