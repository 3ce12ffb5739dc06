//! Standard response envelope helpers.

use crate::pagination::PaginatedResult;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
}

/// Results from both backends side by side.
#[derive(Serialize)]
pub struct BothSources<T> {
    pub sql: T,
    pub nosql: T,
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::OK, Json(SuccessOne { data }))
}

/// 204 with no body when nothing matched, otherwise the `{data, meta}` envelope.
pub fn paginated_response(page: PaginatedResult<Value>) -> Response {
    if page.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    (StatusCode::OK, Json(page)).into_response()
}

pub fn both_paginated_response(sql: PaginatedResult<Value>, nosql: PaginatedResult<Value>) -> Response {
    if sql.is_empty() && nosql.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    (StatusCode::OK, Json(BothSources { sql, nosql })).into_response()
}
