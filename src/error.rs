//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid identifier in entity '{entity}': '{name}'")]
    InvalidIdentifier { entity: String, name: String },
    #[error("unknown column in entity '{entity}': {kind} '{column}'")]
    UnknownColumn {
        entity: String,
        kind: &'static str,
        column: String,
    },
    #[error("unsupported column type in entity '{entity}': '{type_name}'")]
    UnsupportedType { entity: String, type_name: String },
    #[error("duplicate path segment: {0}")]
    DuplicatePathSegment(String),
    #[error("config load: {0}")]
    Load(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    /// Client-caused: bad identifier, column outside its allow-list, bad enum value.
    #[error("bad request: {0}")]
    InvalidArgument(String),
    /// Backend failure from the COUNT/SELECT round-trips, carried unchanged.
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("operation timed out after {0} ms")]
    Timeout(u64),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// 4xx-class errors are never worth retrying.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::NotFound(_) => "not_found",
            AppError::InvalidArgument(_) => "bad_request",
            AppError::Db(_) => "database_error",
            AppError::Timeout(_) => "timeout",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
