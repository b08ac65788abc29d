pub mod a001_category;
pub mod a002_size;
pub mod a003_product;
pub mod a004_order;
pub mod logs;
pub mod usecases;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Ответ об ошибке: статус и тело `{ "error": ... }`
pub type ApiError = (StatusCode, Json<Value>);

pub fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}

/// 500 с логированием причины
pub fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiError {
    tracing::error!("{}: {}", context, e);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
}
