use axum::{http::StatusCode, Json};
use contracts::shared::logger::{CreateLogRequest, LogEntry};

use super::{api_error, internal_error, ApiError};
use crate::shared::data::db::get_connection;
use crate::shared::logger;

/// GET /api/logs
pub async fn list_all() -> Result<Json<Vec<LogEntry>>, ApiError> {
    match logger::repository::get_all_logs(get_connection()).await {
        Ok(logs) => Ok(Json(logs)),
        Err(e) => Err(internal_error("Failed to read logs", e)),
    }
}

/// POST /api/logs
pub async fn create(Json(req): Json<CreateLogRequest>) -> Result<StatusCode, ApiError> {
    if let Err(msg) = req.validate() {
        return Err(api_error(StatusCode::BAD_REQUEST, msg));
    }
    match logger::repository::log_event(get_connection(), &req.source, &req.category, &req.message)
        .await
    {
        Ok(_) => Ok(StatusCode::OK),
        Err(e) => Err(internal_error("Failed to write log", e)),
    }
}

/// DELETE /api/logs
pub async fn clear_all() -> Result<StatusCode, ApiError> {
    match logger::repository::clear_all_logs(get_connection()).await {
        Ok(_) => Ok(StatusCode::OK),
        Err(e) => Err(internal_error("Failed to clear logs", e)),
    }
}
