use axum::{extract::Path, Json};
use contracts::domain::a002_size::Size;

use super::{internal_error, ApiError};
use crate::domain::a002_size;
use crate::shared::data::db::get_connection;

/// GET /api/products/sizes/:id
pub async fn list_by_category(Path(category_id): Path<i64>) -> Result<Json<Vec<Size>>, ApiError> {
    match a002_size::repository::list_by_category(get_connection(), category_id).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => Err(internal_error("Failed to list sizes", e)),
    }
}
