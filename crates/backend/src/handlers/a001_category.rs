use axum::Json;
use contracts::domain::a001_category::Category;

use super::{internal_error, ApiError};
use crate::domain::a001_category;
use crate::shared::data::db::get_connection;

/// GET /api/products/categories
pub async fn list_all() -> Result<Json<Vec<Category>>, ApiError> {
    match a001_category::repository::list_all(get_connection()).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => Err(internal_error("Failed to list categories", e)),
    }
}
