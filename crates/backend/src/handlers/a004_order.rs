use axum::Json;
use contracts::domain::a004_order::Order;

use super::{internal_error, ApiError};
use crate::domain::a004_order;
use crate::shared::data::db::get_connection;

/// GET /api/orders
pub async fn list_all() -> Result<Json<Vec<Order>>, ApiError> {
    match a004_order::repository::list_all(get_connection()).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => Err(internal_error("Failed to list orders", e)),
    }
}
