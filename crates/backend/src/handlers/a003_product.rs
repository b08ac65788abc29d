use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a003_product::{
    Product, ProductDto, ProductFilterQuery, ProductListQuery, ProductListResponse,
};
use serde_json::{json, Value};

use super::{api_error, internal_error, ApiError};
use crate::domain::a003_product::service;
use crate::shared::data::db::get_connection;

/// POST /api/products/add
pub async fn add(Json(dto): Json<ProductDto>) -> Result<(StatusCode, Json<Value>), ApiError> {
    if let Err(msg) = dto.validate() {
        return Err(api_error(StatusCode::BAD_REQUEST, msg));
    }
    match service::create(get_connection(), dto).await {
        Ok(id) => Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "Product added successfully", "productId": id })),
        )),
        Err(e) => Err(internal_error("Failed to add product", e)),
    }
}

/// GET /api/products?limit&page
pub async fn list(Query(query): Query<ProductListQuery>) -> Result<Json<ProductListResponse>, ApiError> {
    match service::list_paginated(get_connection(), &query).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => Err(internal_error("Failed to list products", e)),
    }
}

/// GET /api/products/:id
pub async fn get_by_id(Path(id): Path<i64>) -> Result<Json<Product>, ApiError> {
    match service::get_by_id(get_connection(), id).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(api_error(StatusCode::NOT_FOUND, "Product not found")),
        Err(e) => Err(internal_error("Failed to get product", e)),
    }
}

/// PUT /api/products/update
pub async fn update(Json(dto): Json<ProductDto>) -> Result<Json<Value>, ApiError> {
    if dto.id.is_none() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Product id is required"));
    }
    if let Err(msg) = dto.validate() {
        return Err(api_error(StatusCode::BAD_REQUEST, msg));
    }
    match service::update(get_connection(), dto).await {
        Ok(true) => Ok(Json(json!({ "message": "Product updated successfully" }))),
        Ok(false) => Err(api_error(StatusCode::NOT_FOUND, "Product not found")),
        Err(e) => Err(internal_error("Failed to update product", e)),
    }
}

/// DELETE /api/products/delete/:id
pub async fn delete(Path(id): Path<i64>) -> Result<Json<Value>, ApiError> {
    match service::delete(get_connection(), id).await {
        Ok(true) => Ok(Json(json!({ "message": "Product deleted successfully" }))),
        Ok(false) => Err(api_error(StatusCode::NOT_FOUND, "Product not found")),
        Err(e) => Err(internal_error("Failed to delete product", e)),
    }
}

/// GET /api/products/filter?name&category_id&color&min_stock
pub async fn filter(Query(query): Query<ProductFilterQuery>) -> Result<Json<Vec<Product>>, ApiError> {
    match service::filter(get_connection(), &query).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => Err(internal_error("Failed to filter products", e)),
    }
}
