use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::handlers;
use crate::shared::config::{resolve_path, Config};

/// Конфигурация всех роутов приложения
pub fn configure_routes(config: &Config) -> anyhow::Result<Router> {
    let uploads_dir = resolve_path(&config.assets.local_dir)?;

    let router = Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // CATALOG LOOKUPS
        // ========================================
        .route(
            "/api/products/categories",
            get(handlers::a001_category::list_all),
        )
        .route(
            "/api/products/sizes/:id",
            get(handlers::a002_size::list_by_category),
        )
        // ========================================
        // PRODUCTS
        // ========================================
        .route("/api/products", get(handlers::a003_product::list))
        .route("/api/products/add", post(handlers::a003_product::add))
        .route("/api/products/update", put(handlers::a003_product::update))
        .route(
            "/api/products/delete/:id",
            delete(handlers::a003_product::delete),
        )
        .route("/api/products/filter", get(handlers::a003_product::filter))
        .route(
            "/api/products/template",
            get(handlers::usecases::download_template),
        )
        // UseCase u501: import catalog (excel + zip)
        .route(
            "/api/products/import",
            post(handlers::usecases::u501_import_catalog)
                .layer(DefaultBodyLimit::max(config.import.max_upload_bytes())),
        )
        .route("/api/products/:id", get(handlers::a003_product::get_by_id))
        // ========================================
        // ORDERS
        // ========================================
        .route("/api/orders", get(handlers::a004_order::list_all))
        // ========================================
        // SYSTEM LOG
        // ========================================
        .route(
            "/api/logs",
            get(handlers::logs::list_all)
                .post(handlers::logs::create)
                .delete(handlers::logs::clear_all),
        )
        // Локальное хранилище изображений
        .nest_service("/uploads", ServeDir::new(uploads_dir));

    Ok(router)
}
