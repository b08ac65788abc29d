use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use contracts::usecases::u501_import_catalog::{ImportResponse, ImportStatus};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use super::{internal_error, ApiError};
use crate::shared::assets::build_asset_store;
use crate::shared::config::{resolve_path, Config};
use crate::shared::data::db::get_connection;
use crate::shared::logger;
use crate::usecases::u501_import_catalog::{template, ImportExecutor, SeaOrmCatalogStore};

// ============================================================================
// UseCase u501: Import catalog
// ============================================================================

static IMPORT_EXECUTOR: OnceCell<Arc<ImportExecutor>> = OnceCell::new();

/// Собрать executor импорта (вызывается один раз в main после инициализации БД)
pub fn init_import_executor(config: &Config) -> anyhow::Result<()> {
    let assets = build_asset_store(&config.assets)?;
    tracing::info!("Import executor uses asset store '{}'", assets.provider_name());
    let store = Arc::new(SeaOrmCatalogStore::new(get_connection().clone()));
    let executor = ImportExecutor::new(
        store,
        assets,
        resolve_path(&config.import.temp_dir)?,
        config.assets.root_folder.clone(),
    );
    IMPORT_EXECUTOR
        .set(Arc::new(executor))
        .map_err(|_| anyhow::anyhow!("Import executor has already been initialized"))?;
    Ok(())
}

fn rejected(message: impl Into<String>) -> (StatusCode, Json<ImportResponse>) {
    (StatusCode::BAD_REQUEST, Json(ImportResponse::rejected(message)))
}

/// Превышение лимита тела запроса отдаем как 413, прочие ошибки multipart - 400
fn multipart_rejected(
    err: &MultipartError,
    message: String,
) -> (StatusCode, Json<ImportResponse>) {
    let status = match err.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(ImportResponse::rejected(message)))
}

/// HTTP-статус по итогу импорта
fn status_code(response: &ImportResponse) -> StatusCode {
    match response.status {
        ImportStatus::Ok => StatusCode::OK,
        ImportStatus::Rejected => StatusCode::BAD_REQUEST,
        ImportStatus::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /api/products/import (multipart: excel, zip)
pub async fn u501_import_catalog(mut multipart: Multipart) -> (StatusCode, Json<ImportResponse>) {
    let mut excel: Option<Vec<u8>> = None;
    let mut zip: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Import: invalid multipart body: {}", e);
                return multipart_rejected(&e, format!("Invalid multipart body: {}", e));
            }
        };
        let name = field.name().unwrap_or_default().to_string();
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Import: failed to read field '{}': {}", name, e);
                return multipart_rejected(&e, format!("Failed to read field '{}': {}", name, e));
            }
        };
        match name.as_str() {
            "excel" => excel = Some(data.to_vec()),
            "zip" => zip = Some(data.to_vec()),
            other => tracing::debug!("Import: ignoring field '{}'", other),
        }
    }

    let (Some(excel), Some(zip)) = (excel, zip) else {
        return rejected("Both 'excel' and 'zip' files are required");
    };

    let Some(executor) = IMPORT_EXECUTOR.get() else {
        tracing::error!("Import executor is not initialized");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ImportResponse::failed("Import is not available")),
        );
    };

    let response = executor.import_catalog(excel, zip).await;
    logger::log("u501_import_catalog", &response.message);

    (status_code(&response), Json(response))
}

/// GET /api/products/template
pub async fn download_template() -> Result<impl IntoResponse, ApiError> {
    let bytes = template::build_template()
        .map_err(|e| internal_error("Failed to build template", e))?;
    let headers = [
        (
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", template::TEMPLATE_FILE_NAME),
        ),
    ];
    Ok((headers, bytes))
}
