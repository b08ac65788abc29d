//! Хранилище изображений товаров.
//!
//! Импорт и API работают через трейт [`AssetStore`], конкретная реализация
//! выбирается в config.toml (`[assets] provider = "local" | "cloudinary"`).

pub mod cloudinary;
pub mod local;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::shared::config::{AssetProvider, AssetsConfig};

/// Ошибки загрузки файла в хранилище
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("file not found: {0}")]
    MissingFile(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload rejected: {0}")]
    Rejected(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("asset store is not configured: {0}")]
    Config(String),
}

/// Удаленное (или локальное) хранилище изображений
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Загрузить локальный файл в `folder` под именем `public_id`.
    /// Возвращает идентификатор, который сохраняется в images.url
    async fn upload(&self, path: &Path, folder: &str, public_id: &str)
        -> Result<String, AssetError>;

    fn provider_name(&self) -> &str;
}

/// Создать хранилище по конфигурации
pub fn build_asset_store(config: &AssetsConfig) -> anyhow::Result<Arc<dyn AssetStore>> {
    match config.provider {
        AssetProvider::Local => {
            let root = crate::shared::config::resolve_path(&config.local_dir)?;
            std::fs::create_dir_all(&root)?;
            tracing::info!("Asset store: local directory {}", root.display());
            Ok(Arc::new(local::LocalAssetStore::new(root)))
        }
        AssetProvider::Cloudinary => {
            let cfg = config.cloudinary.clone().ok_or_else(|| {
                AssetError::Config("[assets.cloudinary] section is missing".into())
            })?;
            tracing::info!("Asset store: cloudinary ({})", cfg.cloud_name);
            Ok(Arc::new(cloudinary::CloudinaryStore::new(cfg)?))
        }
    }
}
