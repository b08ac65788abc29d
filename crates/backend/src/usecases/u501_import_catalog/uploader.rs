use futures::future::join_all;
use std::sync::Arc;

use super::archive::ImageFile;
use super::error::ImportError;
use super::grouping::UploadedImage;
use crate::shared::assets::{AssetError, AssetStore};

/// Итог загрузки одной группы изображений
#[derive(Debug, Default)]
pub struct GroupUpload {
    /// Успешно загруженные, в порядке группы
    pub images: Vec<UploadedImage>,
    pub failures: Vec<ImportError>,
}

/// Загружает группы изображений в хранилище ассетов
pub struct AssetUploader {
    store: Arc<dyn AssetStore>,
}

impl AssetUploader {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self { store }
    }

    async fn upload_one(&self, file: &ImageFile, namespace: &str) -> Result<UploadedImage, AssetError> {
        if !file.path.is_file() {
            return Err(AssetError::MissingFile(file.path.display().to_string()));
        }
        let public_id = file
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file.file_name.clone());

        let url = self.store.upload(&file.path, namespace, &public_id).await?;
        Ok(UploadedImage {
            url,
            order_index: file.order_index,
        })
    }

    /// Загрузить файлы группы параллельно. Ошибка файла не прерывает группу
    pub async fn upload_group(&self, files: &[ImageFile], namespace: &str) -> GroupUpload {
        let results = join_all(files.iter().map(|f| self.upload_one(f, namespace))).await;

        let mut upload = GroupUpload::default();
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(image) => upload.images.push(image),
                Err(e) => {
                    tracing::warn!("Upload of {} to {} failed: {}", file.file_name, namespace, e);
                    upload.failures.push(ImportError::Upload {
                        file: file.file_name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        upload
    }
}

#[cfg(test)]
mod tests {
    use super::super::archive::order_index_of;
    use super::super::test_support::FakeAssetStore;
    use super::*;

    fn image(dir: &std::path::Path, name: &str, create: bool) -> ImageFile {
        let path = dir.join(name);
        if create {
            std::fs::write(&path, b"img").unwrap();
        }
        ImageFile {
            path,
            file_name: name.to_string(),
            order_index: order_index_of(name),
        }
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_group() {
        let tmp = tempfile::tempdir().unwrap();
        let files = vec![
            image(tmp.path(), "1.jpg", true),
            image(tmp.path(), "2.jpg", false),
            image(tmp.path(), "3.jpg", true),
            image(tmp.path(), "4.png", true),
        ];
        let store = Arc::new(FakeAssetStore::failing_on(&["3"]));
        let uploader = AssetUploader::new(store.clone());

        let upload = uploader.upload_group(&files, "productos/f1").await;

        let urls: Vec<&str> = upload.images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["productos/f1/1", "productos/f1/4"]);
        assert_eq!(upload.images[1].order_index, 4);
        assert_eq!(upload.failures.len(), 2);
        assert!(matches!(&upload.failures[0], ImportError::Upload { file, .. } if file == "2.jpg"));
        assert_eq!(store.uploaded().len(), 2);
    }
}
