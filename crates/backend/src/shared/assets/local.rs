use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{AssetError, AssetStore};

/// Хранилище в локальной папке; раздается сервером по /uploads
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Убирает из сегмента пути все, что может вывести за пределы корня
/// или сломать URL под /uploads (`#` - фрагмент, `?` - запрос)
fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '#' | '?' | '%' => '_',
            c => c,
        })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn upload(
        &self,
        path: &Path,
        folder: &str,
        public_id: &str,
    ) -> Result<String, AssetError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(AssetError::MissingFile(path.display().to_string()));
        }

        let folder_segments: Vec<String> = folder
            .split('/')
            .map(sanitize_segment)
            .filter(|s| !s.is_empty())
            .collect();
        let public_id = sanitize_segment(public_id);
        if public_id.is_empty() {
            return Err(AssetError::Rejected(format!(
                "invalid public id for {}",
                path.display()
            )));
        }
        let file_name = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", public_id, ext.to_lowercase()),
            None => public_id,
        };

        let mut target_dir = self.root.clone();
        for segment in &folder_segments {
            target_dir.push(segment);
        }
        tokio::fs::create_dir_all(&target_dir).await?;
        tokio::fs::copy(path, target_dir.join(&file_name)).await?;

        let mut key = folder_segments.join("/");
        if !key.is_empty() {
            key.push('/');
        }
        key.push_str(&file_name);
        Ok(key)
    }

    fn provider_name(&self) -> &str {
        "local"
    }
}
