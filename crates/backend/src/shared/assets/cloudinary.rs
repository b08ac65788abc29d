use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;

use super::{AssetError, AssetStore};
use crate::shared::config::CloudinaryConfig;

/// Клиент для подписанной загрузки в Cloudinary (Upload API)
pub struct CloudinaryStore {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    #[serde(default)]
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> anyhow::Result<Self> {
        if config.cloud_name.trim().is_empty() || config.api_key.trim().is_empty() {
            anyhow::bail!("cloudinary cloud_name and api_key must not be empty");
        }
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            cloud_name: config.cloud_name,
            api_key: config.api_key,
            api_secret: config.api_secret,
        })
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        )
    }
}

/// Подпись запроса: параметры сортируются по имени, склеиваются как
/// `k1=v1&k2=v2`, к строке дописывается секрет, от результата берется SHA-256.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    async fn upload(
        &self,
        path: &Path,
        folder: &str,
        public_id: &str,
    ) -> Result<String, AssetError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AssetError::MissingFile(path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| public_id.to_string());

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signed = [
            ("folder", folder.to_string()),
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp.clone()),
        ];
        let signature = sign_params(&signed, &self.api_secret);

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            )
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("public_id", public_id.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssetError::Network(format!("cloudinary upload timed out: {}", e))
                } else {
                    AssetError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssetError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|r| r.error.message)
                .unwrap_or(body);
            return Err(AssetError::Rejected(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            )));
        }

        let uploaded: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| AssetError::Rejected(format!("unexpected response: {}", e)))?;
        tracing::debug!(
            "Cloudinary upload ok: {} ({})",
            uploaded.public_id,
            uploaded.secure_url.as_deref().unwrap_or("-")
        );
        Ok(uploaded.public_id)
    }

    fn provider_name(&self) -> &str {
        "cloudinary"
    }
}
