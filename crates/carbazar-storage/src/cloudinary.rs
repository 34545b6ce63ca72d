//! Cloudinary publisher implementation
//!
//! Uploads staged attachments with a signed request to the Cloudinary
//! upload API and returns the `secure_url` from the response.

use crate::traits::{AssetPublisher, PublishError, PublishResult};
use async_trait::async_trait;
use carbazar_core::models::StagedAttachment;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::fs;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";
const UPLOAD_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct CloudinaryPublisher {
    http_client: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

impl CloudinaryPublisher {
    pub fn new(
        cloud_name: String,
        api_key: String,
        api_secret: String,
    ) -> PublishResult<Self> {
        Self::with_api_base(cloud_name, api_key, api_secret, DEFAULT_API_BASE.to_string())
    }

    /// Create a publisher pointed at a non-default API base (used by tests).
    pub fn with_api_base(
        cloud_name: String,
        api_key: String,
        api_secret: String,
        api_base: String,
    ) -> PublishResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                PublishError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
            cloud_name,
            api_key,
            api_secret,
        })
    }

    /// Signature over the signed params, per the Cloudinary signing scheme:
    /// sorted `key=value` pairs joined with `&`, the API secret appended,
    /// then hex-encoded SHA-256.
    fn sign(&self, timestamp: i64) -> String {
        let to_sign = format!("timestamp={}{}", timestamp, self.api_secret);
        let digest = Sha256::digest(to_sign.as_bytes());
        hex::encode(digest)
    }
}

#[async_trait]
impl AssetPublisher for CloudinaryPublisher {
    async fn publish(&self, attachment: &StagedAttachment) -> PublishResult<String> {
        let data = fs::read(&attachment.staged_path).await?;
        let timestamp = chrono::Utc::now().timestamp();
        let signature = self.sign(timestamp);

        let file_part = reqwest::multipart::Part::bytes(data)
            .file_name(attachment.original_filename.clone())
            .mime_str(&attachment.content_type)
            .map_err(|e| PublishError::UploadFailed(format!("Invalid content type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        // resource_type "auto" lets the provider detect images vs documents,
        // matching how submissions carry arbitrary file types.
        let url = format!("{}/v1_1/{}/auto/upload", self.api_base, self.cloud_name);
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::UploadFailed(format!("Upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::UploadFailed(format!(
                "Provider returned {}: {}",
                status, body
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(format!("Malformed response: {}", e)))?;

        let durable_url = parsed
            .secure_url
            .or(parsed.url)
            .ok_or_else(|| {
                PublishError::InvalidResponse("Response missing secure_url".to_string())
            })?;

        tracing::info!(
            filename = %attachment.original_filename,
            size_bytes = attachment.size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cloudinary publish successful"
        );

        Ok(durable_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stager::{AttachmentStager, RawPart};
    use tempfile::tempdir;

    async fn staged(dir: &std::path::Path) -> StagedAttachment {
        let stager = AttachmentStager::new(dir, 10, 1024 * 1024).await.unwrap();
        let batch = stager
            .stage(vec![RawPart {
                filename: "car.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
                data: b"jpeg bytes".to_vec(),
            }])
            .await
            .unwrap();
        batch.attachments.into_iter().next().unwrap()
    }

    #[test]
    fn signature_is_deterministic_hex_sha256() {
        let publisher = CloudinaryPublisher::new(
            "demo".to_string(),
            "key".to_string(),
            "secret".to_string(),
        )
        .unwrap();
        let a = publisher.sign(1700000000);
        let b = publisher.sign(1700000000);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn publish_returns_secure_url_from_provider() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1_1/demo/auto/upload")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"secure_url":"https://res.example.com/demo/car.jpg"}"#)
            .create_async()
            .await;

        let staging = tempdir().unwrap();
        let attachment = staged(staging.path()).await;

        let publisher = CloudinaryPublisher::with_api_base(
            "demo".to_string(),
            "key".to_string(),
            "secret".to_string(),
            server.url(),
        )
        .unwrap();

        let url = publisher.publish(&attachment).await.unwrap();
        assert_eq!(url, "https://res.example.com/demo/car.jpg");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn provider_error_status_maps_to_upload_failed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1_1/demo/auto/upload")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid signature"}}"#)
            .create_async()
            .await;

        let staging = tempdir().unwrap();
        let attachment = staged(staging.path()).await;

        let publisher = CloudinaryPublisher::with_api_base(
            "demo".to_string(),
            "key".to_string(),
            "secret".to_string(),
            server.url(),
        )
        .unwrap();

        let result = publisher.publish(&attachment).await;
        assert!(matches!(result, Err(PublishError::UploadFailed(_))));
    }

    #[tokio::test]
    async fn missing_secure_url_maps_to_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1_1/demo/auto/upload")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"public_id":"abc"}"#)
            .create_async()
            .await;

        let staging = tempdir().unwrap();
        let attachment = staged(staging.path()).await;

        let publisher = CloudinaryPublisher::with_api_base(
            "demo".to_string(),
            "key".to_string(),
            "secret".to_string(),
            server.url(),
        )
        .unwrap();

        let result = publisher.publish(&attachment).await;
        assert!(matches!(result, Err(PublishError::InvalidResponse(_))));
    }
}
