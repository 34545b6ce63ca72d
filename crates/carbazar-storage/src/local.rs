//! Local filesystem publisher implementation
//!
//! Copies staged attachments into a locally served media directory and
//! returns URLs under the configured base URL. Suitable for development
//! and single-node deployments where the API serves the media directory.

use crate::traits::{AssetPublisher, PublishError, PublishResult};
use async_trait::async_trait;
use carbazar_core::models::StagedAttachment;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

#[derive(Clone)]
pub struct LocalPublisher {
    base_path: PathBuf,
    base_url: String,
}

impl LocalPublisher {
    /// Create a new LocalPublisher
    ///
    /// # Arguments
    /// * `base_path` - Root directory for published files (e.g., "/var/lib/carbazar/media")
    /// * `base_url` - Base URL the directory is served under (e.g., "http://localhost:5000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> PublishResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            PublishError::ConfigError(format!(
                "Failed to create media directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalPublisher {
            base_path,
            base_url,
        })
    }

    /// Generate public URL for a published key
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

#[async_trait]
impl AssetPublisher for LocalPublisher {
    async fn publish(&self, attachment: &StagedAttachment) -> PublishResult<String> {
        // Uuid prefix keeps re-publishes and duplicate filenames apart.
        let extension = attachment
            .original_filename
            .rsplit('.')
            .next()
            .filter(|ext| ext.chars().all(|c| c.is_alphanumeric()))
            .unwrap_or("bin")
            .to_lowercase();
        let key = format!("{}.{}", Uuid::new_v4(), extension);
        let target = self.base_path.join(&key);

        let start = std::time::Instant::now();

        fs::copy(&attachment.staged_path, &target)
            .await
            .map_err(|e| {
                PublishError::UploadFailed(format!(
                    "Failed to copy {} to {}: {}",
                    attachment.staged_path.display(),
                    target.display(),
                    e
                ))
            })?;

        let url = self.generate_url(&key);

        tracing::info!(
            key = %key,
            size_bytes = attachment.size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local publish successful"
        );

        Ok(url)
    }
}
