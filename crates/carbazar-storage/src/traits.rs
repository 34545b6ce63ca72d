//! Asset publisher abstraction trait
//!
//! This module defines the AssetPublisher trait that all publishing
//! backends must implement.

use async_trait::async_trait;
use carbazar_core::models::StagedAttachment;
use thiserror::Error;

/// Publish operation errors
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for publish operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Asset publisher abstraction trait
///
/// Publishing turns a staged local file into a durable, publicly
/// retrievable URL. Re-publishing the same attachment is safe but creates
/// a new remote copy; there is no dedup guarantee. Only channels whose
/// sender declares `requires_durable_url` ever trigger a publish.
#[async_trait]
pub trait AssetPublisher: Send + Sync {
    /// Upload a staged attachment and return its durable URL.
    async fn publish(&self, attachment: &StagedAttachment) -> PublishResult<String>;
}
