//! Attachment staging
//!
//! Stages uploaded binary parts to a per-request scratch directory and
//! hands back ordered `StagedAttachment` handles. A failed call rolls back
//! everything it already wrote before the error propagates.

use std::path::{Path, PathBuf};

use carbazar_core::models::StagedAttachment;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Staging errors. Any of these rejects the whole submission before a
/// single external call is made.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Too many attachments: {count} exceeds limit of {max}")]
    TooManyFiles { count: usize, max: usize },

    #[error("Attachment '{filename}' is too large: {size} bytes exceeds max {max} bytes")]
    FileTooLarge {
        filename: String,
        size: usize,
        max: usize,
    },

    #[error("Invalid attachment filename: {0}")]
    InvalidFilename(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One uploaded binary part as received from the inbound request.
#[derive(Debug, Clone)]
pub struct RawPart {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Staged attachments for one request plus the scratch directory that
/// holds them. The directory is removed by `cleanup()`.
#[derive(Debug)]
pub struct StagedBatch {
    dir: PathBuf,
    pub attachments: Vec<StagedAttachment>,
}

impl StagedBatch {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remove the request's scratch directory. Best-effort: a failure is
    /// logged and swallowed, never surfaced to the caller.
    pub async fn cleanup(&self) {
        if let Err(e) = fs::remove_dir_all(&self.dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    error = %e,
                    dir = %self.dir.display(),
                    "Failed to clean up staged attachments"
                );
            }
        }
    }
}

/// Stages uploaded parts under `{staging_root}/{request_uuid}/`.
#[derive(Clone)]
pub struct AttachmentStager {
    staging_root: PathBuf,
    max_files: usize,
    max_file_size: usize,
}

impl AttachmentStager {
    /// Create a new stager rooted at `staging_root`, creating the root
    /// directory if it does not exist.
    pub async fn new(
        staging_root: impl Into<PathBuf>,
        max_files: usize,
        max_file_size: usize,
    ) -> Result<Self, StageError> {
        let staging_root = staging_root.into();
        fs::create_dir_all(&staging_root).await?;
        Ok(Self {
            staging_root,
            max_files,
            max_file_size,
        })
    }

    /// Stage all parts for one request, preserving input order.
    ///
    /// On any failure, files already written for this call are removed
    /// before the error propagates.
    pub async fn stage(&self, parts: Vec<RawPart>) -> Result<StagedBatch, StageError> {
        if parts.len() > self.max_files {
            return Err(StageError::TooManyFiles {
                count: parts.len(),
                max: self.max_files,
            });
        }

        let dir = self.staging_root.join(Uuid::new_v4().to_string());
        fs::create_dir_all(&dir).await?;

        let mut attachments = Vec::with_capacity(parts.len());
        for (index, part) in parts.into_iter().enumerate() {
            match self.stage_part(&dir, index, part).await {
                Ok(attachment) => attachments.push(attachment),
                Err(e) => {
                    // Roll back the whole request directory so a partial
                    // failure leaves no orphaned temp files.
                    if let Err(cleanup_err) = fs::remove_dir_all(&dir).await {
                        tracing::warn!(
                            error = %cleanup_err,
                            dir = %dir.display(),
                            "Failed to roll back staging directory after error"
                        );
                    }
                    return Err(e);
                }
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            count = attachments.len(),
            "Staged attachments"
        );

        Ok(StagedBatch { dir, attachments })
    }

    async fn stage_part(
        &self,
        dir: &Path,
        index: usize,
        part: RawPart,
    ) -> Result<StagedAttachment, StageError> {
        if part.data.len() > self.max_file_size {
            return Err(StageError::FileTooLarge {
                filename: part.filename,
                size: part.data.len(),
                max: self.max_file_size,
            });
        }

        let safe_name = sanitize_filename(&part.filename)?;
        // Index prefix keeps duplicate filenames within one request apart.
        let staged_path = dir.join(format!("{}-{}", index, safe_name));

        let mut file = fs::File::create(&staged_path).await?;
        file.write_all(&part.data).await?;
        file.sync_all().await?;

        Ok(StagedAttachment {
            original_filename: part.filename,
            staged_path,
            content_type: part.content_type,
            size_bytes: part.data.len() as u64,
            published_url: None,
        })
    }
}

/// Reduce an uploaded filename to a safe basename: path components are
/// stripped, traversal sequences rejected, and unusual characters replaced.
fn sanitize_filename(filename: &str) -> Result<String, StageError> {
    const MAX_FILENAME_LENGTH: usize = 255;

    let path = Path::new(filename);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if filename_only.contains("..") {
        return Err(StageError::InvalidFilename(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn part(filename: &str, data: &[u8]) -> RawPart {
        RawPart {
            filename: filename.to_string(),
            content_type: "image/jpeg".to_string(),
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn stage_preserves_order_and_writes_files() {
        let dir = tempdir().unwrap();
        let stager = AttachmentStager::new(dir.path(), 10, 1024).await.unwrap();

        let batch = stager
            .stage(vec![part("front.jpg", b"aaa"), part("back.jpg", b"bbb")])
            .await
            .unwrap();

        assert_eq!(batch.attachments.len(), 2);
        assert_eq!(batch.attachments[0].original_filename, "front.jpg");
        assert_eq!(batch.attachments[1].original_filename, "back.jpg");
        for a in &batch.attachments {
            assert!(a.staged_path.exists());
            assert!(a.published_url.is_none());
        }
    }

    #[tokio::test]
    async fn stage_rejects_too_many_files_before_writing() {
        let dir = tempdir().unwrap();
        let stager = AttachmentStager::new(dir.path(), 10, 1024).await.unwrap();

        let parts: Vec<RawPart> = (0..11).map(|i| part(&format!("{i}.jpg"), b"x")).collect();
        let result = stager.stage(parts).await;
        assert!(matches!(
            result,
            Err(StageError::TooManyFiles { count: 11, max: 10 })
        ));

        // No request directory left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn partial_failure_rolls_back_already_staged_files() {
        let dir = tempdir().unwrap();
        let stager = AttachmentStager::new(dir.path(), 10, 4).await.unwrap();

        let result = stager
            .stage(vec![part("ok.jpg", b"abc"), part("big.jpg", b"too large")])
            .await;
        assert!(matches!(result, Err(StageError::FileTooLarge { .. })));

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(entries.is_empty(), "staged files must be rolled back");
    }

    // Only count and size limits reject a part; a zero-byte upload is the
    // uploader's problem, not grounds to drop the whole submission.
    #[tokio::test]
    async fn stage_accepts_empty_file() {
        let dir = tempdir().unwrap();
        let stager = AttachmentStager::new(dir.path(), 10, 1024).await.unwrap();

        let batch = stager
            .stage(vec![part("empty.jpg", b""), part("full.jpg", b"abc")])
            .await
            .unwrap();
        assert_eq!(batch.attachments.len(), 2);
        assert_eq!(batch.attachments[0].size_bytes, 0);
        assert!(batch.attachments[0].staged_path.exists());
    }

    #[tokio::test]
    async fn traversal_filenames_are_rejected() {
        let dir = tempdir().unwrap();
        let stager = AttachmentStager::new(dir.path(), 10, 1024).await.unwrap();

        let result = stager.stage(vec![part("..", b"data")]).await;
        assert!(matches!(result, Err(StageError::InvalidFilename(_))));
    }

    #[tokio::test]
    async fn duplicate_filenames_stage_to_distinct_paths() {
        let dir = tempdir().unwrap();
        let stager = AttachmentStager::new(dir.path(), 10, 1024).await.unwrap();

        let batch = stager
            .stage(vec![part("car.jpg", b"one"), part("car.jpg", b"two")])
            .await
            .unwrap();
        assert_ne!(
            batch.attachments[0].staged_path,
            batch.attachments[1].staged_path
        );
    }

    #[tokio::test]
    async fn cleanup_removes_the_request_directory() {
        let dir = tempdir().unwrap();
        let stager = AttachmentStager::new(dir.path(), 10, 1024).await.unwrap();

        let batch = stager.stage(vec![part("a.jpg", b"abc")]).await.unwrap();
        let staged_dir = batch.dir().to_path_buf();
        assert!(staged_dir.exists());

        batch.cleanup().await;
        assert!(!staged_dir.exists());

        // Second cleanup is a no-op
        batch.cleanup().await;
    }
}
