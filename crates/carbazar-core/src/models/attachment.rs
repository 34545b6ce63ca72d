//! Staged attachment handle.

use std::path::PathBuf;

/// One uploaded file, staged to a scoped temporary location for the
/// duration of a single dispatch. `published_url` is populated only when a
/// channel requires a durable URL. The dispatcher owns the staged copy and
/// removes it once no pending sender still needs it.
#[derive(Debug, Clone)]
pub struct StagedAttachment {
    pub original_filename: String,
    pub staged_path: PathBuf,
    pub content_type: String,
    pub size_bytes: u64,
    pub published_url: Option<String>,
}
