//! Carbazar Storage Library
//!
//! This crate covers the two file-handling concerns of a dispatch:
//! staging uploaded parts to a per-request scratch directory, and
//! publishing staged attachments to a durable, publicly retrievable URL
//! for channels that cannot accept inline binaries.
//!
//! # Staging layout
//!
//! Each `stage()` call writes under `{staging_root}/{request_uuid}/{index}-{filename}`.
//! The whole request directory is removed on cleanup, and already-staged
//! files are rolled back before a partial failure propagates, so a single
//! failed call never leaves orphaned temp files.

pub mod cloudinary;
pub mod factory;
pub mod local;
pub mod stager;
pub mod traits;

// Re-export commonly used types
pub use cloudinary::CloudinaryPublisher;
pub use factory::create_publisher;
pub use local::LocalPublisher;
pub use stager::{AttachmentStager, RawPart, StageError, StagedBatch};
pub use traits::{AssetPublisher, PublishError, PublishResult};
