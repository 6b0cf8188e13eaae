//! Persistence of released export artifacts using Apache OpenDAL.
//!
//! Supported backends:
//! - S3-compatible: Cloudflare R2, MinIO, AWS S3, DigitalOcean Spaces
//! - Local filesystem
//!
//! Artifacts with validation errors are never written.

mod config;
mod error;
mod service;

pub use config::StorageProvider;
pub use error::StorageError;
pub use service::{ArtifactStore, artifact_key};
