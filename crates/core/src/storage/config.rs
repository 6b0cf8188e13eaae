//! Storage configuration types.

use std::path::PathBuf;

use folio_shared::StorageSettings;
use serde::{Deserialize, Serialize};

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, MinIO, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Local filesystem
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Create S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Picks the provider from application settings. A configured S3 bucket
    /// wins over the output directory.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        match &settings.s3 {
            Some(s3) => Self::s3(
                &s3.endpoint,
                &s3.bucket,
                &s3.access_key_id,
                &s3.secret_access_key,
                &s3.region,
            ),
            None => Self::local_fs(&settings.output_dir),
        }
    }

    /// Get the provider name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Get the bucket name or root directory.
    #[must_use]
    pub fn location(&self) -> String {
        match self {
            Self::S3 { bucket, .. } => bucket.clone(),
            Self::LocalFs { root } => root.display().to_string(),
        }
    }
}
