//! Artifact store implementation using Apache OpenDAL.

use folio_shared::types::OrganizationId;
use opendal::{ErrorKind, Operator, services};
use tracing::{info, warn};

use super::config::StorageProvider;
use super::error::StorageError;
use crate::export::{ExportOutcome, LayoutKind};

/// Storage key of a released artifact.
///
/// Format: `{layout_kind}_{organization_id}.txt`
#[must_use]
pub fn artifact_key(layout_kind: LayoutKind, organization_id: OrganizationId) -> String {
    format!("{layout_kind}_{organization_id}.txt")
}

/// Store for released export artifacts.
pub struct ArtifactStore {
    operator: Operator,
    provider: StorageProvider,
}

impl ArtifactStore {
    /// Create a new store for the given provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_provider(provider: StorageProvider) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&provider)?;
        Ok(Self { operator, provider })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                let builder = services::Fs::default().root(root);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
        };
        Ok(operator)
    }

    /// Persist a released artifact, returning its key.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseBlocked` if the outcome has validation errors, or an
    /// error if the write fails.
    pub async fn persist(&self, outcome: &ExportOutcome) -> Result<String, StorageError> {
        if !outcome.is_releasable() {
            warn!(
                export_id = %outcome.export_id,
                errors = outcome.errors.len(),
                "Refusing to persist artifact with validation errors"
            );
            return Err(StorageError::ReleaseBlocked {
                count: outcome.errors.len(),
            });
        }

        let key = artifact_key(outcome.layout_kind, outcome.organization_id);
        self.operator
            .write(&key, outcome.artifact.clone().into_bytes())
            .await
            .map_err(StorageError::from)?;

        info!(
            export_id = %outcome.export_id,
            key = %key,
            provider = self.provider_name(),
            bytes = outcome.artifact.len(),
            "Artifact persisted"
        );
        Ok(key)
    }

    /// Read a stored artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact does not exist or is not UTF-8.
    pub async fn read(&self, key: &str) -> Result<String, StorageError> {
        let buffer = self.operator.read(key).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::not_found(key)
            } else {
                StorageError::from(e)
            }
        })?;

        String::from_utf8(buffer.to_vec()).map_err(|_| StorageError::InvalidContent {
            key: key.to_string(),
        })
    }

    /// Check if an artifact exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.stat(key).await.is_ok()
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Get the bucket name or root directory.
    #[must_use]
    pub fn location(&self) -> String {
        self.provider.location()
    }
}
