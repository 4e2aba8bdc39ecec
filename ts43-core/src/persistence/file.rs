use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use ts43_model::SubscriptionId;

use super::ConfigurationRepository;
use crate::configuration::EntitlementConfiguration;
use crate::error::StoreError;

/// One JSON file per subscription under a root directory.
///
/// Writes go to a sibling temp file that is renamed over the record, so a
/// reader (or a cancelled writer) never observes a half-written record.
#[derive(Debug, Clone)]
pub struct FileConfigurationRepository {
    root: PathBuf,
}

impl FileConfigurationRepository {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| StoreError::Io {
                path: root.clone(),
                source,
            })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, subscription: SubscriptionId) -> PathBuf {
        self.root
            .join(format!("entitlement-config-{}.json", subscription))
    }
}

#[async_trait]
impl ConfigurationRepository for FileConfigurationRepository {
    async fn load(
        &self,
        subscription: SubscriptionId,
    ) -> Result<Option<EntitlementConfiguration>, StoreError> {
        let path = self.record_path(subscription);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let record = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Corrupt { path, source })?;
        Ok(Some(record))
    }

    async fn save(
        &self,
        subscription: SubscriptionId,
        record: &EntitlementConfiguration,
    ) -> Result<(), StoreError> {
        let path = self.record_path(subscription);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(record)?;

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(
            subscription = %subscription,
            path = %path.display(),
            "persisted entitlement configuration"
        );
        Ok(())
    }

    async fn delete(&self, subscription: SubscriptionId) -> Result<(), StoreError> {
        let path = self.record_path(subscription);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}
