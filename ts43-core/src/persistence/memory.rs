use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use ts43_model::SubscriptionId;

use super::ConfigurationRepository;
use crate::configuration::EntitlementConfiguration;
use crate::error::StoreError;

/// Process-local repository. Used in tests and when no storage directory is
/// configured.
#[derive(Debug, Default)]
pub struct InMemoryConfigurationRepository {
    records: RwLock<HashMap<SubscriptionId, EntitlementConfiguration>>,
}

impl InMemoryConfigurationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl ConfigurationRepository for InMemoryConfigurationRepository {
    async fn load(
        &self,
        subscription: SubscriptionId,
    ) -> Result<Option<EntitlementConfiguration>, StoreError> {
        Ok(self.records.read().await.get(&subscription).cloned())
    }

    async fn save(
        &self,
        subscription: SubscriptionId,
        record: &EntitlementConfiguration,
    ) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(subscription, record.clone());
        Ok(())
    }

    async fn delete(&self, subscription: SubscriptionId) -> Result<(), StoreError> {
        self.records.write().await.remove(&subscription);
        Ok(())
    }
}
