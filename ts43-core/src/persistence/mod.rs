//! Persistence of the per-subscription configuration record.
//!
//! The engine only ever reads and replaces whole records; repositories do not
//! need to support partial updates.

mod file;
mod memory;

use async_trait::async_trait;
use ts43_model::SubscriptionId;

use crate::configuration::EntitlementConfiguration;
use crate::error::StoreError;

pub use file::FileConfigurationRepository;
pub use memory::InMemoryConfigurationRepository;

/// Durable key-value storage of [`EntitlementConfiguration`] records.
#[async_trait]
pub trait ConfigurationRepository: Send + Sync + std::fmt::Debug {
    async fn load(
        &self,
        subscription: SubscriptionId,
    ) -> Result<Option<EntitlementConfiguration>, StoreError>;

    async fn save(
        &self,
        subscription: SubscriptionId,
        record: &EntitlementConfiguration,
    ) -> Result<(), StoreError>;

    async fn delete(&self, subscription: SubscriptionId) -> Result<(), StoreError>;
}
