//! Per-subscription engine handles.
//!
//! A subscription's configuration store and query orchestrator live in one
//! [`EntitlementHandle`] behind a single async mutex, so queries, resets and
//! reads for that subscription never interleave. The registry creates each
//! handle on first use and hands out the same `Arc` afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;
use ts43_model::{ClientBehavior, EntitlementResult, SubscriptionId};

use crate::clock::Clock;
use crate::configuration::{ConfigurationStore, EntitlementConfiguration};
use crate::notification::NotificationTokenSource;
use crate::orchestrator::{QueryOrchestrator, QuerySettings};
use crate::persistence::ConfigurationRepository;
use crate::transport::EntitlementTransport;

/// Collaborators shared by every subscription.
#[derive(Clone)]
pub struct EngineDependencies {
    pub transport: Arc<dyn EntitlementTransport>,
    pub notifications: Arc<dyn NotificationTokenSource>,
    pub repository: Arc<dyn ConfigurationRepository>,
    pub clock: Arc<dyn Clock>,
    pub settings: QuerySettings,
}

impl fmt::Debug for EngineDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineDependencies")
            .field("transport", &self.transport)
            .field("repository", &self.repository)
            .field("settings", &self.settings)
            .finish()
    }
}

#[derive(Debug)]
struct HandleState {
    store: ConfigurationStore,
    orchestrator: QueryOrchestrator,
}

/// Serialized access to one subscription's engine state.
#[derive(Debug)]
pub struct EntitlementHandle {
    subscription: SubscriptionId,
    state: Mutex<HandleState>,
}

impl EntitlementHandle {
    async fn open(subscription: SubscriptionId, deps: &EngineDependencies) -> Self {
        let store =
            ConfigurationStore::load(subscription, deps.repository.clone(), deps.clock.clone())
                .await;
        let orchestrator = QueryOrchestrator::new(
            subscription,
            deps.transport.clone(),
            deps.notifications.clone(),
            deps.clock.clone(),
            deps.settings,
        );
        Self {
            subscription,
            state: Mutex::new(HandleState {
                store,
                orchestrator,
            }),
        }
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Run one entitlement query while holding the subscription lock.
    pub async fn check_entitlement_status(&self) -> Option<EntitlementResult> {
        let mut guard = self.state.lock().await;
        let HandleState {
            store,
            orchestrator,
        } = &mut *guard;
        orchestrator.check_entitlement_status(store).await
    }

    pub async fn configuration(&self) -> EntitlementConfiguration {
        self.state.lock().await.store.record().clone()
    }

    pub async fn client_behavior(&self) -> ClientBehavior {
        self.state.lock().await.store.entitlement_validation()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.lock().await.store.token()
    }

    pub async fn reset(&self) {
        self.state.lock().await.store.reset().await;
    }
}

/// Map of subscription id to its lazily created handle.
pub struct SubscriptionRegistry {
    deps: EngineDependencies,
    handles: Mutex<HashMap<SubscriptionId, Arc<EntitlementHandle>>>,
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("deps", &self.deps)
            .field(
                "handle_count",
                &self.handles.try_lock().map(|h| h.len()).unwrap_or(0),
            )
            .finish()
    }
}

impl SubscriptionRegistry {
    pub fn new(deps: EngineDependencies) -> Self {
        Self {
            deps,
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> QuerySettings {
        self.deps.settings
    }

    /// Handle for `subscription`, loading its configuration on first use.
    ///
    /// The load runs outside the map lock. When two callers race on the same
    /// new subscription the first insert wins and both get that handle.
    pub async fn handle(&self, subscription: SubscriptionId) -> Arc<EntitlementHandle> {
        if let Some(handle) = self.handles.lock().await.get(&subscription) {
            return handle.clone();
        }

        let opened = Arc::new(EntitlementHandle::open(subscription, &self.deps).await);
        let mut handles = self.handles.lock().await;
        let handle = handles.entry(subscription).or_insert_with(|| {
            debug!(subscription = %subscription, "opened entitlement handle");
            opened
        });
        handle.clone()
    }

    pub async fn len(&self) -> usize {
        self.handles.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.handles.lock().await.is_empty()
    }
}
