//! TS.43 entitlement engine.
//!
//! Queries a carrier entitlement server on behalf of a subscription, caches
//! the returned configuration and token under the server's validity rules,
//! and derives whether VoWiFi, VoLTE, VoNR and SMS-over-IP may be used.
//!
//! Layers, leaf first:
//!
//! - [`document`]: `wap-provisioningdoc` parsing into keyed attribute maps
//! - [`configuration`]: per-subscription cache and its validity state machine
//! - [`status`]: service status derivation
//! - [`orchestrator`]: request building, token-expiry retry, result assembly
//! - [`polling`]: provisioning decisions, follow-ups and single-flight polls
//!
//! Network, storage, push tokens, scheduling and the platform provisioning
//! switches are collaborators behind traits.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod clock;
pub mod configuration;
pub mod document;
pub mod error;
pub mod metrics;
pub mod notification;
pub mod orchestrator;
pub mod persistence;
pub mod polling;
pub mod registry;
pub mod status;
pub mod transport;

pub use clock::{Clock, FixedClock, SystemClock};
pub use configuration::{ConfigurationStore, EntitlementConfiguration};
pub use document::{AttributeMap, ResponseDocument, Selector};
pub use error::{StoreError, StoreResult};
pub use metrics::{EntitlementMetrics, TracingMetrics};
pub use notification::{NotificationAction, NotificationTokenSource, StaticNotificationToken};
pub use orchestrator::{INITIAL_RETRY_BUDGET, QueryOrchestrator, QuerySettings};
pub use persistence::{
    ConfigurationRepository, FileConfigurationRepository, InMemoryConfigurationRepository,
};
pub use polling::{
    FollowUpScheduler, LoggingProvisioningSink, PlanContext, PollingComponents, PollingPlan,
    PollingRun, PollingService, PollingState, ProvisionedFeature, ProvisioningAction,
    ProvisioningSink, TokioFollowUpScheduler,
};
pub use registry::{EngineDependencies, EntitlementHandle, SubscriptionRegistry};
pub use transport::{
    EntitlementRequest, EntitlementTransport, HttpEntitlementTransport, HttpTransportSettings,
    TransportFailure,
};
