//! Core data model definitions shared across the TS.43 entitlement crates.
//!
//! Everything here is plain data: identifiers, the fixed wire vocabulary of
//! the `wap-provisioningdoc` profile, the enumerated status codes servers
//! report, the per-service status records with their activation predicates,
//! and the composite [`EntitlementResult`].
#![allow(missing_docs)]

pub mod behavior;
pub mod ids;
pub mod result;
pub mod services;
pub mod status;
pub mod wire;

pub use behavior::ClientBehavior;
pub use ids::SubscriptionId;
pub use result::{EntitlementResult, ServiceKind, ServiceOutcome};
pub use services::{
    SmsOverIpStatus, VoiceCapability, VolteStatus, VonrStatus, VowifiStatus,
};
pub use status::{AddrStatus, EntitlementStatus, ProvStatus, TcStatus};
