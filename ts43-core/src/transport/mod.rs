//! Entitlement server transport boundary.
//!
//! The engine hands a transport the application ids to query and the
//! request fields; the transport returns the raw response text or a typed
//! failure. HTTP specifics stay behind [`EntitlementTransport`].

mod http;

use async_trait::async_trait;
use thiserror::Error;

pub use http::{HttpEntitlementTransport, HttpTransportSettings};

/// Placeholder device identity sent instead of real terminal details.
pub const PLACEHOLDER_VENDOR: &str = "vendorX";
pub const PLACEHOLDER_MODEL: &str = "modelY";
pub const PLACEHOLDER_SW_VERSION: &str = "versionZ";

/// Fields of one entitlement query.
#[derive(Clone, PartialEq, Eq)]
pub struct EntitlementRequest {
    /// Cached token, absent on the first query or after expiry.
    pub auth_token: Option<String>,
    pub notification_token: Option<String>,
    pub notification_action: Option<String>,
    /// Stored `VERS` version, sent back as `vers`.
    pub configuration_version: i32,
    /// Protocol version, `"2.0"` or `"8.0"`.
    pub entitlement_version: String,
    pub device_vendor: String,
    pub device_model: String,
    pub device_sw_version: String,
}

impl EntitlementRequest {
    pub fn new(configuration_version: i32, entitlement_version: impl Into<String>) -> Self {
        Self {
            auth_token: None,
            notification_token: None,
            notification_action: None,
            configuration_version,
            entitlement_version: entitlement_version.into(),
            device_vendor: PLACEHOLDER_VENDOR.to_string(),
            device_model: PLACEHOLDER_MODEL.to_string(),
            device_sw_version: PLACEHOLDER_SW_VERSION.to_string(),
        }
    }
}

impl std::fmt::Debug for EntitlementRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementRequest")
            .field("has_auth_token", &self.auth_token.is_some())
            .field("has_notification_token", &self.notification_token.is_some())
            .field("notification_action", &self.notification_action)
            .field("configuration_version", &self.configuration_version)
            .field("entitlement_version", &self.entitlement_version)
            .field("device_vendor", &self.device_vendor)
            .field("device_model", &self.device_model)
            .field("device_sw_version", &self.device_sw_version)
            .finish()
    }
}

/// Typed query failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Server rejected the authentication token.
    #[error("authentication token expired")]
    TokenExpired,

    #[error("server answered HTTP {code}")]
    HttpStatus {
        code: u16,
        /// Raw `Retry-After` header, if the server sent one.
        retry_after: Option<String>,
    },

    #[error("network error: {0}")]
    Network(String),
}

impl TransportFailure {
    pub fn http(code: u16) -> Self {
        Self::HttpStatus {
            code,
            retry_after: None,
        }
    }
}

#[async_trait]
pub trait EntitlementTransport: Send + Sync + std::fmt::Debug {
    /// Query the given application ids and return the raw response text.
    async fn query(
        &self,
        app_ids: &[&str],
        request: &EntitlementRequest,
    ) -> Result<String, TransportFailure>;
}
