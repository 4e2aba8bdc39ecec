//! Entitlement query orchestration.
//!
//! [`QueryOrchestrator::check_entitlement_status`] builds the request from the
//! cached configuration, calls the transport, recovers from an expired token
//! by resetting the configuration and querying again (at most
//! [`INITIAL_RETRY_BUDGET`] times), and turns the response into an
//! [`EntitlementResult`].

use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use tracing::{debug, info, warn};
use ts43_model::wire::{app_id, entitlement_version};
use ts43_model::{EntitlementResult, SubscriptionId};

use crate::clock::Clock;
use crate::configuration::ConfigurationStore;
use crate::document::ResponseDocument;
use crate::notification::NotificationTokenSource;
use crate::status::derive_result;
use crate::transport::{EntitlementRequest, EntitlementTransport, TransportFailure};

/// Full re-authentications allowed after a token-expired answer.
pub const INITIAL_RETRY_BUDGET: u32 = 1;

const SERVICE_UNAVAILABLE: u16 = 503;

/// Carrier-dependent query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuerySettings {
    /// Carrier provisions VoLTE, VoNR and SMSoIP through entitlement too.
    pub needs_ims_provisioning: bool,
}

impl QuerySettings {
    pub fn app_ids(&self) -> &'static [&'static str] {
        if self.needs_ims_provisioning {
            &[app_id::VOWIFI, app_id::VOLTE, app_id::SMSOIP]
        } else {
            &[app_id::VOWIFI]
        }
    }

    pub fn entitlement_version(&self) -> &'static str {
        if self.needs_ims_provisioning {
            entitlement_version::V8
        } else {
            entitlement_version::V2
        }
    }
}

/// Per-subscription query driver.
///
/// Holds the retry budget across calls; the caller serializes access together
/// with the subscription's [`ConfigurationStore`].
pub struct QueryOrchestrator {
    subscription: SubscriptionId,
    transport: Arc<dyn EntitlementTransport>,
    notifications: Arc<dyn NotificationTokenSource>,
    clock: Arc<dyn Clock>,
    settings: QuerySettings,
    retry_budget: u32,
}

impl std::fmt::Debug for QueryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryOrchestrator")
            .field("subscription", &self.subscription)
            .field("settings", &self.settings)
            .field("retry_budget", &self.retry_budget)
            .finish()
    }
}

impl QueryOrchestrator {
    pub fn new(
        subscription: SubscriptionId,
        transport: Arc<dyn EntitlementTransport>,
        notifications: Arc<dyn NotificationTokenSource>,
        clock: Arc<dyn Clock>,
        settings: QuerySettings,
    ) -> Self {
        Self {
            subscription,
            transport,
            notifications,
            clock,
            settings,
            retry_budget: INITIAL_RETRY_BUDGET,
        }
    }

    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    pub fn settings(&self) -> QuerySettings {
        self.settings
    }

    /// Query the server and derive the result.
    ///
    /// `None` means the query produced nothing usable and the caller should
    /// keep its last known state.
    pub async fn check_entitlement_status(
        &mut self,
        store: &mut ConfigurationStore,
    ) -> Option<EntitlementResult> {
        let app_ids = self.settings.app_ids();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let request = self.build_request(store).await;
            debug!(
                subscription = %self.subscription,
                attempt,
                request = ?request,
                "querying entitlement server"
            );

            match self.transport.query(app_ids, &request).await {
                Ok(raw) => {
                    self.retry_budget = INITIAL_RETRY_BUDGET;
                    let result = self.apply_response(store, raw).await;
                    info!(
                        subscription = %self.subscription,
                        attempt,
                        vowifi_entitled = result.vowifi.entitled(),
                        "entitlement query succeeded"
                    );
                    return Some(result);
                }
                Err(TransportFailure::TokenExpired) => {
                    if self.retry_budget == 0 {
                        warn!(
                            subscription = %self.subscription,
                            attempt,
                            "token expired and retry budget exhausted"
                        );
                        return None;
                    }
                    self.retry_budget -= 1;
                    info!(
                        subscription = %self.subscription,
                        attempt,
                        "token expired; resetting configuration and retrying"
                    );
                    store.reset().await;
                }
                Err(TransportFailure::HttpStatus {
                    code: SERVICE_UNAVAILABLE,
                    retry_after: Some(header),
                }) => {
                    self.retry_budget = INITIAL_RETRY_BUDGET;
                    let Some(seconds) = self.retry_after_seconds(&header) else {
                        warn!(
                            subscription = %self.subscription,
                            retry_after = %header,
                            "server unavailable with unparseable Retry-After"
                        );
                        return None;
                    };
                    info!(
                        subscription = %self.subscription,
                        attempt,
                        retry_after_secs = seconds,
                        "server unavailable; follow-up requested"
                    );
                    return Some(EntitlementResult::retry_after(seconds));
                }
                Err(failure) => {
                    self.retry_budget = INITIAL_RETRY_BUDGET;
                    warn!(
                        subscription = %self.subscription,
                        attempt,
                        error = %failure,
                        "entitlement query failed"
                    );
                    return None;
                }
            }
        }
    }

    async fn build_request(&self, store: &ConfigurationStore) -> EntitlementRequest {
        let mut request =
            EntitlementRequest::new(store.version(), self.settings.entitlement_version());
        request.auth_token = store.token();
        request.notification_token = self
            .notifications
            .notification_token(self.subscription)
            .await;
        if request.notification_token.is_some() {
            let action = self.notifications.notification_action();
            request.notification_action = Some(action.as_wire().to_string());
        }
        request
    }

    async fn apply_response(
        &self,
        store: &mut ConfigurationStore,
        raw: String,
    ) -> EntitlementResult {
        let document = ResponseDocument::parse(&raw);
        let behavior = store.apply_response(&document, raw).await;
        if behavior.requires_reset() {
            return EntitlementResult::default();
        }

        derive_result(&document)
    }

    /// Seconds until the server wants to be queried again, from a
    /// `Retry-After` value in delta-seconds or HTTP-date form.
    fn retry_after_seconds(&self, header: &str) -> Option<u64> {
        let header = header.trim();
        if let Ok(seconds) = header.parse::<u64>() {
            return Some(seconds);
        }

        let at = httpdate::parse_http_date(header).ok()?;
        let at_ms = at
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as i64;
        let remaining_ms = at_ms - self.clock.now_millis();
        Some((remaining_ms.max(0) / 1_000) as u64)
    }
}
