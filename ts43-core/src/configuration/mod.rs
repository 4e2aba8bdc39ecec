//! Cached entitlement configuration and its validity state machine.
//!
//! One [`ConfigurationStore`] exists per subscription. It owns the last
//! response the server sent together with the configuration version and the
//! time of the query, and answers two questions from it: "may the cached
//! token still be sent?" and "what must the client do with its cached
//! configuration?" ([`ClientBehavior`]).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts43_model::wire::parm;
use ts43_model::{ClientBehavior, SubscriptionId};

use crate::clock::Clock;
use crate::document::{ResponseDocument, Selector};
use crate::persistence::ConfigurationRepository;

/// Persisted per-subscription record.
///
/// Token and validity values are not stored separately; they are re-read
/// from `raw_document` on every access.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntitlementConfiguration {
    /// `VERS` version the server last assigned. `0` when unconfigured.
    pub version: i32,
    pub raw_document: Option<String>,
    /// When `raw_document` was received. `0` when never queried.
    pub last_query_timestamp_ms: i64,
}

impl EntitlementConfiguration {
    pub fn document(&self) -> ResponseDocument {
        self.raw_document
            .as_deref()
            .map(ResponseDocument::parse)
            .unwrap_or_default()
    }
}

/// Minimal document persisted by `reset_for` for the "except VERS" behaviors:
/// version markers kept, token emptied, service data dropped.
fn marker_document(marker: i32) -> String {
    format!(
        concat!(
            r#"<wap-provisioningdoc version="1.1">"#,
            r#"<characteristic type="VERS">"#,
            r#"<parm name="version" value="{marker}"/>"#,
            r#"<parm name="validity" value="{marker}"/>"#,
            r#"</characteristic>"#,
            r#"<characteristic type="TOKEN">"#,
            r#"<parm name="token" value=""/>"#,
            r#"</characteristic>"#,
            r#"</wap-provisioningdoc>"#
        ),
        marker = marker
    )
}

/// Per-subscription configuration cache backed by a repository.
///
/// Mutations write through to the repository before the in-memory record
/// changes. Repository failures are logged and otherwise ignored.
pub struct ConfigurationStore {
    subscription: SubscriptionId,
    repository: Arc<dyn ConfigurationRepository>,
    clock: Arc<dyn Clock>,
    record: EntitlementConfiguration,
}

impl std::fmt::Debug for ConfigurationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationStore")
            .field("subscription", &self.subscription)
            .field("version", &self.record.version)
            .field("has_document", &self.record.raw_document.is_some())
            .field("last_query_timestamp_ms", &self.record.last_query_timestamp_ms)
            .finish()
    }
}

impl ConfigurationStore {
    /// Load the persisted record, falling back to an empty one.
    pub async fn load(
        subscription: SubscriptionId,
        repository: Arc<dyn ConfigurationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let record = match repository.load(subscription).await {
            Ok(Some(record)) => record,
            Ok(None) => EntitlementConfiguration::default(),
            Err(err) => {
                warn!(
                    subscription = %subscription,
                    error = %err,
                    "failed to load entitlement configuration; starting empty"
                );
                EntitlementConfiguration::default()
            }
        };

        Self {
            subscription,
            repository,
            clock,
            record,
        }
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    pub fn record(&self) -> &EntitlementConfiguration {
        &self.record
    }

    pub fn version(&self) -> i32 {
        self.record.version
    }

    /// Cached document, parsed afresh.
    pub fn document(&self) -> ResponseDocument {
        self.record.document()
    }

    /// `TOKEN` validity in seconds; `0` (or negative) means unlimited.
    pub fn token_validity_secs(&self) -> i64 {
        self.document()
            .get_i64(Selector::Token, parm::VALIDITY)
            .unwrap_or(0)
    }

    /// `VERS` validity in seconds.
    pub fn vers_validity_secs(&self) -> i64 {
        self.document()
            .get_i64(Selector::Version, parm::VALIDITY)
            .unwrap_or(0)
    }

    /// Token to authenticate the next query with, if still valid.
    pub fn token(&self) -> Option<String> {
        let last = self.record.last_query_timestamp_ms;
        if last <= 0 {
            return None;
        }

        let document = self.document();
        let validity = document
            .get_i64(Selector::Token, parm::VALIDITY)
            .unwrap_or(0);
        let elapsed_ms = self.clock.now_millis() - last;
        if validity > 0 && elapsed_ms >= validity.saturating_mul(1_000) {
            debug!(
                subscription = %self.subscription,
                validity_secs = validity,
                elapsed_ms,
                "cached token expired"
            );
            return None;
        }

        document
            .get(Selector::Token, parm::TOKEN)
            .map(str::to_string)
    }

    pub fn entitlement_validation(&self) -> ClientBehavior {
        ClientBehavior::evaluate(self.record.version, self.vers_validity_secs())
    }

    /// Replace the cached configuration with a fresh server response.
    pub async fn update(&mut self, version: i32, raw_document: String) {
        let record = EntitlementConfiguration {
            version,
            raw_document: Some(raw_document),
            last_query_timestamp_ms: self.clock.now_millis(),
        };
        self.persist(&record).await;
        self.record = record;
        debug!(
            subscription = %self.subscription,
            version,
            "entitlement configuration updated"
        );
    }

    /// Install a server response, or the reset it instructs, with a single
    /// repository write.
    ///
    /// The behavior is evaluated on `document` before the store changes, so a
    /// reset instruction never passes through a state holding the full
    /// response. Returns that behavior.
    pub async fn apply_response(
        &mut self,
        document: &ResponseDocument,
        raw_document: String,
    ) -> ClientBehavior {
        let version = document
            .get_i32(Selector::Version, parm::VERSION)
            .unwrap_or(0);
        let validity = document
            .get_i64(Selector::Version, parm::VALIDITY)
            .unwrap_or(0);
        let behavior = ClientBehavior::evaluate(version, validity);

        if behavior.requires_reset() {
            info!(
                subscription = %self.subscription,
                behavior = %behavior,
                "server requested configuration reset"
            );
            self.reset_for(behavior).await;
        } else {
            self.update(version, raw_document).await;
        }
        behavior
    }

    /// Forget everything: version 0, no document, no token.
    pub async fn reset(&mut self) {
        if let Err(err) = self.repository.delete(self.subscription).await {
            warn!(
                subscription = %self.subscription,
                error = %err,
                "failed to delete persisted entitlement configuration"
            );
        }
        self.record = EntitlementConfiguration::default();
        info!(subscription = %self.subscription, "entitlement configuration reset");
    }

    /// Apply the reset a [`ClientBehavior`] asks for.
    ///
    /// The two "except VERS" behaviors keep their version marker in a minimal
    /// document so the server's instruction survives the reset.
    pub async fn reset_for(&mut self, behavior: ClientBehavior) {
        match behavior.retained_marker() {
            Some(marker) => {
                let record = EntitlementConfiguration {
                    version: marker,
                    raw_document: Some(marker_document(marker)),
                    last_query_timestamp_ms: self.clock.now_millis(),
                };
                self.persist(&record).await;
                self.record = record;
                info!(
                    subscription = %self.subscription,
                    behavior = %behavior,
                    "entitlement configuration reset, version marker kept"
                );
            }
            None if behavior == ClientBehavior::NeedsToReset => self.reset().await,
            None => {}
        }
    }

    async fn persist(&self, record: &EntitlementConfiguration) {
        if let Err(err) = self.repository.save(self.subscription, record).await {
            warn!(
                subscription = %self.subscription,
                error = %err,
                "failed to persist entitlement configuration"
            );
        }
    }
}
