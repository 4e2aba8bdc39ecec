use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, warn};
use url::Url;

use super::{EntitlementRequest, EntitlementTransport, TransportFailure};

/// Media type of a TS.43 provisioning document.
const CONNECTIVITY_XML: &str = "text/vnd.wap.connectivity-xml";

/// Connection settings of [`HttpEntitlementTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportSettings {
    pub server_url: String,
    pub timeout: Duration,
}

impl Default for HttpTransportSettings {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Plain HTTP GET transport.
///
/// HTTP 511 is the server's token-expired signal; every other non-success
/// status is reported with its `Retry-After` header attached.
#[derive(Clone)]
pub struct HttpEntitlementTransport {
    client: Client,
    server_url: Url,
}

impl std::fmt::Debug for HttpEntitlementTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEntitlementTransport")
            .field("server_url", &self.server_url.as_str())
            .finish()
    }
}

impl HttpEntitlementTransport {
    pub fn new(settings: &HttpTransportSettings) -> Result<Self, TransportFailure> {
        let normalized = normalize_server_url(&settings.server_url);
        let server_url = Url::parse(&normalized).map_err(|err| {
            TransportFailure::Network(format!("invalid server url '{normalized}': {err}"))
        })?;

        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|err| TransportFailure::Network(err.to_string()))?;

        debug!(server_url = %server_url, "created entitlement transport");
        Ok(Self { client, server_url })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }
}

#[async_trait]
impl EntitlementTransport for HttpEntitlementTransport {
    async fn query(
        &self,
        app_ids: &[&str],
        request: &EntitlementRequest,
    ) -> Result<String, TransportFailure> {
        let response = self
            .client
            .get(self.server_url.clone())
            .header(header::ACCEPT, CONNECTIVITY_XML)
            .query(&query_pairs(app_ids, request))
            .send()
            .await
            .map_err(|err| TransportFailure::Network(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NETWORK_AUTHENTICATION_REQUIRED {
            return Err(TransportFailure::TokenExpired);
        }
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            warn!(
                status = status.as_u16(),
                retry_after = retry_after.as_deref().unwrap_or("-"),
                "entitlement server returned an error status"
            );
            return Err(TransportFailure::HttpStatus {
                code: status.as_u16(),
                retry_after,
            });
        }

        response
            .text()
            .await
            .map_err(|err| TransportFailure::Network(err.to_string()))
    }
}

/// Add a scheme when missing and drop a trailing slash.
fn normalize_server_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    if with_scheme != raw {
        debug!(from = raw, to = %with_scheme, "normalized entitlement server url");
    }
    with_scheme
}

fn query_pairs(app_ids: &[&str], request: &EntitlementRequest) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("vers", request.configuration_version.to_string()),
        ("entitlement_version", request.entitlement_version.clone()),
    ];
    pairs.extend(app_ids.iter().map(|id| ("app", id.to_string())));
    if let Some(token) = &request.auth_token {
        pairs.push(("token", token.clone()));
    }
    if let Some(token) = &request.notification_token {
        pairs.push(("notif_token", token.clone()));
    }
    if let Some(action) = &request.notification_action {
        pairs.push(("notif_action", action.clone()));
    }
    pairs.push(("terminal_vendor", request.device_vendor.clone()));
    pairs.push(("terminal_model", request.device_model.clone()));
    pairs.push(("terminal_sw_version", request.device_sw_version.clone()));
    pairs
}
