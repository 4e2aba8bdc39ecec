use std::fmt::{self, Display};

use crate::services::{SmsOverIpStatus, VolteStatus, VonrStatus, VowifiStatus};

/// Composite outcome of one entitlement query.
///
/// The four service records are derived independently from the same
/// response. When `retry_after_seconds` is set the server asked to be queried
/// again later and the service records hold their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntitlementResult {
    pub vowifi: VowifiStatus,
    pub volte: VolteStatus,
    pub vonr: VonrStatus,
    pub sms_over_ip: SmsOverIpStatus,
    /// Web flow for entering the emergency address.
    pub emergency_address_web_url: Option<String>,
    /// POST body for [`Self::emergency_address_web_url`].
    pub emergency_address_web_data: Option<String>,
    pub terms_and_conditions_web_url: Option<String>,
    /// `None` means no follow-up query was requested.
    pub retry_after_seconds: Option<u64>,
}

impl EntitlementResult {
    /// Result carrying only a "query again later" signal.
    pub fn retry_after(seconds: u64) -> Self {
        Self {
            retry_after_seconds: Some(seconds),
            ..Default::default()
        }
    }

    pub fn wants_retry(&self) -> bool {
        self.retry_after_seconds.is_some()
    }
}

/// Services tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServiceKind {
    Vowifi,
    Volte,
    VonrHome,
    VonrRoaming,
    SmsOverIp,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 5] = [
        ServiceKind::Vowifi,
        ServiceKind::Volte,
        ServiceKind::VonrHome,
        ServiceKind::VonrRoaming,
        ServiceKind::SmsOverIp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Vowifi => "vowifi",
            ServiceKind::Volte => "volte",
            ServiceKind::VonrHome => "vonr_home",
            ServiceKind::VonrRoaming => "vonr_roaming",
            ServiceKind::SmsOverIp => "smsoip",
        }
    }
}

impl Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-service outcome reported to metrics after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServiceOutcome {
    Enabled,
    Disabled,
    Incompatible,
    Provisioning,
    /// Query produced nothing usable.
    Failed,
    /// Decision deferred to a follow-up query.
    Unknown,
    /// Poll superseded by a newer trigger before it finished.
    Canceled,
}

impl Display for ServiceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceOutcome::Enabled => "enabled",
            ServiceOutcome::Disabled => "disabled",
            ServiceOutcome::Incompatible => "incompatible",
            ServiceOutcome::Provisioning => "provisioning",
            ServiceOutcome::Failed => "failed",
            ServiceOutcome::Unknown => "unknown",
            ServiceOutcome::Canceled => "canceled",
        };
        f.write_str(label)
    }
}
