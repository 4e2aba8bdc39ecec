//! Per-service status records and their activation predicates.
//!
//! The predicates are independent boolean views over the raw codes; several
//! may hold at once and none of them is derived from another.

use crate::status::{AddrStatus, EntitlementStatus, ProvStatus, TcStatus};

/// VoWiFi status: the only service whose activation depends on terms and
/// conditions, emergency address and network provisioning as well as the
/// entitlement itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VowifiStatus {
    pub entitlement: EntitlementStatus,
    pub tc: TcStatus,
    pub addr: AddrStatus,
    pub prov: ProvStatus,
}

impl VowifiStatus {
    /// Service may be used right now.
    pub fn entitled(&self) -> bool {
        self.entitlement == EntitlementStatus::Enabled
            && matches!(
                self.prov,
                ProvStatus::Provisioned | ProvStatus::NotRequired
            )
            && matches!(self.tc, TcStatus::Available | TcStatus::NotRequired)
            && matches!(
                self.addr,
                AddrStatus::Available | AddrStatus::NotRequired
            )
    }

    /// Server lacks the user data (T&C acceptance or emergency address)
    /// needed before the service can be activated.
    pub fn server_data_missing(&self) -> bool {
        self.entitlement == EntitlementStatus::Disabled
            && (self.tc == TcStatus::NotAvailable
                || self.addr == AddrStatus::NotAvailable)
    }

    /// Activation has started server side and has not finished yet.
    pub fn in_progress(&self) -> bool {
        if self.entitlement == EntitlementStatus::Provisioning {
            return true;
        }
        if self.entitlement == EntitlementStatus::Disabled
            && (self.tc == TcStatus::InProgress
                || self.addr == AddrStatus::InProgress)
        {
            return true;
        }
        self.entitlement == EntitlementStatus::Disabled
            && matches!(
                self.prov,
                ProvStatus::NotProvisioned | ProvStatus::InProgress
            )
            && matches!(self.tc, TcStatus::Available | TcStatus::NotRequired)
            && matches!(
                self.addr,
                AddrStatus::Available | AddrStatus::NotRequired
            )
    }

    pub fn incompatible(&self) -> bool {
        self.entitlement == EntitlementStatus::Incompatible
    }
}

/// VoLTE status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolteStatus {
    pub entitlement: EntitlementStatus,
}

impl VolteStatus {
    pub fn entitled(&self) -> bool {
        self.entitlement == EntitlementStatus::Enabled
    }

    pub fn incompatible(&self) -> bool {
        self.entitlement == EntitlementStatus::Incompatible
    }
}

/// SMS-over-IP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmsOverIpStatus {
    pub entitlement: EntitlementStatus,
}

impl SmsOverIpStatus {
    pub fn entitled(&self) -> bool {
        self.entitlement == EntitlementStatus::Enabled
    }

    pub fn incompatible(&self) -> bool {
        self.entitlement == EntitlementStatus::Incompatible
    }
}

/// Raw `NetworkVoiceIRatCapability` value of a 5G voice record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VoiceCapability(pub i32);

impl VoiceCapability {
    /// Attribute absent or unparseable.
    pub const NOT_SET: VoiceCapability = VoiceCapability(-1);

    pub fn from_wire(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<i32>().ok())
            .map(VoiceCapability)
            .unwrap_or(Self::NOT_SET)
    }

    pub fn is_set(&self) -> bool {
        *self != Self::NOT_SET
    }
}

impl Default for VoiceCapability {
    fn default() -> Self {
        Self::NOT_SET
    }
}

/// VoNR status, tracked separately for the home network and roaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VonrStatus {
    pub home_entitlement: EntitlementStatus,
    pub roaming_entitlement: EntitlementStatus,
    pub home_voice_capability: VoiceCapability,
    pub roaming_voice_capability: VoiceCapability,
}

impl VonrStatus {
    pub fn home_entitled(&self) -> bool {
        self.home_entitlement == EntitlementStatus::Enabled
    }

    pub fn roaming_entitled(&self) -> bool {
        self.roaming_entitlement == EntitlementStatus::Enabled
    }

    /// Entitled on at least one of the two network scopes.
    pub fn entitled(&self) -> bool {
        self.home_entitled() || self.roaming_entitled()
    }

    pub fn incompatible(&self) -> bool {
        self.home_entitlement == EntitlementStatus::Incompatible
            && self.roaming_entitlement == EntitlementStatus::Incompatible
    }
}
