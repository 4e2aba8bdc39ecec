//! Enumerated status codes reported by TS.43 servers.
//!
//! Every code travels as a decimal string in the range `0..=3`. Absent,
//! non-numeric and out-of-range values collapse to the per-enum default noted
//! on each type so a malformed response never reads as "enabled".

use std::fmt::{self, Display};

/// `EntitlementStatus` of an application block.
///
/// Defaults to [`EntitlementStatus::Incompatible`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum EntitlementStatus {
    Disabled = 0,
    Enabled = 1,
    #[default]
    Incompatible = 2,
    Provisioning = 3,
}

impl EntitlementStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Disabled),
            1 => Some(Self::Enabled),
            2 => Some(Self::Incompatible),
            3 => Some(Self::Provisioning),
            _ => None,
        }
    }

    pub fn from_wire(raw: Option<&str>) -> Self {
        parse_code(raw).and_then(Self::from_code).unwrap_or_default()
    }

    pub fn as_wire(&self) -> i32 {
        *self as i32
    }
}

/// `TC_Status` (terms and conditions) of the VoWiFi application.
///
/// Defaults to [`TcStatus::NotAvailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum TcStatus {
    #[default]
    NotAvailable = 0,
    Available = 1,
    NotRequired = 2,
    InProgress = 3,
}

impl TcStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::NotAvailable),
            1 => Some(Self::Available),
            2 => Some(Self::NotRequired),
            3 => Some(Self::InProgress),
            _ => None,
        }
    }

    pub fn from_wire(raw: Option<&str>) -> Self {
        parse_code(raw).and_then(Self::from_code).unwrap_or_default()
    }

    pub fn as_wire(&self) -> i32 {
        *self as i32
    }
}

/// `AddrStatus` (emergency address) of the VoWiFi application.
///
/// Defaults to [`AddrStatus::NotAvailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum AddrStatus {
    #[default]
    NotAvailable = 0,
    Available = 1,
    NotRequired = 2,
    InProgress = 3,
}

impl AddrStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::NotAvailable),
            1 => Some(Self::Available),
            2 => Some(Self::NotRequired),
            3 => Some(Self::InProgress),
            _ => None,
        }
    }

    pub fn from_wire(raw: Option<&str>) -> Self {
        parse_code(raw).and_then(Self::from_code).unwrap_or_default()
    }

    pub fn as_wire(&self) -> i32 {
        *self as i32
    }
}

/// `ProvStatus` (network provisioning) of the VoWiFi application.
///
/// Defaults to [`ProvStatus::NotProvisioned`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum ProvStatus {
    #[default]
    NotProvisioned = 0,
    Provisioned = 1,
    NotRequired = 2,
    InProgress = 3,
}

impl ProvStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::NotProvisioned),
            1 => Some(Self::Provisioned),
            2 => Some(Self::NotRequired),
            3 => Some(Self::InProgress),
            _ => None,
        }
    }

    pub fn from_wire(raw: Option<&str>) -> Self {
        parse_code(raw).and_then(Self::from_code).unwrap_or_default()
    }

    pub fn as_wire(&self) -> i32 {
        *self as i32
    }
}

fn parse_code(raw: Option<&str>) -> Option<i32> {
    raw.and_then(|value| value.trim().parse::<i32>().ok())
}

impl Display for EntitlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntitlementStatus::Disabled => write!(f, "disabled"),
            EntitlementStatus::Enabled => write!(f, "enabled"),
            EntitlementStatus::Incompatible => write!(f, "incompatible"),
            EntitlementStatus::Provisioning => write!(f, "provisioning"),
        }
    }
}
