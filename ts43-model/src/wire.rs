//! Fixed vocabulary of the TS.43 `wap-provisioningdoc` profile.
//!
//! These strings appear verbatim on the wire; changing any of them breaks
//! interoperability with entitlement servers.

/// XML element names.
pub mod element {
    pub const CHARACTERISTIC: &str = "characteristic";
    pub const PARM: &str = "parm";
}

/// Attributes on `characteristic` and `parm` elements.
pub mod xml_attr {
    pub const TYPE: &str = "type";
    pub const NAME: &str = "name";
    pub const VALUE: &str = "value";
}

/// Characteristic `type` values with special keying rules.
pub mod characteristic {
    pub const VERS: &str = "VERS";
    pub const TOKEN: &str = "TOKEN";
    pub const APPLICATION: &str = "APPLICATION";
    pub const RAT_VOICE_ENTITLE_INFO_DETAILS: &str =
        "RATVoiceEntitleInfoDetails";
}

/// `parm` names read by the engine.
pub mod parm {
    pub const TOKEN: &str = "token";
    pub const APP_ID: &str = "AppID";
    pub const ENTITLEMENT_STATUS: &str = "EntitlementStatus";
    pub const ADDR_STATUS: &str = "AddrStatus";
    pub const TC_STATUS: &str = "TC_Status";
    pub const PROV_STATUS: &str = "ProvStatus";
    pub const SERVICE_FLOW_URL: &str = "ServiceFlow_URL";
    pub const SERVICE_FLOW_USERDATA: &str = "ServiceFlow_UserData";
    pub const VERSION: &str = "version";
    pub const VALIDITY: &str = "validity";
    pub const ACCESS_TYPE: &str = "AccessType";
    pub const HOME_ROAMING_NW_TYPE: &str = "HomeRoamingNWType";
    pub const NETWORK_VOICE_IRAT_CAPABILITY: &str =
        "NetworkVoiceIRatCapability";
}

/// TS.43 application identifiers.
pub mod app_id {
    pub const VOLTE: &str = "ap2003";
    pub const VOWIFI: &str = "ap2004";
    pub const SMSOIP: &str = "ap2005";
}

/// `AccessType` codes of a `RATVoiceEntitleInfoDetails` block.
pub mod access_type {
    pub const LTE: &str = "1";
    pub const NR: &str = "2";
}

/// `HomeRoamingNWType` codes of a `RATVoiceEntitleInfoDetails` block.
pub mod home_roaming {
    pub const ALL: &str = "1";
    pub const HOME: &str = "2";
    pub const ROAMING: &str = "3";
}

/// Entitlement protocol versions sent as `entitlement_version`.
pub mod entitlement_version {
    pub const V2: &str = "2.0";
    pub const V8: &str = "8.0";
}
