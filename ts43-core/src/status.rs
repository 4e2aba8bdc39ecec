//! Service status derivation from a parsed response.
//!
//! Each record is read independently; a missing block yields that record's
//! defaults without affecting the others.

use ts43_model::wire::parm;
use ts43_model::{
    AddrStatus, EntitlementResult, EntitlementStatus, ProvStatus, ServiceKind, ServiceOutcome,
    SmsOverIpStatus, TcStatus, VoiceCapability, VolteStatus, VonrStatus, VowifiStatus,
};

use crate::document::{ResponseDocument, Selector};

pub fn derive_vowifi(document: &ResponseDocument) -> VowifiStatus {
    let attr = |name| document.get(Selector::Vowifi, name);
    VowifiStatus {
        entitlement: EntitlementStatus::from_wire(attr(parm::ENTITLEMENT_STATUS)),
        tc: TcStatus::from_wire(attr(parm::TC_STATUS)),
        addr: AddrStatus::from_wire(attr(parm::ADDR_STATUS)),
        prov: ProvStatus::from_wire(attr(parm::PROV_STATUS)),
    }
}

pub fn derive_volte(document: &ResponseDocument) -> VolteStatus {
    VolteStatus {
        entitlement: EntitlementStatus::from_wire(
            document.get(Selector::Volte, parm::ENTITLEMENT_STATUS),
        ),
    }
}

pub fn derive_sms_over_ip(document: &ResponseDocument) -> SmsOverIpStatus {
    SmsOverIpStatus {
        entitlement: EntitlementStatus::from_wire(
            document.get(Selector::SmsOverIp, parm::ENTITLEMENT_STATUS),
        ),
    }
}

pub fn derive_vonr(document: &ResponseDocument) -> VonrStatus {
    let home = |name| document.get(Selector::VonrHome, name);
    let roaming = |name| document.get(Selector::VonrRoaming, name);
    VonrStatus {
        home_entitlement: EntitlementStatus::from_wire(home(parm::ENTITLEMENT_STATUS)),
        roaming_entitlement: EntitlementStatus::from_wire(roaming(parm::ENTITLEMENT_STATUS)),
        home_voice_capability: VoiceCapability::from_wire(home(
            parm::NETWORK_VOICE_IRAT_CAPABILITY,
        )),
        roaming_voice_capability: VoiceCapability::from_wire(roaming(
            parm::NETWORK_VOICE_IRAT_CAPABILITY,
        )),
    }
}

/// Composite result of a successful query.
///
/// The VoWiFi service flow doubles as the emergency address and terms and
/// conditions web flow.
pub fn derive_result(document: &ResponseDocument) -> EntitlementResult {
    let service_flow_url = document
        .get(Selector::Vowifi, parm::SERVICE_FLOW_URL)
        .map(str::to_string);
    let service_flow_data = document
        .get(Selector::Vowifi, parm::SERVICE_FLOW_USERDATA)
        .map(str::to_string);

    EntitlementResult {
        vowifi: derive_vowifi(document),
        volte: derive_volte(document),
        vonr: derive_vonr(document),
        sms_over_ip: derive_sms_over_ip(document),
        emergency_address_web_url: service_flow_url.clone(),
        emergency_address_web_data: service_flow_data,
        terms_and_conditions_web_url: service_flow_url,
        retry_after_seconds: None,
    }
}

/// Metrics outcome of one service in a result.
pub fn outcome(result: &EntitlementResult, service: ServiceKind) -> ServiceOutcome {
    match service {
        ServiceKind::Vowifi => {
            let status = &result.vowifi;
            if status.entitled() {
                ServiceOutcome::Enabled
            } else if status.incompatible() {
                ServiceOutcome::Incompatible
            } else if status.in_progress() {
                ServiceOutcome::Provisioning
            } else {
                ServiceOutcome::Disabled
            }
        }
        ServiceKind::Volte => entitlement_outcome(result.volte.entitlement),
        ServiceKind::VonrHome => entitlement_outcome(result.vonr.home_entitlement),
        ServiceKind::VonrRoaming => entitlement_outcome(result.vonr.roaming_entitlement),
        ServiceKind::SmsOverIp => entitlement_outcome(result.sms_over_ip.entitlement),
    }
}

fn entitlement_outcome(status: EntitlementStatus) -> ServiceOutcome {
    match status {
        EntitlementStatus::Enabled => ServiceOutcome::Enabled,
        EntitlementStatus::Disabled => ServiceOutcome::Disabled,
        EntitlementStatus::Incompatible => ServiceOutcome::Incompatible,
        EntitlementStatus::Provisioning => ServiceOutcome::Provisioning,
    }
}
