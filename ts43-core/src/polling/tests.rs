use ts43_model::{AddrStatus, EntitlementStatus, ProvStatus, TcStatus, VowifiStatus};

use super::*;

fn entitled_vowifi() -> VowifiStatus {
    VowifiStatus {
        entitlement: EntitlementStatus::Enabled,
        tc: TcStatus::NotRequired,
        addr: AddrStatus::Available,
        prov: ProvStatus::Provisioned,
    }
}

fn wfc_on(ims_provisioning: bool) -> PlanContext {
    PlanContext {
        ims_provisioning,
        wfc_enabled_by_user: true,
    }
}

fn wfc_off(ims_provisioning: bool) -> PlanContext {
    PlanContext {
        ims_provisioning,
        wfc_enabled_by_user: false,
    }
}

fn wfc_action(plan: &PollingPlan) -> Option<bool> {
    plan.actions.iter().find_map(|action| match action {
        ProvisioningAction::SetWfcEnabled(enabled) => Some(*enabled),
        _ => None,
    })
}

fn provisioned(plan: &PollingPlan, feature: ProvisionedFeature) -> Option<bool> {
    plan.actions.iter().find_map(|action| match action {
        ProvisioningAction::SetProvisioned(f, value) if *f == feature => Some(*value),
        _ => None,
    })
}

#[test]
fn no_result_without_ims_provisioning_changes_nothing() {
    let plan = PollingPlan::decide(None, wfc_on(false));

    assert!(plan.actions.is_empty());
    assert_eq!(plan.follow_up, None);
    assert_eq!(plan.final_state, PollingState::Failed);
    assert_eq!(
        plan.outcomes,
        [(ServiceKind::Vowifi, ServiceOutcome::Failed)]
    );
}

#[test]
fn no_result_with_ims_provisioning_enables_ims_features() {
    let plan = PollingPlan::decide(None, wfc_on(true));

    assert_eq!(wfc_action(&plan), None);
    for feature in ProvisionedFeature::ALL {
        assert_eq!(provisioned(&plan, feature), Some(true), "{feature}");
    }
    assert_eq!(plan.final_state, PollingState::Failed);
}

#[test]
fn retry_after_defers_everything() {
    let result = EntitlementResult::retry_after(90);
    let plan = PollingPlan::decide(Some(&result), wfc_on(true));

    assert!(plan.actions.is_empty());
    assert_eq!(plan.follow_up, Some(Duration::from_secs(90)));
    assert_eq!(plan.final_state, PollingState::RetryScheduled);
    assert!(
        plan.outcomes
            .iter()
            .all(|(_, outcome)| *outcome == ServiceOutcome::Unknown)
    );
}

#[test]
fn retry_after_zero_still_schedules() {
    let result = EntitlementResult::retry_after(0);
    let plan = PollingPlan::decide(Some(&result), wfc_on(false));
    assert_eq!(plan.follow_up, Some(Duration::ZERO));
}

#[test]
fn entitled_vowifi_is_enabled() {
    let result = EntitlementResult {
        vowifi: entitled_vowifi(),
        ..Default::default()
    };
    let plan = PollingPlan::decide(Some(&result), wfc_on(false));

    assert_eq!(plan.actions, [ProvisioningAction::SetWfcEnabled(true)]);
    assert_eq!(
        plan.outcomes,
        [(ServiceKind::Vowifi, ServiceOutcome::Enabled)]
    );
    assert_eq!(plan.final_state, PollingState::Completed);
}

#[test]
fn vowifi_disabled_when_data_missing_in_progress_or_incompatible() {
    let missing = VowifiStatus {
        entitlement: EntitlementStatus::Disabled,
        tc: TcStatus::NotAvailable,
        ..entitled_vowifi()
    };
    let in_progress = VowifiStatus {
        entitlement: EntitlementStatus::Provisioning,
        ..entitled_vowifi()
    };
    let incompatible = VowifiStatus {
        entitlement: EntitlementStatus::Incompatible,
        ..entitled_vowifi()
    };

    for vowifi in [missing, in_progress, incompatible] {
        let result = EntitlementResult {
            vowifi,
            ..Default::default()
        };
        let plan = PollingPlan::decide(Some(&result), wfc_on(false));
        assert_eq!(wfc_action(&plan), Some(false), "{vowifi:?}");
    }
}

#[test]
fn disabled_but_otherwise_ready_vowifi_is_reenabled() {
    let result = EntitlementResult {
        vowifi: VowifiStatus {
            entitlement: EntitlementStatus::Disabled,
            ..entitled_vowifi()
        },
        ..Default::default()
    };
    let plan = PollingPlan::decide(Some(&result), wfc_on(false));
    assert_eq!(wfc_action(&plan), Some(true));
}

#[test]
fn ims_features_follow_their_entitlement() {
    let mut result = EntitlementResult {
        vowifi: entitled_vowifi(),
        ..Default::default()
    };
    result.volte.entitlement = EntitlementStatus::Enabled;
    result.vonr.home_entitlement = EntitlementStatus::Enabled;
    result.vonr.roaming_entitlement = EntitlementStatus::Disabled;
    result.sms_over_ip.entitlement = EntitlementStatus::Incompatible;

    let plan = PollingPlan::decide(Some(&result), wfc_on(true));

    assert_eq!(provisioned(&plan, ProvisionedFeature::Volte), Some(true));
    assert_eq!(provisioned(&plan, ProvisionedFeature::VonrHome), Some(true));
    assert_eq!(provisioned(&plan, ProvisionedFeature::VonrRoaming), Some(false));
    assert_eq!(provisioned(&plan, ProvisionedFeature::SmsOverIp), Some(false));
    assert!(
        plan.outcomes
            .contains(&(ServiceKind::SmsOverIp, ServiceOutcome::Incompatible))
    );
}

#[test]
fn ims_features_ignored_without_carrier_flag() {
    let mut result = EntitlementResult {
        vowifi: entitled_vowifi(),
        ..Default::default()
    };
    result.volte.entitlement = EntitlementStatus::Enabled;

    let plan = PollingPlan::decide(Some(&result), wfc_on(false));
    assert_eq!(provisioned(&plan, ProvisionedFeature::Volte), None);
    assert_eq!(plan.outcomes.len(), 1);
}

#[test]
fn user_switched_off_wfc_is_never_turned_back_on() {
    let result = EntitlementResult {
        vowifi: entitled_vowifi(),
        ..Default::default()
    };

    let plan = PollingPlan::decide(Some(&result), wfc_off(false));
    assert_eq!(wfc_action(&plan), None);
    assert!(plan.outcomes.is_empty());
    assert_eq!(plan.final_state, PollingState::Completed);

    let plan = PollingPlan::decide(Some(&result), wfc_off(true));
    assert_eq!(wfc_action(&plan), None);
    assert_eq!(provisioned(&plan, ProvisionedFeature::Volte), Some(false));
    assert!(
        plan.outcomes
            .iter()
            .all(|(service, _)| *service != ServiceKind::Vowifi)
    );
}

#[test]
fn query_is_needed_only_with_something_to_decide() {
    assert!(wfc_on(false).needs_query());
    assert!(wfc_off(true).needs_query());
    assert!(!wfc_off(false).needs_query());

    let skipped = PollingPlan::skipped();
    assert!(skipped.actions.is_empty());
    assert!(skipped.outcomes.is_empty());
    assert_eq!(skipped.final_state, PollingState::Completed);
}

#[test]
fn canceled_outcomes_cover_the_services_a_poll_would_report() {
    assert_eq!(
        PollingPlan::canceled_outcomes(wfc_on(false)),
        [(ServiceKind::Vowifi, ServiceOutcome::Canceled)]
    );

    let outcomes = PollingPlan::canceled_outcomes(wfc_off(true));
    assert_eq!(outcomes.len(), ProvisionedFeature::ALL.len());
    assert!(
        outcomes
            .iter()
            .all(|(service, outcome)| *service != ServiceKind::Vowifi
                && *outcome == ServiceOutcome::Canceled)
    );
}

#[test]
fn run_records_transitions() {
    let mut run = PollingRun::new(SubscriptionId(2));
    assert_eq!(run.state(), PollingState::New);
    assert!(!run.state().is_terminal());

    run.transition(PollingState::Querying);
    run.finish(PollingPlan::decide(None, wfc_on(false)));

    assert_eq!(run.state(), PollingState::Failed);
    assert!(run.state().is_terminal());
    assert!(run.plan().is_some());
}
