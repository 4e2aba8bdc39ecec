//! Turning an entitlement result into provisioning changes.
//!
//! [`PollingPlan::decide`] is the pure decision; [`PollingService`] runs the
//! query, applies the plan to a [`ProvisioningSink`] and hands follow-ups to a
//! [`FollowUpScheduler`].

mod scheduler;
mod service;

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use ts43_model::{EntitlementResult, ServiceKind, ServiceOutcome, SubscriptionId};

use crate::status::outcome;

pub use scheduler::{FollowUpScheduler, TokioFollowUpScheduler};
pub use service::{PollingComponents, PollingService};

/// IMS features provisioned through entitlement when the carrier requires it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisionedFeature {
    Volte,
    VonrHome,
    VonrRoaming,
    SmsOverIp,
}

impl ProvisionedFeature {
    pub const ALL: [ProvisionedFeature; 4] = [
        ProvisionedFeature::Volte,
        ProvisionedFeature::VonrHome,
        ProvisionedFeature::VonrRoaming,
        ProvisionedFeature::SmsOverIp,
    ];

    pub fn service(&self) -> ServiceKind {
        match self {
            ProvisionedFeature::Volte => ServiceKind::Volte,
            ProvisionedFeature::VonrHome => ServiceKind::VonrHome,
            ProvisionedFeature::VonrRoaming => ServiceKind::VonrRoaming,
            ProvisionedFeature::SmsOverIp => ServiceKind::SmsOverIp,
        }
    }

    fn entitled_in(&self, result: &EntitlementResult) -> bool {
        match self {
            ProvisionedFeature::Volte => result.volte.entitled(),
            ProvisionedFeature::VonrHome => result.vonr.home_entitled(),
            ProvisionedFeature::VonrRoaming => result.vonr.roaming_entitled(),
            ProvisionedFeature::SmsOverIp => result.sms_over_ip.entitled(),
        }
    }
}

impl fmt::Display for ProvisionedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.service().fmt(f)
    }
}

/// Platform side of provisioning.
pub trait ProvisioningSink: Send + Sync + fmt::Debug {
    /// The user's own Wi-Fi calling switch.
    fn is_wfc_enabled_by_user(&self, subscription: SubscriptionId) -> bool;

    /// Turn Wi-Fi calling on or off.
    fn set_wfc_enabled(&self, subscription: SubscriptionId, enabled: bool);

    fn set_provisioned(
        &self,
        subscription: SubscriptionId,
        feature: ProvisionedFeature,
        provisioned: bool,
    );
}

/// Sink that only logs what it is asked to do. Reports Wi-Fi calling as
/// switched on by the user.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingProvisioningSink;

impl ProvisioningSink for LoggingProvisioningSink {
    fn is_wfc_enabled_by_user(&self, _subscription: SubscriptionId) -> bool {
        true
    }

    fn set_wfc_enabled(&self, subscription: SubscriptionId, enabled: bool) {
        info!(subscription = %subscription, enabled, "wifi calling provisioning");
    }

    fn set_provisioned(
        &self,
        subscription: SubscriptionId,
        feature: ProvisionedFeature,
        provisioned: bool,
    ) {
        info!(
            subscription = %subscription,
            feature = %feature,
            provisioned,
            "ims feature provisioning"
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningAction {
    SetWfcEnabled(bool),
    SetProvisioned(ProvisionedFeature, bool),
}

impl ProvisioningAction {
    pub fn apply(&self, sink: &dyn ProvisioningSink, subscription: SubscriptionId) {
        match *self {
            ProvisioningAction::SetWfcEnabled(enabled) => {
                sink.set_wfc_enabled(subscription, enabled)
            }
            ProvisioningAction::SetProvisioned(feature, provisioned) => {
                sink.set_provisioned(subscription, feature, provisioned)
            }
        }
    }
}

/// Lifecycle of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollingState {
    New,
    Querying,
    /// Handed off to the follow-up scheduler.
    RetryScheduled,
    Completed,
    Failed,
}

impl PollingState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollingState::RetryScheduled | PollingState::Completed | PollingState::Failed
        )
    }
}

impl fmt::Display for PollingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PollingState::New => "new",
            PollingState::Querying => "querying",
            PollingState::RetryScheduled => "retry_scheduled",
            PollingState::Completed => "completed",
            PollingState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Settings a poll is decided under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanContext {
    /// Carrier provisions VoLTE, VoNR and SMSoIP through entitlement.
    pub ims_provisioning: bool,
    /// VoWiFi is neither decided nor reported while the user has Wi-Fi
    /// calling off.
    pub wfc_enabled_by_user: bool,
}

impl PlanContext {
    /// Whether a poll has anything to decide at all.
    pub fn needs_query(&self) -> bool {
        self.ims_provisioning || self.wfc_enabled_by_user
    }

    /// Services a poll under this context reports outcomes for.
    pub fn services(&self) -> Vec<ServiceKind> {
        let mut services = Vec::with_capacity(1 + ProvisionedFeature::ALL.len());
        if self.wfc_enabled_by_user {
            services.push(ServiceKind::Vowifi);
        }
        if self.ims_provisioning {
            services.extend(ProvisionedFeature::ALL.iter().map(|f| f.service()));
        }
        services
    }
}

/// Everything one poll decided to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingPlan {
    pub actions: Vec<ProvisioningAction>,
    pub follow_up: Option<Duration>,
    pub outcomes: Vec<(ServiceKind, ServiceOutcome)>,
    pub final_state: PollingState,
}

impl PollingPlan {
    /// Plan for a poll that had nothing to decide and sent no query.
    pub fn skipped() -> Self {
        Self {
            actions: Vec::new(),
            follow_up: None,
            outcomes: Vec::new(),
            final_state: PollingState::Completed,
        }
    }

    /// Decide provisioning changes for a query result.
    ///
    /// With no result at all the IMS features are provisioned on regardless,
    /// while VoWiFi is left as it was.
    pub fn decide(result: Option<&EntitlementResult>, context: PlanContext) -> Self {
        let Some(result) = result else {
            let actions = if context.ims_provisioning {
                ProvisionedFeature::ALL
                    .iter()
                    .map(|feature| ProvisioningAction::SetProvisioned(*feature, true))
                    .collect()
            } else {
                Vec::new()
            };
            return Self {
                actions,
                follow_up: None,
                outcomes: uniform_outcomes(context, ServiceOutcome::Failed),
                final_state: PollingState::Failed,
            };
        };

        if let Some(seconds) = result.retry_after_seconds {
            return Self {
                actions: Vec::new(),
                follow_up: Some(Duration::from_secs(seconds)),
                outcomes: uniform_outcomes(context, ServiceOutcome::Unknown),
                final_state: PollingState::RetryScheduled,
            };
        }

        let mut actions = Vec::new();
        let mut outcomes = Vec::new();

        if context.wfc_enabled_by_user {
            let vowifi = &result.vowifi;
            let disable_wfc =
                vowifi.server_data_missing() || vowifi.in_progress() || vowifi.incompatible();
            actions.push(ProvisioningAction::SetWfcEnabled(!disable_wfc));
            outcomes.push((ServiceKind::Vowifi, outcome(result, ServiceKind::Vowifi)));
        }

        if context.ims_provisioning {
            for feature in ProvisionedFeature::ALL {
                actions.push(ProvisioningAction::SetProvisioned(
                    feature,
                    feature.entitled_in(result),
                ));
                outcomes.push((feature.service(), outcome(result, feature.service())));
            }
        }

        Self {
            actions,
            follow_up: None,
            outcomes,
            final_state: PollingState::Completed,
        }
    }

    /// Outcomes reported for a poll cancelled before it finished.
    pub fn canceled_outcomes(context: PlanContext) -> Vec<(ServiceKind, ServiceOutcome)> {
        uniform_outcomes(context, ServiceOutcome::Canceled)
    }
}

fn uniform_outcomes(
    context: PlanContext,
    outcome: ServiceOutcome,
) -> Vec<(ServiceKind, ServiceOutcome)> {
    context
        .services()
        .into_iter()
        .map(|service| (service, outcome))
        .collect()
}

/// State of one poll invocation, logged on every transition.
#[derive(Debug, Clone)]
pub struct PollingRun {
    subscription: SubscriptionId,
    state: PollingState,
    started: Instant,
    plan: Option<PollingPlan>,
}

impl PollingRun {
    pub fn new(subscription: SubscriptionId) -> Self {
        Self {
            subscription,
            state: PollingState::New,
            started: Instant::now(),
            plan: None,
        }
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    pub fn state(&self) -> PollingState {
        self.state
    }

    pub fn plan(&self) -> Option<&PollingPlan> {
        self.plan.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn transition(&mut self, next: PollingState) {
        debug!(
            subscription = %self.subscription,
            from = %self.state,
            to = %next,
            "polling state transition"
        );
        self.state = next;
    }

    pub(crate) fn finish(&mut self, plan: PollingPlan) {
        self.transition(plan.final_state);
        self.plan = Some(plan);
    }
}

#[cfg(test)]
mod tests;
