use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, mpsc};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};
use ts43_model::SubscriptionId;

use super::{
    FollowUpScheduler, PlanContext, PollingPlan, PollingRun, PollingState, ProvisioningSink,
};
use crate::metrics::EntitlementMetrics;
use crate::registry::SubscriptionRegistry;

/// Collaborators a poll needs. Cloned into every spawned poll task.
#[derive(Clone)]
pub struct PollingComponents {
    pub registry: Arc<SubscriptionRegistry>,
    pub sink: Arc<dyn ProvisioningSink>,
    pub scheduler: Arc<dyn FollowUpScheduler>,
    pub metrics: Arc<dyn EntitlementMetrics>,
}

impl fmt::Debug for PollingComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingComponents")
            .field("registry", &self.registry)
            .field("sink", &self.sink)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl PollingComponents {
    /// Carrier flag plus the user's current Wi-Fi calling switch.
    pub fn plan_context(&self, subscription: SubscriptionId) -> PlanContext {
        PlanContext {
            ims_provisioning: self.registry.settings().needs_ims_provisioning,
            wfc_enabled_by_user: self.sink.is_wfc_enabled_by_user(subscription),
        }
    }

    /// Query, decide and apply for one subscription.
    pub async fn poll(&self, subscription: SubscriptionId) -> PollingRun {
        let mut run = PollingRun::new(subscription);
        let context = self.plan_context(subscription);
        if !context.needs_query() {
            info!(
                subscription = %subscription,
                "wifi calling off and no ims provisioning; poll skipped"
            );
            run.finish(PollingPlan::skipped());
            return run;
        }
        run.transition(PollingState::Querying);

        let handle = self.registry.handle(subscription).await;
        let result = handle.check_entitlement_status().await;
        let plan = PollingPlan::decide(result.as_ref(), context);

        for action in &plan.actions {
            action.apply(self.sink.as_ref(), subscription);
        }
        if let Some(delay) = plan.follow_up {
            self.scheduler.schedule(subscription, delay);
        }

        let elapsed = run.elapsed();
        for (service, outcome) in &plan.outcomes {
            self.metrics.record(subscription, *service, *outcome, elapsed);
        }

        run.finish(plan);
        info!(
            subscription = %subscription,
            state = %run.state(),
            elapsed_ms = elapsed.as_millis() as u64,
            "entitlement poll finished"
        );
        run
    }
}

/// Single-flight poller: a new trigger for a subscription aborts the poll
/// already running for it.
pub struct PollingService {
    components: PollingComponents,
    in_flight: Mutex<HashMap<SubscriptionId, InFlightPoll>>,
}

#[derive(Debug)]
struct InFlightPoll {
    abort: AbortHandle,
    started: Instant,
}

impl fmt::Debug for PollingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingService")
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}

impl PollingService {
    pub fn new(components: PollingComponents) -> Arc<Self> {
        Arc::new(Self {
            components,
            in_flight: Mutex::new(HashMap::new()),
        })
    }

    pub fn components(&self) -> &PollingComponents {
        &self.components
    }

    /// Start a poll, cancelling any poll still running for `subscription`.
    ///
    /// The returned handle resolves to the finished run, or to a cancelled
    /// join error when a later trigger superseded it.
    pub async fn trigger(&self, subscription: SubscriptionId) -> JoinHandle<PollingRun> {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(previous) = in_flight.remove(&subscription)
            && !previous.abort.is_finished()
        {
            previous.abort.abort();
            self.record_canceled(subscription, previous.started);
            debug!(subscription = %subscription, "superseded in-flight poll");
        }

        let components = self.components.clone();
        let task = tokio::spawn(async move { components.poll(subscription).await });
        in_flight.insert(
            subscription,
            InFlightPoll {
                abort: task.abort_handle(),
                started: Instant::now(),
            },
        );
        task
    }

    fn record_canceled(&self, subscription: SubscriptionId, started: Instant) {
        let elapsed = started.elapsed();
        let context = self.components.plan_context(subscription);
        for (service, outcome) in PollingPlan::canceled_outcomes(context) {
            self.components
                .metrics
                .record(subscription, service, outcome, elapsed);
        }
    }

    /// Polls that have not finished yet.
    pub async fn in_flight(&self) -> usize {
        self.in_flight
            .lock()
            .await
            .values()
            .filter(|poll| !poll.abort.is_finished())
            .count()
    }

    /// Feed scheduler follow-ups back into [`Self::trigger`] until the
    /// channel closes.
    pub fn spawn_follow_up_loop(
        self: &Arc<Self>,
        mut due_rx: mpsc::Receiver<SubscriptionId>,
    ) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(subscription) = due_rx.recv().await {
                debug!(subscription = %subscription, "follow-up due");
                // Detached: completion is observed through the sink and metrics.
                drop(service.trigger(subscription).await);
            }
            debug!("follow-up channel closed");
        })
    }
}
