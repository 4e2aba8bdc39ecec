use std::time::Duration;

use ts43_model::{ServiceKind, ServiceOutcome, SubscriptionId};

/// Sink for per-service poll outcomes.
pub trait EntitlementMetrics: Send + Sync + std::fmt::Debug {
    fn record(
        &self,
        subscription: SubscriptionId,
        service: ServiceKind,
        outcome: ServiceOutcome,
        elapsed: Duration,
    );
}

/// Emits each outcome as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetrics;

impl EntitlementMetrics for TracingMetrics {
    fn record(
        &self,
        subscription: SubscriptionId,
        service: ServiceKind,
        outcome: ServiceOutcome,
        elapsed: Duration,
    ) {
        tracing::info!(
            target: "ts43::metrics",
            subscription = %subscription,
            service = %service,
            outcome = %outcome,
            elapsed_ms = elapsed.as_millis() as u64,
            "entitlement outcome"
        );
    }
}
