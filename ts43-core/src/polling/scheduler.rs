use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use ts43_model::SubscriptionId;

/// Schedules a follow-up poll for a subscription.
///
/// At most one follow-up is pending per subscription; scheduling again
/// replaces the pending one.
pub trait FollowUpScheduler: Send + Sync + std::fmt::Debug {
    fn schedule(&self, subscription: SubscriptionId, delay: Duration);

    fn cancel(&self, subscription: SubscriptionId);
}

/// Timer task per subscription; due subscriptions are delivered on an mpsc
/// channel.
#[derive(Debug)]
pub struct TokioFollowUpScheduler {
    due_tx: mpsc::Sender<SubscriptionId>,
    pending: Mutex<HashMap<SubscriptionId, JoinHandle<()>>>,
}

impl TokioFollowUpScheduler {
    pub const CHANNEL_CAPACITY: usize = 64;

    pub fn new() -> (Self, mpsc::Receiver<SubscriptionId>) {
        let (due_tx, due_rx) = mpsc::channel(Self::CHANNEL_CAPACITY);
        (
            Self {
                due_tx,
                pending: Mutex::new(HashMap::new()),
            },
            due_rx,
        )
    }

    /// Follow-ups whose timer has not fired yet.
    pub fn pending(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|timer| !timer.is_finished())
            .count()
    }
}

impl FollowUpScheduler for TokioFollowUpScheduler {
    fn schedule(&self, subscription: SubscriptionId, delay: Duration) {
        let due_tx = self.due_tx.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if due_tx.send(subscription).await.is_err() {
                warn!(subscription = %subscription, "follow-up receiver dropped");
            }
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subscription, timer);
        if let Some(previous) = previous {
            previous.abort();
            debug!(subscription = %subscription, "replaced pending follow-up");
        }
        debug!(
            subscription = %subscription,
            delay_secs = delay.as_secs(),
            "follow-up scheduled"
        );
    }

    fn cancel(&self, subscription: SubscriptionId) {
        if let Some(timer) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&subscription)
        {
            timer.abort();
        }
    }
}

impl Drop for TokioFollowUpScheduler {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, timer) in pending.drain() {
            timer.abort();
        }
    }
}
