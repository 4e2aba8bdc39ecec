//! Polling service: single-flight, follow-ups and provisioning side effects.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    ChannelSink, ENTITLED_VOWIFI, RecordingMetrics, Reply, ScriptedTransport, SinkEvent,
};
use ts43_core::{
    EngineDependencies, FixedClock, FollowUpScheduler, InMemoryConfigurationRepository,
    PollingComponents, PollingService, PollingState, ProvisionedFeature, QuerySettings,
    StaticNotificationToken, SubscriptionRegistry, TokioFollowUpScheduler, TracingMetrics,
    TransportFailure,
};
use ts43_model::{ServiceKind, ServiceOutcome, SubscriptionId};

const SUB: SubscriptionId = SubscriptionId(1);

fn components(
    transport: Arc<ScriptedTransport>,
    sink: Arc<ChannelSink>,
    scheduler: Arc<dyn FollowUpScheduler>,
    settings: QuerySettings,
) -> PollingComponents {
    let registry = SubscriptionRegistry::new(EngineDependencies {
        transport,
        notifications: Arc::new(StaticNotificationToken::none()),
        repository: Arc::new(InMemoryConfigurationRepository::new()),
        clock: Arc::new(FixedClock::at(1_700_000_000_000)),
        settings,
    });
    PollingComponents {
        registry: Arc::new(registry),
        sink,
        scheduler,
        metrics: Arc::new(TracingMetrics),
    }
}

fn unavailable_for(seconds: u64) -> Reply {
    Reply::fail(TransportFailure::HttpStatus {
        code: 503,
        retry_after: Some(seconds.to_string()),
    })
}

#[tokio::test]
async fn entitled_poll_enables_wifi_calling() {
    let transport = ScriptedTransport::new([Reply::ok(ENTITLED_VOWIFI)]);
    let (sink, mut events) = ChannelSink::new();
    let (scheduler, _due) = TokioFollowUpScheduler::new();
    let components = components(
        transport,
        sink,
        Arc::new(scheduler),
        QuerySettings::default(),
    );

    let run = components.poll(SUB).await;

    assert_eq!(run.state(), PollingState::Completed);
    assert_eq!(events.recv().await, Some(SinkEvent::Wfc(SUB, true)));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn failed_v8_poll_provisions_ims_features_defensively() {
    let transport =
        ScriptedTransport::new([Reply::fail(TransportFailure::Network("down".into()))]);
    let (sink, mut events) = ChannelSink::new();
    let (scheduler, _due) = TokioFollowUpScheduler::new();
    let settings = QuerySettings {
        needs_ims_provisioning: true,
    };
    let components = components(transport, sink, Arc::new(scheduler), settings);

    let run = components.poll(SUB).await;
    assert_eq!(run.state(), PollingState::Failed);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    let expected: Vec<_> = ProvisionedFeature::ALL
        .iter()
        .map(|feature| SinkEvent::Provisioned(SUB, *feature, true))
        .collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn newer_trigger_aborts_in_flight_poll() {
    let transport = ScriptedTransport::new([Reply::Hang, Reply::ok(ENTITLED_VOWIFI)]);
    let (sink, mut events) = ChannelSink::new();
    let (scheduler, _due) = TokioFollowUpScheduler::new();
    let metrics = Arc::new(RecordingMetrics::default());
    let mut components = components(
        transport.clone(),
        sink,
        Arc::new(scheduler),
        QuerySettings::default(),
    );
    components.metrics = metrics.clone();
    let service = PollingService::new(components);

    let first = service.trigger(SUB).await;
    transport.entered.notified().await;
    assert_eq!(service.in_flight().await, 1);

    let second = service.trigger(SUB).await;

    let superseded = first.await.expect_err("first poll must be cancelled");
    assert!(superseded.is_cancelled());

    let run = second.await.expect("second poll");
    assert_eq!(run.state(), PollingState::Completed);
    assert_eq!(events.recv().await, Some(SinkEvent::Wfc(SUB, true)));
    assert_eq!(transport.requests().len(), 2);
    assert_eq!(
        metrics.records(),
        [
            (SUB, ServiceKind::Vowifi, ServiceOutcome::Canceled),
            (SUB, ServiceKind::Vowifi, ServiceOutcome::Enabled),
        ]
    );
}

#[tokio::test]
async fn wifi_calling_switched_off_by_user_is_left_alone() {
    let transport = ScriptedTransport::new([Reply::ok(ENTITLED_VOWIFI)]);
    let (sink, mut events) = ChannelSink::new();
    sink.set_wfc_by_user(false);
    let (scheduler, _due) = TokioFollowUpScheduler::new();
    let components = components(
        transport.clone(),
        sink,
        Arc::new(scheduler),
        QuerySettings::default(),
    );

    let run = components.poll(SUB).await;

    assert_eq!(run.state(), PollingState::Completed);
    assert!(transport.requests().is_empty(), "nothing to decide, no query");
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn retry_after_schedules_follow_up_poll() {
    let transport = ScriptedTransport::new([unavailable_for(30), Reply::ok(ENTITLED_VOWIFI)]);
    let (sink, mut events) = ChannelSink::new();
    let (scheduler, due) = TokioFollowUpScheduler::new();
    let scheduler = Arc::new(scheduler);
    let service = PollingService::new(components(
        transport.clone(),
        sink,
        scheduler.clone(),
        QuerySettings::default(),
    ));
    let follow_ups = service.spawn_follow_up_loop(due);

    let run = service.trigger(SUB).await.await.expect("first poll");
    assert_eq!(run.state(), PollingState::RetryScheduled);
    assert_eq!(
        run.plan().and_then(|plan| plan.follow_up),
        Some(Duration::from_secs(30))
    );
    assert_eq!(scheduler.pending(), 1);
    assert!(events.try_recv().is_err());

    assert_eq!(events.recv().await, Some(SinkEvent::Wfc(SUB, true)));
    assert_eq!(transport.requests().len(), 2);

    follow_ups.abort();
}
