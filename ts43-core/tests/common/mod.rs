#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};
use ts43_core::{
    EntitlementMetrics, EntitlementRequest, EntitlementTransport, ProvisionedFeature,
    ProvisioningSink, TransportFailure,
};
use ts43_model::{ServiceKind, ServiceOutcome, SubscriptionId};

pub const ENTITLED_VOWIFI: &str = r#"<?xml version="1.0"?>
<wap-provisioningdoc version="1.1">
  <characteristic type="VERS">
    <parm name="version" value="1"/>
    <parm name="validity" value="1728000"/>
  </characteristic>
  <characteristic type="TOKEN">
    <parm name="token" value="T"/>
    <parm name="validity" value="3600"/>
  </characteristic>
  <characteristic type="APPLICATION">
    <parm name="AppID" value="ap2004"/>
    <parm name="EntitlementStatus" value="1"/>
    <parm name="TC_Status" value="2"/>
    <parm name="AddrStatus" value="2"/>
    <parm name="ProvStatus" value="2"/>
  </characteristic>
</wap-provisioningdoc>"#;

pub enum Reply {
    Respond(Result<String, TransportFailure>),
    /// Never answers; the caller has to be cancelled.
    Hang,
}

impl Reply {
    pub fn ok(raw: &str) -> Self {
        Reply::Respond(Ok(raw.to_string()))
    }

    pub fn fail(failure: TransportFailure) -> Self {
        Reply::Respond(Err(failure))
    }
}

/// Transport answering from a script, one reply per query.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<EntitlementRequest>>,
    pub entered: Notify,
}

impl std::fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedTransport").finish_non_exhaustive()
    }
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        })
    }

    pub fn requests(&self) -> Vec<EntitlementRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EntitlementTransport for ScriptedTransport {
    async fn query(
        &self,
        _app_ids: &[&str],
        request: &EntitlementRequest,
    ) -> Result<String, TransportFailure> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        self.entered.notify_one();
        match reply {
            Some(Reply::Respond(result)) => result,
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(TransportFailure::Network("script exhausted".into())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    Wfc(SubscriptionId, bool),
    Provisioned(SubscriptionId, ProvisionedFeature, bool),
}

/// Sink forwarding every call to a channel.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
    wfc_by_user: AtomicBool,
}

impl ChannelSink {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            tx,
            wfc_by_user: AtomicBool::new(true),
        };
        (Arc::new(sink), rx)
    }

    pub fn set_wfc_by_user(&self, enabled: bool) {
        self.wfc_by_user.store(enabled, Ordering::SeqCst);
    }
}

impl ProvisioningSink for ChannelSink {
    fn is_wfc_enabled_by_user(&self, _subscription: SubscriptionId) -> bool {
        self.wfc_by_user.load(Ordering::SeqCst)
    }

    fn set_wfc_enabled(&self, subscription: SubscriptionId, enabled: bool) {
        let _ = self.tx.send(SinkEvent::Wfc(subscription, enabled));
    }

    fn set_provisioned(
        &self,
        subscription: SubscriptionId,
        feature: ProvisionedFeature,
        provisioned: bool,
    ) {
        let _ = self
            .tx
            .send(SinkEvent::Provisioned(subscription, feature, provisioned));
    }
}

/// Metrics that keep every recorded outcome.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    records: Mutex<Vec<(SubscriptionId, ServiceKind, ServiceOutcome)>>,
}

impl RecordingMetrics {
    pub fn records(&self) -> Vec<(SubscriptionId, ServiceKind, ServiceOutcome)> {
        self.records.lock().unwrap().clone()
    }
}

impl EntitlementMetrics for RecordingMetrics {
    fn record(
        &self,
        subscription: SubscriptionId,
        service: ServiceKind,
        outcome: ServiceOutcome,
        _elapsed: Duration,
    ) {
        self.records
            .lock()
            .unwrap()
            .push((subscription, service, outcome));
    }
}
