use async_trait::async_trait;
use ts43_model::SubscriptionId;

/// How the server should deliver entitlement change notifications, sent as
/// `notif_action` next to the push token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NotificationAction {
    DoNotNotify,
    Gcm,
    #[default]
    EnableFcm,
}

impl NotificationAction {
    pub fn as_wire(&self) -> &'static str {
        match self {
            NotificationAction::DoNotNotify => "0",
            NotificationAction::Gcm => "1",
            NotificationAction::EnableFcm => "2",
        }
    }
}

/// Supplies the opaque push token the server uses to notify the device of
/// entitlement changes. Fetched before every query.
#[async_trait]
pub trait NotificationTokenSource: Send + Sync + std::fmt::Debug {
    async fn notification_token(&self, subscription: SubscriptionId) -> Option<String>;

    /// Only sent when a token is.
    fn notification_action(&self) -> NotificationAction {
        NotificationAction::default()
    }
}

/// Same token for every subscription, or none.
#[derive(Debug, Clone, Default)]
pub struct StaticNotificationToken {
    token: Option<String>,
    action: NotificationAction,
}

impl StaticNotificationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            action: NotificationAction::default(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = action;
        self
    }
}

#[async_trait]
impl NotificationTokenSource for StaticNotificationToken {
    async fn notification_token(&self, _subscription: SubscriptionId) -> Option<String> {
        self.token.clone()
    }

    fn notification_action(&self) -> NotificationAction {
        self.action
    }
}
