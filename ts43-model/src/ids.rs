use std::fmt;

/// Identifier of a subscription (SIM slot subscription id).
///
/// Configuration state, tokens and in-flight polls are all scoped to one of
/// these; distinct ids never share state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SubscriptionId(pub i32);

impl SubscriptionId {
    pub fn new(raw: i32) -> Self {
        SubscriptionId(raw)
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl From<i32> for SubscriptionId {
    fn from(value: i32) -> Self {
        SubscriptionId(value)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
