use std::fmt::{self, Display};

/// What the client must do with its cached configuration, derived from the
/// `VERS` characteristic's `version` and `validity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClientBehavior {
    /// Configuration may be reused until `validity` seconds have passed.
    ValidDuringValidity,
    /// Configuration is valid with no expiry.
    ValidWithoutDuration,
    /// Drop everything and reconfigure.
    NeedsToReset,
    /// Drop service data but remember the `-1/-1` version marker.
    NeedsToResetExceptVers,
    /// Drop service data, keep the `-2/-2` marker until the user turns the
    /// service on again.
    NeedsToResetExceptVersUntilSettingOn,
    /// Pair not covered by the table. No recovery action is attached.
    Unknown,
}

impl ClientBehavior {
    /// Version marker written for the "reset except VERS" behaviors.
    pub const RESET_EXCEPT_VERS_MARKER: i32 = -1;
    pub const RESET_EXCEPT_VERS_UNTIL_SETTING_ON_MARKER: i32 = -2;

    pub fn evaluate(version: i32, validity: i64) -> Self {
        match (version, validity) {
            (v, d) if v > 0 && d > 0 => Self::ValidDuringValidity,
            (v, 0) if v > 0 => Self::ValidWithoutDuration,
            (0, 0) => Self::NeedsToReset,
            (-1, -1) => Self::NeedsToResetExceptVers,
            (-2, -2) => Self::NeedsToResetExceptVersUntilSettingOn,
            _ => Self::Unknown,
        }
    }

    /// Behaviors that discard the service data of the cached document.
    pub fn requires_reset(&self) -> bool {
        matches!(
            self,
            Self::NeedsToReset
                | Self::NeedsToResetExceptVers
                | Self::NeedsToResetExceptVersUntilSettingOn
        )
    }

    /// Version/validity marker persisted by a `reset(behavior)`, if any.
    pub fn retained_marker(&self) -> Option<i32> {
        match self {
            Self::NeedsToResetExceptVers => Some(Self::RESET_EXCEPT_VERS_MARKER),
            Self::NeedsToResetExceptVersUntilSettingOn => {
                Some(Self::RESET_EXCEPT_VERS_UNTIL_SETTING_ON_MARKER)
            }
            _ => None,
        }
    }
}

impl Display for ClientBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ValidDuringValidity => "VALID_DURING_VALIDITY",
            Self::ValidWithoutDuration => "VALID_WITHOUT_DURATION",
            Self::NeedsToReset => "NEEDS_TO_RESET",
            Self::NeedsToResetExceptVers => "NEEDS_TO_RESET_EXCEPT_VERS",
            Self::NeedsToResetExceptVersUntilSettingOn => {
                "NEEDS_TO_RESET_EXCEPT_VERS_UNTIL_SETTING_ON"
            }
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_pairs() {
        assert_eq!(
            ClientBehavior::evaluate(1, 1_728_000),
            ClientBehavior::ValidDuringValidity
        );
        assert_eq!(
            ClientBehavior::evaluate(3, 0),
            ClientBehavior::ValidWithoutDuration
        );
        assert_eq!(ClientBehavior::evaluate(0, 0), ClientBehavior::NeedsToReset);
        assert_eq!(
            ClientBehavior::evaluate(-1, -1),
            ClientBehavior::NeedsToResetExceptVers
        );
        assert_eq!(
            ClientBehavior::evaluate(-2, -2),
            ClientBehavior::NeedsToResetExceptVersUntilSettingOn
        );
    }

    #[test]
    fn undocumented_pairs_are_unknown() {
        for (version, validity) in [(0, 5), (-1, 0), (-2, -1), (1, -1), (-3, -3)]
        {
            assert_eq!(
                ClientBehavior::evaluate(version, validity),
                ClientBehavior::Unknown,
                "({version}, {validity})"
            );
        }
    }

    #[test]
    fn any_positive_pair_is_valid_during_validity() {
        assert_eq!(
            ClientBehavior::evaluate(5, 5),
            ClientBehavior::ValidDuringValidity
        );
    }

    #[test]
    fn markers_only_for_except_vers() {
        assert_eq!(ClientBehavior::NeedsToReset.retained_marker(), None);
        assert_eq!(
            ClientBehavior::NeedsToResetExceptVers.retained_marker(),
            Some(-1)
        );
        assert_eq!(
            ClientBehavior::NeedsToResetExceptVersUntilSettingOn
                .retained_marker(),
            Some(-2)
        );
        assert!(!ClientBehavior::Unknown.requires_reset());
    }
}
