use ts43_model::wire::{access_type, app_id, characteristic, home_roaming};

/// Logical lookup target inside a [`super::ResponseDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    Token,
    Version,
    Vowifi,
    SmsOverIp,
    /// VoLTE application, or the LTE voice records of a v8 response.
    Volte,
    VonrHome,
    VonrRoaming,
}

impl Selector {
    /// Characteristic keys tried in order; the first one present wins.
    pub fn candidate_keys(&self) -> Vec<String> {
        match self {
            Selector::Token => vec![characteristic::TOKEN.to_string()],
            Selector::Version => vec![characteristic::VERS.to_string()],
            Selector::Vowifi => vec![app_id::VOWIFI.to_string()],
            Selector::SmsOverIp => vec![app_id::SMSOIP.to_string()],
            Selector::Volte => vec![
                app_id::VOLTE.to_string(),
                rat_key(access_type::LTE, home_roaming::ALL),
                rat_key(access_type::LTE, home_roaming::HOME),
            ],
            Selector::VonrHome => vec![
                rat_key(access_type::NR, home_roaming::ALL),
                rat_key(access_type::NR, home_roaming::HOME),
            ],
            Selector::VonrRoaming => vec![
                rat_key(access_type::NR, home_roaming::ALL),
                rat_key(access_type::NR, home_roaming::ROAMING),
            ],
        }
    }
}

/// Key of a `RATVoiceEntitleInfoDetails` block.
pub fn rat_key(access: &str, network: &str) -> String {
    format!("{access}{network}")
}
