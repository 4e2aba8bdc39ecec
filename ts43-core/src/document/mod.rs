//! TS.43 response document parsing.
//!
//! Entitlement servers answer with an OMA `wap-provisioningdoc`: nested
//! `characteristic` elements whose leaves carry `parm name/value` pairs. The
//! parser flattens every leaf characteristic into an [`AttributeMap`] keyed by
//! the rules in [`ResponseDocument::parse`], and [`Selector`] hides which key a
//! given service ends up under.

mod parser;
mod selector;

use std::collections::HashMap;

pub use parser::ParseError;
pub use selector::Selector;

/// Attribute name to value mapping of one leaf characteristic.
pub type AttributeMap = HashMap<String, String>;

/// Parsed response, keyed by characteristic key.
///
/// Never fails to construct: malformed input produces an empty document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseDocument {
    characteristics: HashMap<String, AttributeMap>,
}

impl ResponseDocument {
    /// Parse raw response text.
    ///
    /// Keys: `APPLICATION` blocks by their `AppID`, `RATVoiceEntitleInfoDetails`
    /// blocks by `AccessType` + `HomeRoamingNWType`, everything else by its
    /// `type`. A later block with the same key replaces an earlier one.
    pub fn parse(raw: &str) -> Self {
        match parser::parse_characteristics(raw) {
            Ok(characteristics) => Self { characteristics },
            Err(err) => {
                tracing::warn!(error = %err, "discarding malformed entitlement response");
                Self::default()
            }
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.characteristics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.characteristics.len()
    }

    /// Raw access by resolved characteristic key.
    pub fn characteristic(&self, key: &str) -> Option<&AttributeMap> {
        self.characteristics.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.characteristics.keys().map(String::as_str)
    }

    /// Attribute map the selector resolves to, following its fallback chain.
    pub fn resolve(&self, selector: Selector) -> Option<&AttributeMap> {
        selector
            .candidate_keys()
            .iter()
            .find_map(|key| self.characteristics.get(key.as_str()))
    }

    pub fn get(&self, selector: Selector, attribute: &str) -> Option<&str> {
        self.resolve(selector)
            .and_then(|attrs| attrs.get(attribute))
            .map(String::as_str)
    }

    pub fn get_i32(&self, selector: Selector, attribute: &str) -> Option<i32> {
        self.get(selector, attribute)
            .and_then(|value| value.trim().parse().ok())
    }

    pub fn get_i64(&self, selector: Selector, attribute: &str) -> Option<i64> {
        self.get(selector, attribute)
            .and_then(|value| value.trim().parse().ok())
    }
}

/// Escape bare `&` the way non-conforming servers need.
///
/// Every `&` becomes `&amp;`, then the `&amp;amp;` this creates out of an
/// already escaped `&amp;` is folded back, so properly escaped input is left
/// untouched.
pub fn normalize_ampersands(raw: &str) -> String {
    raw.replace('&', "&amp;").replace("&amp;amp;", "&amp;")
}
