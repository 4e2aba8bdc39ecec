use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use ts43_model::wire::{characteristic, element, parm, xml_attr};

use super::{normalize_ampersands, AttributeMap};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("xml error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("document ended with {open} unclosed characteristic(s)")]
    Truncated { open: usize },
}

/// One open `characteristic` element.
#[derive(Debug, Default)]
struct Frame {
    kind: String,
    attrs: AttributeMap,
    has_nested: bool,
}

impl Frame {
    fn key(&self) -> String {
        match self.kind.as_str() {
            characteristic::APPLICATION => self
                .attrs
                .get(parm::APP_ID)
                .cloned()
                .unwrap_or_else(|| self.kind.clone()),
            characteristic::RAT_VOICE_ENTITLE_INFO_DETAILS => {
                let access = self
                    .attrs
                    .get(parm::ACCESS_TYPE)
                    .map(String::as_str)
                    .unwrap_or_default();
                let network = self
                    .attrs
                    .get(parm::HOME_ROAMING_NW_TYPE)
                    .map(String::as_str)
                    .unwrap_or_default();
                format!("{access}{network}")
            }
            _ => self.kind.clone(),
        }
    }
}

pub(super) fn parse_characteristics(
    raw: &str,
) -> Result<HashMap<String, AttributeMap>, ParseError> {
    let normalized = normalize_ampersands(raw);
    let mut reader = Reader::from_str(&normalized);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut out: HashMap<String, AttributeMap> = HashMap::new();

    loop {
        let event = reader.read_event().map_err(|source| ParseError::Xml {
            position: reader.buffer_position() as u64,
            source,
        })?;
        let xml_err = |source: quick_xml::Error| ParseError::Xml {
            position: reader.buffer_position() as u64,
            source,
        };

        match event {
            Event::Start(ref tag) if is(tag, element::CHARACTERISTIC) => {
                if let Some(parent) = stack.last_mut() {
                    parent.has_nested = true;
                }
                stack.push(open_frame(tag).map_err(xml_err)?);
            }
            Event::Empty(ref tag) if is(tag, element::CHARACTERISTIC) => {
                if let Some(parent) = stack.last_mut() {
                    parent.has_nested = true;
                }
                let frame = open_frame(tag).map_err(xml_err)?;
                out.insert(frame.key(), frame.attrs);
            }
            Event::Start(ref tag) | Event::Empty(ref tag)
                if is(tag, element::PARM) =>
            {
                let (name, value) = read_parm(tag).map_err(xml_err)?;
                if let Some(frame) = stack.last_mut()
                    && !name.is_empty()
                    && !value.is_empty()
                {
                    frame.attrs.insert(name, value);
                }
            }
            Event::End(ref tag)
                if tag.local_name().as_ref()
                    == element::CHARACTERISTIC.as_bytes() =>
            {
                if let Some(frame) = stack.pop()
                    && !frame.has_nested
                {
                    out.insert(frame.key(), frame.attrs);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::Truncated { open: stack.len() });
    }

    Ok(out)
}

fn is(tag: &BytesStart<'_>, name: &str) -> bool {
    tag.local_name().as_ref() == name.as_bytes()
}

fn open_frame(tag: &BytesStart<'_>) -> Result<Frame, quick_xml::Error> {
    let kind = attribute(tag, xml_attr::TYPE)?.unwrap_or_default();
    Ok(Frame {
        kind,
        ..Frame::default()
    })
}

fn read_parm(tag: &BytesStart<'_>) -> Result<(String, String), quick_xml::Error> {
    let name = attribute(tag, xml_attr::NAME)?.unwrap_or_default();
    let value = attribute(tag, xml_attr::VALUE)?.unwrap_or_default();
    Ok((name, value))
}

fn attribute(
    tag: &BytesStart<'_>,
    name: &str,
) -> Result<Option<String>, quick_xml::Error> {
    for attr in tag.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
