use std::fmt;

use lazy_static::lazy_static;
use mailparse::MailAddr;
use regex::Regex;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Error;

pub const FROM_HEADER: &str = "From";
pub const BCC_HEADER: &str = "Bcc";

/// Header line separator used in the RFC822 content
pub const LINE_SEPARATOR: &str = "\r\n";

lazy_static! {
    // A line break (or one of its textual encodings) directly followed by
    // a non-whitespace character starts an injected header line.
    static ref INJECTION_RE: Regex =
        Regex::new(r"(?i)(<CR>|<LF>|0x0A/%0A|0x0D/%0D|\n|\r)\S.*").unwrap();
}

/// Ordered header mapping. Names are compared case-insensitively.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawHeaders {
    entries: Vec<(String, String)>,
}

impl RawHeaders {
    pub fn new() -> Self {
        Default::default()
    }

    /// Insert a header. An existing header with the same name keeps its
    /// position and gets the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].1.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Scrub header injection attempts from every value and drop headers
    /// that must not travel inside the RFC822 content.
    pub fn sanitize(&mut self) {
        for (_, value) in self.entries.iter_mut() {
            if INJECTION_RE.is_match(value.as_str()) {
                let cleaned = INJECTION_RE.replace_all(value.as_str(), "").trim_end().to_string();
                *value = cleaned;
            }
        }

        self.remove(BCC_HEADER);
    }

    /// Extract the sender address and serialize the headers to text.
    ///
    /// Returns `(from, text)`, where `text` is every header as `Name: value`
    /// joined by CRLF, with no trailing line break.
    pub fn prepare(&self) -> Result<(String, String), Error> {
        let from = self
            .get(FROM_HEADER)
            .ok_or_else(|| Error::InvalidHeaders("No From: address has been provided".to_string()))?;

        let from = parse_sender(from)?;

        let text = self
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(LINE_SEPARATOR);

        Ok((from, text))
    }
}

/// Pull the first mailbox address out of a From value
fn parse_sender(value: &str) -> Result<String, Error> {
    let addrs = mailparse::addrparse(value)
        .map_err(|e| Error::InvalidHeaders(format!("Invalid From address: {}", e)))?;

    let addr = addrs.iter().find_map(|a| match a {
        MailAddr::Single(info) => Some(info.addr.clone()),
        MailAddr::Group(group) => group.addrs.first().map(|info| info.addr.clone()),
    });

    match addr {
        Some(a) if !a.trim().is_empty() => Ok(a.trim().to_string()),
        _ => Err(Error::InvalidHeaders(format!(
            "No mailbox found in From: {}",
            value
        ))),
    }
}

impl Serialize for RawHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in self.entries.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct RawHeadersVisitor;

impl<'de> Visitor<'de> for RawHeadersVisitor {
    type Value = RawHeaders;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of header names to string values")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut headers = RawHeaders::new();
        while let Some((k, v)) = access.next_entry::<String, String>()? {
            headers.insert(k, v);
        }
        Ok(headers)
    }
}

impl<'de> Deserialize<'de> for RawHeaders {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawHeadersVisitor)
    }
}

/// Headers as received from the host. Only a structured mapping can be sent.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum HeaderSet {
    Fields(RawHeaders),
    Unstructured(String),
}

impl HeaderSet {
    pub fn into_fields(self) -> Result<RawHeaders, Error> {
        match self {
            HeaderSet::Fields(h) => Ok(h),
            HeaderSet::Unstructured(_) => Err(Error::InvalidHeaders(
                "headers must be a mapping".to_string(),
            )),
        }
    }
}

impl From<RawHeaders> for HeaderSet {
    fn from(h: RawHeaders) -> Self {
        HeaderSet::Fields(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawHeaders {
        RawHeaders::new()
            .with("From", "\"CiviDesk\" <info@cividesk.com>")
            .with("To", "nicolas@cividesk.com")
            .with("Subject", "Hello")
    }

    #[test]
    fn test_insert_is_case_insensitive_and_keeps_position() {
        let mut h = sample();
        h.insert("subject", "Replaced");

        assert_eq!(h.len(), 3);
        assert_eq!(h.get("SUBJECT"), Some("Replaced"));
        assert_eq!(h.iter().nth(2), Some(("Subject", "Replaced")));
    }

    #[test]
    fn test_prepare_extracts_sender_and_serializes() {
        let (from, text) = sample().prepare().unwrap();

        assert_eq!(from, "info@cividesk.com");
        assert_eq!(
            text,
            "From: \"CiviDesk\" <info@cividesk.com>\r\nTo: nicolas@cividesk.com\r\nSubject: Hello"
        );
    }

    #[test]
    fn test_prepare_bare_sender() {
        let h = RawHeaders::new().with("From", "info@cividesk.com");
        let (from, _) = h.prepare().unwrap();
        assert_eq!(from, "info@cividesk.com");
    }

    #[test]
    fn test_prepare_requires_from() {
        let h = RawHeaders::new().with("Subject", "Hello");
        match h.prepare() {
            Err(Error::InvalidHeaders(_)) => (),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_sanitize_strips_injected_lines() {
        let mut h = sample().with("X-Note", "fine\r\nBcc: victim@example.com");
        h.sanitize();
        assert_eq!(h.get("X-Note"), Some("fine"));

        let mut h = sample().with("X-Note", "encoded%0A0x0A/%0ABcc: victim@example.com");
        h.sanitize();
        assert_eq!(h.get("X-Note"), Some("encoded%0A"));
    }

    #[test]
    fn test_sanitize_keeps_folded_lines() {
        let mut h = sample().with("X-Long", "part one\r\n  part two");
        h.sanitize();
        assert_eq!(h.get("X-Long"), Some("part one\r\n  part two"));
    }

    #[test]
    fn test_sanitize_drops_bcc() {
        let mut h = sample().with("BCC", "hidden@cividesk.com");
        h.sanitize();
        assert_eq!(h.get("Bcc"), None);
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn test_deserialize_preserves_order() {
        let set: HeaderSet =
            serde_json::from_str(r#"{"Subject": "Hi", "From": "a@x.com", "To": "b@x.com"}"#)
                .unwrap();
        let h = set.into_fields().unwrap();
        let names: Vec<&str> = h.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["Subject", "From", "To"]);
    }

    #[test]
    fn test_unstructured_headers_rejected() {
        let set: HeaderSet = serde_json::from_str(r#""From: a@x.com""#).unwrap();
        match set.into_fields() {
            Err(Error::InvalidHeaders(_)) => (),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
