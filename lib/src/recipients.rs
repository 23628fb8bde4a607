use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Either `"Any name" <address>` (quoted name with an angle-bracket address)
    // or a bare token. Separators (commas, whitespace) are consumed after each entry.
    static ref MAILBOX_RE: Regex =
        Regex::new(r#"(?:"[^"]*"\s*<([^>]*)>|([^",<>\s]+))[,\s]*"#).unwrap();
}

/// Recipients as handed over by the host mail pipeline.
///
/// Each string may hold several mailboxes, e.g.
///
/// ```text
/// nicolas@cividesk.com, "Nicolas Ganivet" <nicolas@cividesk.com>
/// "Ganivet, Nicolas" <nicolas@cividesk.com>
/// ""<nicolas@cividesk.com>,<nicolas@cividesk.com>
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    Single(String),
    Many(Vec<String>),
}

impl Recipients {
    /// Normalize to a list of recipient strings
    pub fn as_slice(&self) -> &[String] {
        match self {
            Recipients::Single(s) => std::slice::from_ref(s),
            Recipients::Many(v) => v.as_slice(),
        }
    }

    /// Extract every recipient email address, in input order.
    ///
    /// Only addresses are kept, display names are thrown away. Duplicates
    /// are passed through as-is. Fragments that do not yield an address are
    /// dropped without error.
    pub fn addresses(&self) -> Vec<String> {
        self.as_slice()
            .iter()
            .flat_map(|s| parse_recipient_string(s))
            .collect()
    }
}

impl From<&str> for Recipients {
    fn from(s: &str) -> Self {
        Recipients::Single(s.to_string())
    }
}

impl From<String> for Recipients {
    fn from(s: String) -> Self {
        Recipients::Single(s)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(v: Vec<String>) -> Self {
        Recipients::Many(v)
    }
}

/// Scan a single recipient string for mailbox entries
pub fn parse_recipient_string(recipients: &str) -> Vec<String> {
    let mut result = Vec::new();

    for caps in MAILBOX_RE.captures_iter(recipients) {
        let address = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim())
            .unwrap_or("");

        if address.is_empty() {
            log::debug!(
                "Dropping recipient fragment with no address: {:?}",
                caps.get(0).map(|m| m.as_str()).unwrap_or("")
            );
            continue;
        }

        result.push(address.to_string());
    }

    result
}
