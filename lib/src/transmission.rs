use serde::{Deserialize, Serialize};

use crate::headers::LINE_SEPARATOR;

/// Header used by the CRM to correlate bounces with mailings. SparkPost
/// echoes the metadata back on bounce and webhook events.
pub const BOUNCE_HEADER: &str = "X-CiviMail-Bounce";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackingOptions {
    #[serde(rename = "open-tracking")]
    pub open_tracking: bool,
    #[serde(rename = "click-tracking")]
    pub click_tracking: bool,
}

impl Default for TrackingOptions {
    // Tracking is done by the CRM, never by SparkPost
    fn default() -> Self {
        Self {
            open_tracking: false,
            click_tracking: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: Address,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub email_rfc822: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "X-CiviMail-Bounce")]
    pub bounce: String,
}

/// JSON body for `POST /transmissions`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransmissionRequest {
    pub options: TrackingOptions,
    pub recipients: Vec<Recipient>,
    pub content: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    /// Logical sender, for logging only
    #[serde(skip)]
    pub from: String,
}

/// Assemble a transmission from normalized parts
pub fn build(
    from: &str,
    header_text: &str,
    recipients: &[String],
    body: &str,
    bounce: Option<&str>,
) -> TransmissionRequest {
    let recipients = recipients
        .iter()
        .map(|email| Recipient {
            address: Address {
                email: email.clone(),
            },
        })
        .collect();

    let email_rfc822 = format!("{}{}{}{}", header_text, LINE_SEPARATOR, LINE_SEPARATOR, body);

    let metadata = bounce
        .filter(|b| !b.is_empty())
        .map(|b| Metadata {
            bounce: b.to_string(),
        });

    TransmissionRequest {
        options: TrackingOptions::default(),
        recipients,
        content: Content { email_rfc822 },
        metadata,
        from: from.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipients() -> Vec<String> {
        vec!["a@x.com".to_string(), "b@x.com".to_string()]
    }

    #[test]
    fn test_build_payload_shape() {
        let req = build(
            "info@cividesk.com",
            "From: info@cividesk.com\r\nSubject: Hi",
            &recipients(),
            "Body text",
            None,
        );

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "options": {"open-tracking": false, "click-tracking": false},
                "recipients": [
                    {"address": {"email": "a@x.com"}},
                    {"address": {"email": "b@x.com"}},
                ],
                "content": {
                    "email_rfc822": "From: info@cividesk.com\r\nSubject: Hi\r\n\r\nBody text"
                },
            })
        );
    }

    #[test]
    fn test_body_is_verbatim() {
        let body = "Line one\n\nLine two\r\n=?utf-8?q?x?=\r\n";
        let req = build("a@x.com", "From: a@x.com", &recipients(), body, None);

        assert_eq!(req.content.email_rfc822, format!("From: a@x.com\r\n\r\n{}", body));
    }

    #[test]
    fn test_bounce_metadata() {
        let req = build(
            "a@x.com",
            "From: a@x.com",
            &recipients(),
            "",
            Some("b.22.23.1234abcd@bounces.cividesk.com"),
        );

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value["metadata"],
            json!({"X-CiviMail-Bounce": "b.22.23.1234abcd@bounces.cividesk.com"})
        );
    }

    #[test]
    fn test_empty_bounce_omits_metadata() {
        let req = build("a@x.com", "From: a@x.com", &recipients(), "", Some(""));
        let value = serde_json::to_value(&req).unwrap();

        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_tracking_always_disabled() {
        for bounce in [None, Some("tag")].iter() {
            let req = build("a@x.com", "From: a@x.com", &[], "body", *bounce);
            assert!(!req.options.open_tracking);
            assert!(!req.options.click_tracking);
        }
    }
}
