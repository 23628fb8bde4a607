use crate::error::Error;
use crate::headers::HeaderSet;
use crate::recipients::Recipients;
use crate::transmission::BOUNCE_HEADER;

/// Sanitized, transmission-ready view of a send request
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized {
    pub from: String,
    pub header_text: String,
    pub recipients: Vec<String>,
    pub bounce: Option<String>,
}

/// Validate and sanitize headers, then extract every recipient address.
///
/// Header validation runs first: unstructured headers or a missing sender
/// fail before any recipient is looked at.
pub fn normalize(headers: HeaderSet, recipients: &Recipients) -> Result<Normalized, Error> {
    let mut headers = headers.into_fields()?;
    headers.sanitize();

    let (from, header_text) = headers.prepare()?;
    let bounce = headers.get(BOUNCE_HEADER).map(String::from);

    Ok(Normalized {
        from,
        header_text,
        recipients: recipients.addresses(),
        bounce,
    })
}
