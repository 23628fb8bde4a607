use reqwest::blocking;
use reqwest::{Method, StatusCode};

use serde::Deserialize;

use crate::error::Error;

pub const SPARKPOST_BASE_API: &str = "https://api.sparkpost.com/api/v1/";
pub const SPARKPOST_BASE_API_EU: &str = "https://api.eu.sparkpost.com/api/v1/";

// Request timeout, in seconds
pub const SPARKPOST_REQUEST_TIMEOUT: u64 = 30;

#[derive(Clone, Debug, PartialEq)]
pub enum Endpoint {
    Transmissions,
    /// Suppression list entry for a single address
    SuppressionList(String),
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::Transmissions => Method::POST,
            Endpoint::SuppressionList(_) => Method::DELETE,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Endpoint::Transmissions => f.write_str("transmissions"),
            Endpoint::SuppressionList(email) => write!(f, "suppression-list/{}", email),
        }
    }
}

/// Build the full URL for an endpoint. `base` must end with a slash.
pub fn build_endpoint_url(base: &url::Url, endpoint: &Endpoint) -> Result<url::Url, Error> {
    match endpoint {
        Endpoint::Transmissions => Ok(base.join("transmissions")?),
        Endpoint::SuppressionList(email) => {
            let mut url = base.join("suppression-list/")?;
            url.path_segments_mut()
                .map_err(|_| Error::Config(format!("cannot be a base URL: {}", base)))?
                .pop_if_empty()
                .push(email);
            Ok(url)
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ApiErrorEntry {
    pub message: String,
    pub description: Option<String>,
    pub code: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ApiErrors {
    pub errors: Vec<ApiErrorEntry>,
}

/// Extract a readable message from a SparkPost error body
pub fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<ApiErrors>(body).ok();

    match parsed.as_ref().and_then(|p| p.errors.first()) {
        Some(ApiErrorEntry {
            message,
            description: Some(description),
            ..
        }) => format!("{}: {}", message, description),
        Some(entry) => entry.message.clone(),
        None if body.trim().is_empty() => "empty response".to_string(),
        None => body.trim().to_string(),
    }
}

/// Map non-success SparkPost responses into a dispatch error
pub fn map_status(resp: blocking::Response) -> Result<blocking::Response, Error> {
    let status = resp.status();

    if status.is_success() {
        return Ok(resp);
    }

    let message = match resp.text() {
        Ok(body) => error_message(&body),
        Err(e) => format!("failed to read error body: {}", e),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            log::error!("SparkPost rejected the API key: {}", message)
        }
        StatusCode::TOO_MANY_REQUESTS => log::warn!("SparkPost rate limited: {}", message),
        _ => (),
    }

    Err(Error::dispatch(Some(status.as_u16()), message))
}
