use reqwest::blocking;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::api::{self, Endpoint};
use crate::config::Settings;
use crate::error::Error;
use crate::transmission::TransmissionRequest;

/// Provider response body. Callers only check for acceptance.
pub type Response = serde_json::Value;

/// A single call to the SparkPost API
pub trait Dispatcher {
    fn call(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
        body: Option<&TransmissionRequest>,
    ) -> Result<Response, Error>;
}

/// Blocking SparkPost API client. Makes exactly one attempt per call.
pub struct Client {
    api_key: String,
    base_url: url::Url,
    client: blocking::Client,
}

impl Client {
    pub fn new(api_key: &str, base_url: url::Url, timeout: std::time::Duration) -> Result<Self, Error> {
        let client = blocking::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url,
            client,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        Self::new(&settings.api_key, settings.base_url()?, settings.timeout())
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }
}

impl Dispatcher for Client {
    fn call(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
        body: Option<&TransmissionRequest>,
    ) -> Result<Response, Error> {
        let url = api::build_endpoint_url(&self.base_url, &endpoint)?;

        log::debug!("{} {}", endpoint.method(), url);

        let mut req = self
            .client
            .request(endpoint.method(), url)
            .header(AUTHORIZATION, &self.api_key)
            .query(query);

        if let Some(body) = body {
            req = req.header(CONTENT_TYPE, "application/json").json(body);
        }

        // Map response into an error if applicable
        let resp = api::map_status(req.send()?)?;
        let text = resp.text()?;

        // Accepted by SparkPost at this point, so a non-JSON body is kept as text
        if text.trim().is_empty() {
            Ok(Response::Null)
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => Ok(value),
                Err(_) => Ok(Response::String(text)),
            }
        }
    }
}
