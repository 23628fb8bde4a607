use std::time::Duration;

use serde::Deserialize;

use crate::api;
use crate::error::Error;

pub const DEFAULT_PATH: &str = "/etc/sparkpost/sparkpost.toml";
const ENV_PREFIX: &str = "SPARKPOST";

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Us,
    Eu,
}

impl Default for Region {
    fn default() -> Self {
        Region::Us
    }
}

/// Log outgoing mail instead of (or in addition to) sending it
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailLog {
    Off,
    Only,
    AndSend,
}

impl Default for MailLog {
    fn default() -> Self {
        MailLog::Off
    }
}

fn default_timeout() -> u64 {
    api::SPARKPOST_REQUEST_TIMEOUT
}

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub api_key: String,

    #[serde(default)]
    pub region: Region,

    /// Overrides the region's API base URL
    pub base_url: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub mail_log: MailLog,

    /// Name of the mailer the host falls back to. Stored, never used here.
    pub backup_mailer: Option<String>,
}

impl Settings {
    /// Deserialize and validate settings from an already built `config::Config`
    pub fn from_config(settings: config::Config) -> Result<Self, Error> {
        let settings = settings.try_deserialize::<Settings>()?;

        if settings.api_key.trim().is_empty() {
            return Err(Error::Config("api_key must not be empty".to_string()));
        }

        Ok(settings)
    }

    pub fn base_url(&self) -> Result<url::Url, Error> {
        let base = match (&self.base_url, self.region) {
            (Some(url), _) if url.ends_with('/') => url.clone(),
            (Some(url), _) => format!("{}/", url),
            (None, Region::Us) => api::SPARKPOST_BASE_API.to_string(),
            (None, Region::Eu) => api::SPARKPOST_BASE_API_EU.to_string(),
        };

        Ok(url::Url::parse(&base)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Loads settings from the filesystem and merges them with any
/// environment variables prefixed with SPARKPOST_.
///
/// The default file is optional; an explicitly given path must exist.
pub fn load_config(path: Option<&str>) -> Result<Settings, Error> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path.unwrap_or(DEFAULT_PATH)).required(path.is_some()))
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;

    Settings::from_config(settings)
}
