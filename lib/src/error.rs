use std::error;
use std::fmt;

/// All possible mailer errors
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Headers were not a structured mapping, or carry no usable sender
    InvalidHeaders(String),
    /// Transport failure or non-success response from SparkPost.
    /// `status` is `None` when no response was received (e.g., timeout).
    Dispatch {
        status: Option<u16>,
        message: String,
    },
    /// Removing an address from the suppression list failed
    SuppressionSync(String),
    Config(String),
}

impl Error {
    pub fn dispatch(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Dispatch {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidHeaders(ref msg) => write!(f, "InvalidHeaders: {}", msg),
            Error::Dispatch {
                status: Some(status),
                ref message,
            } => write!(f, "DispatchError ({}): {}", status, message),
            Error::Dispatch {
                status: None,
                ref message,
            } => write!(f, "DispatchError: {}", message),
            Error::SuppressionSync(ref msg) => write!(f, "SuppressionSyncError: {}", msg),
            Error::Config(ref msg) => write!(f, "Config: {}", msg),
        }
    }
}

impl error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());

        if err.is_timeout() {
            Self::dispatch(status, format!("request timed out: {}", err))
        } else {
            Self::dispatch(status, err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid base URL: {}", err))
    }
}

impl From<serde_json::error::Error> for Error {
    fn from(err: serde_json::error::Error) -> Self {
        Self::dispatch(None, format!("invalid JSON: {}", err))
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
