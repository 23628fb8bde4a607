//! Outbound mail delivery through the SparkPost transmissions API.
//!
//! The host mail pipeline hands over recipients, headers and a body. They are
//! normalized into a SparkPost transmission carrying the full RFC822 message
//! and dispatched with a single blocking HTTP call.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod mailer;
pub mod normalize;
pub mod recipients;
pub mod suppression;
pub mod transmission;

pub use client::{Client, Dispatcher};
pub use error::Error;
pub use headers::{HeaderSet, RawHeaders};
pub use mailer::{Mailer, Outcome, SparkpostMailer};
pub use recipients::Recipients;
