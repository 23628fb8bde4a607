use crate::api::Endpoint;
use crate::client::{Client, Dispatcher, Response};
use crate::config::{MailLog, Settings};
use crate::error::Error;
use crate::headers::HeaderSet;
use crate::normalize::normalize;
use crate::recipients::Recipients;
use crate::transmission;

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// SparkPost accepted the transmission
    Sent(Response),
    /// Mail was written to the log and not sent
    Logged,
}

/// Generic mail sending interface used by the host's outbound pipeline
pub trait Mailer {
    fn send(&self, recipients: &Recipients, headers: HeaderSet, body: &str) -> Result<Outcome, Error>;
}

/// Sends mail through the SparkPost transmissions API
pub struct SparkpostMailer<D: Dispatcher> {
    dispatcher: D,
    mail_log: MailLog,
    backup: Option<Box<dyn Mailer>>,
}

impl SparkpostMailer<Client> {
    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        let client = Client::from_settings(settings)?;
        Ok(Self::new(client).with_mail_log(settings.mail_log))
    }
}

impl<D: Dispatcher> SparkpostMailer<D> {
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher,
            mail_log: MailLog::Off,
            backup: None,
        }
    }

    pub fn with_mail_log(mut self, mail_log: MailLog) -> Self {
        self.mail_log = mail_log;
        self
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Keep a reference to the mailer the host would otherwise have used
    pub fn set_backup_mailer(&mut self, mailer: Box<dyn Mailer>) {
        self.backup = Some(mailer);
    }

    pub fn backup_mailer(&self) -> Option<&dyn Mailer> {
        self.backup.as_deref()
    }

    fn log_mail(&self, recipients: &Recipients, headers: &HeaderSet, body: &str) {
        log::info!(
            "Mail log: recipients={:?}, headers={:?}, body={} bytes",
            recipients.as_slice(),
            headers,
            body.len()
        );
    }
}

impl<D: Dispatcher> Mailer for SparkpostMailer<D> {
    fn send(&self, recipients: &Recipients, headers: HeaderSet, body: &str) -> Result<Outcome, Error> {
        match self.mail_log {
            MailLog::Only => {
                self.log_mail(recipients, &headers, body);
                return Ok(Outcome::Logged);
            }
            MailLog::AndSend => self.log_mail(recipients, &headers, body),
            MailLog::Off => (),
        }

        let normalized = normalize(headers, recipients)?;

        let request = transmission::build(
            &normalized.from,
            &normalized.header_text,
            &normalized.recipients,
            body,
            normalized.bounce.as_deref(),
        );

        match self.dispatcher.call(Endpoint::Transmissions, &[], Some(&request)) {
            Ok(resp) => {
                log::info!(
                    "Transmission from {} to {} recipient(s) accepted",
                    request.from,
                    request.recipients.len()
                );
                Ok(Outcome::Sent(resp))
            }
            Err(e) => {
                log::error!("Transmission from {} failed: {}", request.from, e);
                Err(e)
            }
        }
    }
}
