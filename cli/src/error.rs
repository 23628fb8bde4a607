// sysexits(3) codes understood by the host mail queue
pub const DATAERR: i32 = 65;
pub const UNAVAILABLE: i32 = 69;
pub const TEMPFAIL: i32 = 75;
pub const CONFIG: i32 = 78;

#[derive(Debug)]
pub enum Error {
    /// Send request on stdin could not be read or parsed
    Input(String),
    Mailer(sparkpost_mailer::Error),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::Input(ref msg) => write!(f, "Invalid send request: {}", msg),
            Error::Mailer(ref err) => write!(f, "{}", err),
        }
    }
}

impl Error {
    /// Exit status for the host. Temporary failures tell the host queue to
    /// retry the message later.
    pub fn exit_code(&self) -> i32 {
        use sparkpost_mailer::Error as MailerError;

        match self {
            Error::Input(_) => DATAERR,
            Error::Mailer(MailerError::InvalidHeaders(_)) => DATAERR,
            Error::Mailer(MailerError::Config(_)) => CONFIG,
            Error::Mailer(MailerError::Dispatch { status, .. }) => match status {
                None => TEMPFAIL,
                Some(429) => TEMPFAIL,
                Some(s) if *s >= 500 => TEMPFAIL,
                Some(_) => UNAVAILABLE,
            },
            // handle_post_edit swallows suppression failures, so this is never returned
            Error::Mailer(MailerError::SuppressionSync(_)) => TEMPFAIL,
        }
    }
}

impl From<sparkpost_mailer::Error> for Error {
    fn from(err: sparkpost_mailer::Error) -> Self {
        Self::Mailer(err)
    }
}

impl From<serde_json::error::Error> for Error {
    fn from(err: serde_json::error::Error) -> Self {
        Self::Input(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Input(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkpost_mailer::Error as MailerError;

    #[test]
    fn test_exit_codes() {
        let code = |e: MailerError| Error::from(e).exit_code();

        assert_eq!(code(MailerError::dispatch(None, "timed out")), TEMPFAIL);
        assert_eq!(code(MailerError::dispatch(Some(503), "down")), TEMPFAIL);
        assert_eq!(code(MailerError::dispatch(Some(429), "slow down")), TEMPFAIL);
        assert_eq!(code(MailerError::dispatch(Some(400), "bad")), UNAVAILABLE);
        assert_eq!(code(MailerError::InvalidHeaders("x".into())), DATAERR);
        assert_eq!(code(MailerError::Config("x".into())), CONFIG);
        assert_eq!(code(MailerError::SuppressionSync("x".into())), TEMPFAIL);
        assert_eq!(Error::Input("eof".into()).exit_code(), DATAERR);
    }
}
