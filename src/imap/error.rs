use async_imap::error::Error as AsyncImapError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImapError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("mailbox not found: {0}")]
    MailboxNotFound(String),

    #[error("server said NO: {0}")]
    Operation(String),

    #[error("server said BAD: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("missing data: {0}")]
    MissingData(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<AsyncImapError> for ImapError {
    fn from(err: AsyncImapError) -> Self {
        match err {
            AsyncImapError::Parse(e) => ImapError::Parse(e.to_string()),
            AsyncImapError::No(msg) => ImapError::Operation(msg),
            AsyncImapError::Bad(msg) => ImapError::BadResponse(msg),
            AsyncImapError::Io(e) => ImapError::Connection(e.to_string()),
            AsyncImapError::Validate(e) => ImapError::Command(e.to_string()),
            _ => ImapError::Unknown(err.to_string()),
        }
    }
}

impl From<std::io::Error> for ImapError {
    fn from(err: std::io::Error) -> Self {
        ImapError::Connection(err.to_string())
    }
}
