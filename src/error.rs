/// Errors returned by [`Client`](crate::Client) operations.
///
/// The first eight variants form the closed taxonomy callers branch on; compare them with
/// [`Error::kind`] rather than by message. The remaining variants carry a collaborator's
/// error verbatim.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The session has not reached a terminal state yet. Poll again.
    #[error("authentication is still running")]
    AuthenticationRunning,

    #[error("no suitable account of requested type found")]
    NoSuitableAccount,

    #[error("system is under maintenance, retry again later")]
    Maintenance,

    /// The user declined the interaction or picked the wrong verification code.
    #[error("user refused")]
    UserRefused,

    #[error("user didn't respond in time")]
    Timeout,

    /// Terminal failure code the provider reported but this crate does not classify.
    #[error("authentication failed: {0}")]
    Failed(String),

    /// Session `state` outside `RUNNING` / `COMPLETE`.
    #[error("unsupported session state: {0}")]
    UnsupportedState(String),

    /// `COMPLETE` session whose end result is neither `OK` nor a known failure code.
    #[error("unsupported session result: {0}")]
    UnsupportedResult(String),

    /// Transport failure that does not match a known provider condition.
    #[error(transparent)]
    Transport(TransportError),

    /// Certificate could not be turned into a person record.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Discriminant of [`Error`], for comparisons that ignore attached detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    AuthenticationRunning,
    NoSuitableAccount,
    Maintenance,
    UserRefused,
    Timeout,
    Failed,
    UnsupportedState,
    UnsupportedResult,
    Transport,
    Identity,
    Config,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationRunning => ErrorKind::AuthenticationRunning,
            Self::NoSuitableAccount => ErrorKind::NoSuitableAccount,
            Self::Maintenance => ErrorKind::Maintenance,
            Self::UserRefused => ErrorKind::UserRefused,
            Self::Timeout => ErrorKind::Timeout,
            Self::Failed(_) => ErrorKind::Failed,
            Self::UnsupportedState(_) => ErrorKind::UnsupportedState,
            Self::UnsupportedResult(_) => ErrorKind::UnsupportedResult,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Identity(_) => ErrorKind::Identity,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// `true` when the caller should poll the session again.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::AuthenticationRunning)
    }
}

/// Errors produced by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("authentication is still running")]
    AuthenticationRunning,

    #[error("no suitable account of requested type found")]
    NoSuitableAccount,

    #[error("system is under maintenance")]
    Maintenance,

    #[error("invalid national identity number: {0}")]
    InvalidIdentityNumber(String),

    /// Non-success HTTP status without a dedicated mapping.
    #[error("{operation} failed with status {status}: {detail}")]
    Status {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    #[error("invalid provider response: {0}")]
    Decode(String),

    #[error("invalid provider URL: {0}")]
    InvalidUrl(String),

    /// Request rejected locally before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Escape hatch for custom transports.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Errors produced by an [`IdentityExtractor`](crate::IdentityExtractor).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum IdentityError {
    #[error("certificate parse error: {0}")]
    Certificate(String),

    #[error("certificate subject is missing {0}")]
    MissingAttribute(&'static str),

    #[error("invalid subject serial number: {0}")]
    InvalidSerialNumber(String),
}
