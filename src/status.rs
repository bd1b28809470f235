//! Provider state and end-result codes, and their mapping onto [`Error`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, TransportError};

/// Session `state` as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionState {
    Running,
    Complete,
    /// Any value outside the documented set, kept verbatim.
    Unrecognized(String),
}

impl SessionState {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "RUNNING",
            Self::Complete => "COMPLETE",
            Self::Unrecognized(s) => s,
        }
    }
}

impl From<String> for SessionState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "RUNNING" => Self::Running,
            "COMPLETE" => Self::Complete,
            _ => Self::Unrecognized(s),
        }
    }
}

impl From<&str> for SessionState {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<SessionState> for String {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Unrecognized(s) => s,
            other => other.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `result.endResult` of a `COMPLETE` session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EndResult {
    Ok,
    UserRefused,
    UserRefusedDisplayTextAndPin,
    UserRefusedVcChoice,
    UserRefusedConfirmationMessage,
    UserRefusedConfirmationMessageWithVcChoice,
    UserRefusedCertChoice,
    WrongVc,
    Timeout,
    Unrecognized(String),
}

impl EndResult {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "OK",
            Self::UserRefused => "USER_REFUSED",
            Self::UserRefusedDisplayTextAndPin => "USER_REFUSED_DISPLAYTEXTANDPIN",
            Self::UserRefusedVcChoice => "USER_REFUSED_VC_CHOICE",
            Self::UserRefusedConfirmationMessage => "USER_REFUSED_CONFIRMATIONMESSAGE",
            Self::UserRefusedConfirmationMessageWithVcChoice => {
                "USER_REFUSED_CONFIRMATIONMESSAGE_WITH_VC_CHOICE"
            }
            Self::UserRefusedCertChoice => "USER_REFUSED_CERT_CHOICE",
            Self::WrongVc => "WRONG_VC",
            Self::Timeout => "TIMEOUT",
            Self::Unrecognized(s) => s,
        }
    }

    /// One of the eight documented failure codes.
    #[must_use]
    pub fn is_known_failure(&self) -> bool {
        !matches!(self, Self::Ok | Self::Unrecognized(_))
    }
}

impl From<String> for EndResult {
    fn from(s: String) -> Self {
        match s.as_str() {
            "OK" => Self::Ok,
            "USER_REFUSED" => Self::UserRefused,
            "USER_REFUSED_DISPLAYTEXTANDPIN" => Self::UserRefusedDisplayTextAndPin,
            "USER_REFUSED_VC_CHOICE" => Self::UserRefusedVcChoice,
            "USER_REFUSED_CONFIRMATIONMESSAGE" => Self::UserRefusedConfirmationMessage,
            "USER_REFUSED_CONFIRMATIONMESSAGE_WITH_VC_CHOICE" => {
                Self::UserRefusedConfirmationMessageWithVcChoice
            }
            "USER_REFUSED_CERT_CHOICE" => Self::UserRefusedCertChoice,
            "WRONG_VC" => Self::WrongVc,
            "TIMEOUT" => Self::Timeout,
            _ => Self::Unrecognized(s),
        }
    }
}

impl From<&str> for EndResult {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<EndResult> for String {
    fn from(result: EndResult) -> Self {
        match result {
            EndResult::Unrecognized(s) => s,
            other => other.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for EndResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translates a transport failure into the taxonomy.
///
/// The three provider conditions the transport recognizes become their taxonomy
/// counterparts. Everything else is returned inside [`Error::Transport`] untouched.
#[must_use]
pub fn map_transport_error(err: TransportError) -> Error {
    match err {
        TransportError::AuthenticationRunning => Error::AuthenticationRunning,
        TransportError::NoSuitableAccount => Error::NoSuitableAccount,
        TransportError::Maintenance => Error::Maintenance,
        other => Error::Transport(other),
    }
}

/// Translates a failing end result into the taxonomy.
///
/// Every refusal variant and `WRONG_VC` are [`Error::UserRefused`], `TIMEOUT` is
/// [`Error::Timeout`], and any other code is carried in [`Error::Failed`].
#[must_use]
pub fn map_end_result(code: &EndResult) -> Error {
    match code {
        EndResult::UserRefused
        | EndResult::UserRefusedDisplayTextAndPin
        | EndResult::UserRefusedVcChoice
        | EndResult::UserRefusedConfirmationMessage
        | EndResult::UserRefusedConfirmationMessageWithVcChoice
        | EndResult::UserRefusedCertChoice
        | EndResult::WrongVc => Error::UserRefused,
        EndResult::Timeout => Error::Timeout,
        other => Error::Failed(other.as_str().to_owned()),
    }
}
