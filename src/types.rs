use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::identity::Identity;

/// Provider-issued authentication session identifier (opaque string).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl SessionId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Handle to a provider-side authentication attempt.
///
/// Holds nothing the client needs between polls; pass [`Session::id`] back to
/// [`Client::fetch_session`](crate::Client::fetch_session).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Session {
    pub id: SessionId,
    /// Four-digit code shown in the user's app. Display it next to the interaction text.
    pub verification_code: String,
}

impl Session {
    #[must_use]
    pub fn new(id: impl Into<SessionId>, verification_code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            verification_code: verification_code.into(),
        }
    }
}

/// Authenticated person, built from the signing certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Person {
    /// Full semantics identifier, e.g. `PNOEE-38001085718`.
    pub identity_number: String,
    /// National personal code, e.g. `38001085718`.
    pub personal_code: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<Identity> for Person {
    fn from(identity: Identity) -> Self {
        Self {
            identity_number: identity.identity_number,
            personal_code: identity.personal_code,
            first_name: identity.first_name,
            last_name: identity.last_name,
        }
    }
}

/// Validated ETSI natural-person semantics identifier (`PNO` + country + `-` + code).
///
/// Use `"PNOEE-38001085718".parse::<SemanticsIdentifier>()` to create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemanticsIdentifier(String);

impl SemanticsIdentifier {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-letter country code, e.g. `EE`.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.0[3..5]
    }

    /// National identifier after the `-` separator.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0[6..]
    }
}

impl std::fmt::Display for SemanticsIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SemanticsIdentifier {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for SemanticsIdentifier {
    type Error = TransportError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let b = s.as_bytes();
        let valid = b.len() > 6
            && s.starts_with("PNO")
            && b[3..5].iter().all(u8::is_ascii_uppercase)
            && b[5] == b'-'
            && b[6..].iter().all(|c| c.is_ascii_alphanumeric() || *c == b'-');
        if valid {
            Ok(Self(s))
        } else {
            Err(TransportError::InvalidIdentityNumber(s))
        }
    }
}

impl From<SemanticsIdentifier> for String {
    fn from(id: SemanticsIdentifier) -> Self {
        id.0
    }
}
