use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::hash::HashType;

const DEFAULT_URL: &str = "https://rp-api.smart-id.com/v2";
const DEFAULT_TEXT: &str = "Log in";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Assurance level of the certificate the user must authenticate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CertificateLevel {
    Advanced,
    #[default]
    Qualified,
    Qscd,
}

impl FromStr for CertificateLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADVANCED" => Ok(Self::Advanced),
            "QUALIFIED" => Ok(Self::Qualified),
            "QSCD" => Ok(Self::Qscd),
            other => Err(format!("unknown certificate level {other}")),
        }
    }
}

/// Interaction the user's app shows before asking for the PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionType {
    #[default]
    #[serde(rename = "displayTextAndPIN")]
    DisplayTextAndPin,
    VerificationCodeChoice,
    ConfirmationMessage,
    ConfirmationMessageAndVerificationCodeChoice,
}

impl InteractionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DisplayTextAndPin => "displayTextAndPIN",
            Self::VerificationCodeChoice => "verificationCodeChoice",
            Self::ConfirmationMessage => "confirmationMessage",
            Self::ConfirmationMessageAndVerificationCodeChoice => {
                "confirmationMessageAndVerificationCodeChoice"
            }
        }
    }

    /// Confirmation messages allow up to 200 characters, the other interactions 60.
    #[must_use]
    pub fn max_text_len(self) -> usize {
        match self {
            Self::ConfirmationMessage | Self::ConfirmationMessageAndVerificationCodeChoice => 200,
            Self::DisplayTextAndPin | Self::VerificationCodeChoice => 60,
        }
    }
}

impl FromStr for InteractionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "displayTextAndPIN" => Ok(Self::DisplayTextAndPin),
            "verificationCodeChoice" => Ok(Self::VerificationCodeChoice),
            "confirmationMessage" => Ok(Self::ConfirmationMessage),
            "confirmationMessageAndVerificationCodeChoice" => {
                Ok(Self::ConfirmationMessageAndVerificationCodeChoice)
            }
            other => Err(format!("unknown interaction type {other}")),
        }
    }
}

/// Relying-party configuration passed to the transport on every call.
///
/// Required fields are constructor parameters; everything else has a default
/// and a `with_*` override.
///
/// ```rust,ignore
/// use smartid::Config;
///
/// let config = Config::new("DEMO", "00000000-0000-0000-0000-000000000000")
///     .with_url("https://sid.demo.sk.ee/smart-id-rp/v2".parse()?)
///     .with_text("Log in to self-service");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    pub(crate) relying_party_name: String,
    pub(crate) relying_party_uuid: String,
    pub(crate) url: Url,
    pub(crate) certificate_level: CertificateLevel,
    pub(crate) hash_type: HashType,
    pub(crate) interaction_type: InteractionType,
    pub(crate) text: String,
    pub(crate) timeout: Duration,
}

impl Config {
    #[must_use]
    pub fn new(relying_party_name: impl Into<String>, relying_party_uuid: impl Into<String>) -> Self {
        Self {
            relying_party_name: relying_party_name.into(),
            relying_party_uuid: relying_party_uuid.into(),
            url: DEFAULT_URL.parse().expect("valid default URL"),
            certificate_level: CertificateLevel::default(),
            hash_type: HashType::default(),
            interaction_type: InteractionType::default(),
            text: DEFAULT_TEXT.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `SMARTID_RELYING_PARTY_NAME`
    /// - `SMARTID_RELYING_PARTY_UUID`
    ///
    /// # Optional env vars
    /// - `SMARTID_URL`: provider base URL
    /// - `SMARTID_CERTIFICATE_LEVEL`: `ADVANCED`, `QUALIFIED` or `QSCD`
    /// - `SMARTID_HASH_TYPE`: `SHA256`, `SHA384` or `SHA512`
    /// - `SMARTID_INTERACTION_TYPE`: e.g. `displayTextAndPIN`
    /// - `SMARTID_TEXT`: text shown in the user's app
    /// - `SMARTID_TIMEOUT_SECS`: session status long-poll timeout
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let name = var("SMARTID_RELYING_PARTY_NAME")
            .ok_or_else(|| Error::Config("SMARTID_RELYING_PARTY_NAME is required".into()))?;
        let uuid = var("SMARTID_RELYING_PARTY_UUID")
            .ok_or_else(|| Error::Config("SMARTID_RELYING_PARTY_UUID is required".into()))?;

        let mut config = Self::new(name, uuid);

        if let Some(url) = var("SMARTID_URL") {
            let url: Url = url
                .parse()
                .map_err(|e| Error::Config(format!("SMARTID_URL: {e}")))?;
            config = config.with_url(url);
        }
        if let Some(level) = var("SMARTID_CERTIFICATE_LEVEL") {
            let level = level
                .parse()
                .map_err(|e| Error::Config(format!("SMARTID_CERTIFICATE_LEVEL: {e}")))?;
            config = config.with_certificate_level(level);
        }
        if let Some(hash_type) = var("SMARTID_HASH_TYPE") {
            let hash_type = hash_type
                .parse()
                .map_err(|e| Error::Config(format!("SMARTID_HASH_TYPE: {e}")))?;
            config = config.with_hash_type(hash_type);
        }
        if let Some(interaction) = var("SMARTID_INTERACTION_TYPE") {
            let interaction = interaction
                .parse()
                .map_err(|e| Error::Config(format!("SMARTID_INTERACTION_TYPE: {e}")))?;
            config = config.with_interaction_type(interaction);
        }
        if let Some(text) = var("SMARTID_TEXT") {
            config = config.with_text(text);
        }
        if let Some(secs) = var("SMARTID_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| Error::Config(format!("SMARTID_TIMEOUT_SECS: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks values that depend on each other.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is longer than the interaction type allows.
    pub fn validate(&self) -> Result<(), Error> {
        let max = self.interaction_type.max_text_len();
        if self.text.chars().count() > max {
            return Err(Error::Config(format!(
                "text exceeds {max} characters for {}",
                self.interaction_type.as_str()
            )));
        }
        Ok(())
    }

    /// Override the provider base URL (default: Smart-ID production).
    #[must_use]
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = url;
        self
    }

    #[must_use]
    pub fn with_certificate_level(mut self, level: CertificateLevel) -> Self {
        self.certificate_level = level;
        self
    }

    #[must_use]
    pub fn with_hash_type(mut self, hash_type: HashType) -> Self {
        self.hash_type = hash_type;
        self
    }

    #[must_use]
    pub fn with_interaction_type(mut self, interaction_type: InteractionType) -> Self {
        self.interaction_type = interaction_type;
        self
    }

    /// Text shown to the user in the app.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn relying_party_name(&self) -> &str {
        &self.relying_party_name
    }

    #[must_use]
    pub fn relying_party_uuid(&self) -> &str {
        &self.relying_party_uuid
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn certificate_level(&self) -> CertificateLevel {
        self.certificate_level
    }

    #[must_use]
    pub fn hash_type(&self) -> HashType {
        self.hash_type
    }

    #[must_use]
    pub fn interaction_type(&self) -> InteractionType {
        self.interaction_type
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
