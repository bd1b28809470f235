use std::future::Future;

use serde::Deserialize;

use crate::config::Config;
use crate::error::TransportError;
use crate::status::{EndResult, SessionState};
use crate::types::{Session, SessionId};

/// Network side of the provider API.
///
/// Implementations perform one request per call and keep no per-session state.
/// Dropping a returned future must abort the request.
///
/// # Example
///
/// ```rust,ignore
/// impl Transport for Recorded {
///     async fn create_session(&self, _: &Config, _: &str) -> Result<Session, TransportError> {
///         Ok(Session::new("session-1", "1234"))
///     }
///
///     async fn fetch_session(
///         &self,
///         _: &Config,
///         _: &SessionId,
///     ) -> Result<SessionStateResponse, TransportError> {
///         Ok(SessionStateResponse::running())
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Start an authentication session for `national_identity_number`.
    fn create_session(
        &self,
        config: &Config,
        national_identity_number: &str,
    ) -> impl Future<Output = Result<Session, TransportError>> + Send;

    /// Retrieve the current state of a session.
    fn fetch_session(
        &self,
        config: &Config,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<SessionStateResponse, TransportError>> + Send;
}

/// One decoded session status response.
///
/// `result` and `cert` are only meaningful when `state` is [`SessionState::Complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SessionStateResponse {
    pub state: SessionState,
    pub result: Option<SessionResult>,
    pub cert: Option<SessionCertificate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct SessionResult {
    pub end_result: EndResult,
    #[serde(default)]
    pub document_number: Option<String>,
}

/// Signing certificate returned with a completed session, DER bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SessionCertificate {
    pub value: Vec<u8>,
    pub certificate_level: Option<String>,
}

impl SessionResult {
    #[must_use]
    pub fn new(end_result: impl Into<EndResult>, document_number: Option<String>) -> Self {
        Self {
            end_result: end_result.into(),
            document_number,
        }
    }
}

impl SessionCertificate {
    #[must_use]
    pub fn new(value: Vec<u8>, certificate_level: Option<String>) -> Self {
        Self {
            value,
            certificate_level,
        }
    }
}

impl SessionStateResponse {
    #[must_use]
    pub fn new(
        state: impl Into<SessionState>,
        result: Option<SessionResult>,
        cert: Option<SessionCertificate>,
    ) -> Self {
        Self {
            state: state.into(),
            result,
            cert,
        }
    }

    #[must_use]
    pub fn running() -> Self {
        Self {
            state: SessionState::Running,
            result: None,
            cert: None,
        }
    }

    #[must_use]
    pub fn complete(end_result: impl Into<EndResult>, cert: Option<Vec<u8>>) -> Self {
        Self {
            state: SessionState::Complete,
            result: Some(SessionResult::new(end_result, None)),
            cert: cert.map(|value| SessionCertificate::new(value, None)),
        }
    }

    /// Response with an arbitrary `state` value.
    #[must_use]
    pub fn with_state(state: impl Into<SessionState>) -> Self {
        Self {
            state: state.into(),
            result: None,
            cert: None,
        }
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Serialize};
    use url::Url;

    use super::{SessionCertificate, SessionResult, SessionStateResponse, Transport};
    use crate::config::{CertificateLevel, Config, InteractionType};
    use crate::error::TransportError;
    use crate::hash::{AuthenticationHash, HashType};
    use crate::status::SessionState;
    use crate::types::{SemanticsIdentifier, Session, SessionId};

    /// Slack on top of the long-poll timeout before the HTTP request itself gives up.
    const LONG_POLL_MARGIN: Duration = Duration::from_secs(10);

    const HTTP_NO_SUITABLE_ACCOUNT: u16 = 471;
    const HTTP_MAINTENANCE: u16 = 580;

    /// `reqwest`-backed transport for the Smart-ID relying-party REST API.
    #[derive(Debug, Clone, Default)]
    pub struct HttpTransport {
        http: reqwest::Client,
    }

    impl HttpTransport {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Use a custom HTTP client (for connection pool reuse or testing).
        #[must_use]
        pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
            self.http = client;
            self
        }
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct AuthenticationRequest<'a> {
        #[serde(rename = "relyingPartyUUID")]
        relying_party_uuid: &'a str,
        relying_party_name: &'a str,
        certificate_level: CertificateLevel,
        hash: String,
        hash_type: HashType,
        allowed_interactions_order: Vec<Interaction<'a>>,
    }

    #[derive(Debug, Serialize)]
    pub(super) struct Interaction<'a> {
        #[serde(rename = "type")]
        kind: InteractionType,
        #[serde(rename = "displayText60", skip_serializing_if = "Option::is_none")]
        display_text_60: Option<&'a str>,
        #[serde(rename = "displayText200", skip_serializing_if = "Option::is_none")]
        display_text_200: Option<&'a str>,
    }

    impl<'a> AuthenticationRequest<'a> {
        pub(super) fn new(
            config: &'a Config,
            hash: &AuthenticationHash,
        ) -> Result<Self, TransportError> {
            config
                .validate()
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

            let text = config.text();
            let kind = config.interaction_type();
            let (display_text_60, display_text_200) = if kind.max_text_len() > 60 {
                (None, Some(text))
            } else {
                (Some(text), None)
            };

            Ok(Self {
                relying_party_uuid: config.relying_party_uuid(),
                relying_party_name: config.relying_party_name(),
                certificate_level: config.certificate_level(),
                hash: hash.to_base64(),
                hash_type: hash.hash_type(),
                allowed_interactions_order: vec![Interaction {
                    kind,
                    display_text_60,
                    display_text_200,
                }],
            })
        }
    }

    #[derive(Debug, Deserialize)]
    struct AuthenticationResponse {
        #[serde(rename = "sessionID")]
        session_id: SessionId,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct SessionStatusBody {
        state: SessionState,
        #[serde(default)]
        result: Option<SessionResult>,
        #[serde(default)]
        cert: Option<CertificateBody>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct CertificateBody {
        value: String,
        #[serde(default)]
        certificate_level: Option<String>,
    }

    impl TryFrom<SessionStatusBody> for SessionStateResponse {
        type Error = TransportError;

        fn try_from(body: SessionStatusBody) -> Result<Self, Self::Error> {
            let cert = body
                .cert
                .map(|cert| {
                    STANDARD
                        .decode(cert.value.as_bytes())
                        .map(|value| SessionCertificate {
                            value,
                            certificate_level: cert.certificate_level,
                        })
                        .map_err(|e| TransportError::Decode(format!("cert.value: {e}")))
                })
                .transpose()?;

            Ok(Self {
                state: body.state,
                result: body.result,
                cert,
            })
        }
    }

    /// Maps a non-success HTTP status onto the transport error set.
    pub(super) fn status_error(operation: &'static str, status: u16, detail: String) -> TransportError {
        match status {
            HTTP_NO_SUITABLE_ACCOUNT => TransportError::NoSuitableAccount,
            HTTP_MAINTENANCE => TransportError::Maintenance,
            _ => TransportError::Status {
                operation,
                status,
                detail,
            },
        }
    }

    /// Error body text, or a placeholder naming why it could not be read.
    pub(super) fn body_detail<E: std::fmt::Display>(body: Result<String, E>) -> String {
        body.unwrap_or_else(|e| format!("<unreadable body: {e}>"))
    }

    /// Appends path segments to the configured base URL.
    pub(super) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    impl HttpTransport {
        /// Checks HTTP response status; returns the response on success or an error with details.
        async fn ensure_success(
            response: reqwest::Response,
            operation: &'static str,
        ) -> Result<reqwest::Response, TransportError> {
            if response.status().is_success() {
                return Ok(response);
            }
            let status = response.status().as_u16();
            let detail = body_detail(response.text().await);
            Err(status_error(operation, status, detail))
        }
    }

    impl Transport for HttpTransport {
        async fn create_session(
            &self,
            config: &Config,
            national_identity_number: &str,
        ) -> Result<Session, TransportError> {
            let identifier: SemanticsIdentifier = national_identity_number.parse()?;
            let url = endpoint(config.url(), &["authentication", "etsi", identifier.as_str()])?;

            let hash = AuthenticationHash::generate(config.hash_type());
            let request = AuthenticationRequest::new(config, &hash)?;

            tracing::debug!(country = %identifier.country(), "Creating authentication session");

            let response = self
                .http
                .post(url)
                .json(&request)
                .timeout(config.timeout())
                .send()
                .await?;

            let response = Self::ensure_success(response, "authentication request").await?;
            let body: AuthenticationResponse = response.json().await?;

            Ok(Session::new(body.session_id, hash.verification_code()))
        }

        async fn fetch_session(
            &self,
            config: &Config,
            session_id: &SessionId,
        ) -> Result<SessionStateResponse, TransportError> {
            let mut url = endpoint(config.url(), &["session", session_id.as_str()])?;
            let timeout_ms = u64::try_from(config.timeout().as_millis()).unwrap_or(u64::MAX);
            url.query_pairs_mut()
                .append_pair("timeoutMs", &timeout_ms.to_string());

            let response = self
                .http
                .get(url)
                .timeout(config.timeout() + LONG_POLL_MARGIN)
                .send()
                .await?;

            let response = Self::ensure_success(response, "session status").await?;
            let body: SessionStatusBody = response.json().await?;

            body.try_into()
        }
    }
}
