use crate::config::Config;
use crate::error::Error;
use crate::identity::IdentityExtractor;
use crate::status::{EndResult, SessionState, map_end_result, map_transport_error};
use crate::transport::{SessionStateResponse, Transport};
use crate::types::{Person, Session, SessionId};

/// Smart-ID authentication client.
///
/// Stateless between calls: each method issues a single request and interprets its
/// outcome. Polling until a terminal state is the caller's job.
///
/// ```rust,ignore
/// let client = smartid::Client::new(smartid::Config::from_env()?);
/// let session = client.create_session("PNOEE-30303039914").await?;
/// println!("Verification code: {}", session.verification_code);
///
/// let person = loop {
///     match client.fetch_session(&session.id).await {
///         Err(e) if e.is_running() => tokio::time::sleep(Duration::from_secs(1)).await,
///         other => break other?,
///     }
/// };
/// ```
///
/// Both operations are cancelled by dropping their future, which drops the
/// in-flight transport request with it.
pub struct Client<T, X> {
    config: Config,
    transport: T,
    extractor: X,
}

#[cfg(all(feature = "http", feature = "x509"))]
impl Client<crate::transport::HttpTransport, crate::identity::CertificateExtractor> {
    /// Client using the bundled HTTP transport and X.509 extractor.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_parts(
            config,
            crate::transport::HttpTransport::new(),
            crate::identity::CertificateExtractor,
        )
    }
}

impl<T: Transport, X: IdentityExtractor> Client<T, X> {
    /// Client using custom collaborators.
    #[must_use]
    pub fn with_parts(config: Config, transport: T, extractor: X) -> Self {
        Self {
            config,
            transport,
            extractor,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start an authentication session for `national_identity_number`
    /// (e.g. `PNOEE-30303039914`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configured text is too long for the interaction,
    /// [`Error::AuthenticationRunning`], [`Error::NoSuitableAccount`] or
    /// [`Error::Maintenance`] when the transport reports those conditions, and
    /// [`Error::Transport`] for any other transport failure.
    pub async fn create_session(&self, national_identity_number: &str) -> Result<Session, Error> {
        self.config.validate()?;

        let session = self
            .transport
            .create_session(&self.config, national_identity_number)
            .await
            .map_err(map_transport_error)?;

        tracing::debug!(session_id = %session.id, "Authentication session created");
        Ok(session)
    }

    /// Poll a session once.
    ///
    /// # Errors
    ///
    /// - [`Error::AuthenticationRunning`] while the user has not answered yet; poll again.
    /// - [`Error::UserRefused`], [`Error::Timeout`] or [`Error::Failed`] for failing end results.
    /// - [`Error::UnsupportedState`] / [`Error::UnsupportedResult`] when the provider
    ///   reports something outside the documented protocol.
    /// - [`Error::Identity`] when the certificate cannot be read.
    /// - Transport failures as in [`create_session`](Self::create_session).
    pub async fn fetch_session(&self, session_id: &SessionId) -> Result<Person, Error> {
        let response = self
            .transport
            .fetch_session(&self.config, session_id)
            .await
            .map_err(map_transport_error)?;

        self.resolve(session_id, response)
    }

    fn resolve(
        &self,
        session_id: &SessionId,
        response: SessionStateResponse,
    ) -> Result<Person, Error> {
        match response.state {
            SessionState::Running => Err(Error::AuthenticationRunning),
            SessionState::Complete => {
                // COMPLETE without a result is as unusable as an unknown code
                let end_result = response
                    .result
                    .map_or_else(|| EndResult::Unrecognized(String::new()), |r| r.end_result);

                match end_result {
                    EndResult::Ok => {
                        let cert = response.cert.map(|c| c.value).unwrap_or_default();
                        let identity = self.extractor.extract(&cert)?;
                        tracing::info!(session_id = %session_id, "Smart-ID authentication successful");
                        Ok(Person::from(identity))
                    }
                    code if code.is_known_failure() => {
                        tracing::debug!(
                            session_id = %session_id,
                            end_result = %code,
                            "Authentication failed"
                        );
                        Err(map_end_result(&code))
                    }
                    code => {
                        tracing::warn!(
                            session_id = %session_id,
                            end_result = %code,
                            "Unsupported session result"
                        );
                        Err(Error::UnsupportedResult(code.into()))
                    }
                }
            }
            SessionState::Unrecognized(state) => {
                tracing::warn!(
                    session_id = %session_id,
                    state = %state,
                    "Unsupported session state"
                );
                Err(Error::UnsupportedState(state))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::{ErrorKind, IdentityError, TransportError};
    use crate::identity::Identity;

    type Reply<R> = Box<dyn Fn() -> Result<R, TransportError> + Send + Sync>;

    /// Transport answering every call from a fixed closure.
    struct StubTransport {
        create: Reply<Session>,
        fetch: Reply<SessionStateResponse>,
        fetches: AtomicUsize,
    }

    impl StubTransport {
        fn fetching(
            fetch: impl Fn() -> Result<SessionStateResponse, TransportError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                create: Box::new(|| Ok(Session::new("session-1", "1234"))),
                fetch: Box::new(fetch),
                fetches: AtomicUsize::new(0),
            }
        }

        fn creating(
            create: impl Fn() -> Result<Session, TransportError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                create: Box::new(create),
                fetch: Box::new(|| Ok(SessionStateResponse::running())),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl Transport for StubTransport {
        async fn create_session(&self, _: &Config, _: &str) -> Result<Session, TransportError> {
            (self.create)()
        }

        async fn fetch_session(
            &self,
            _: &Config,
            _: &SessionId,
        ) -> Result<SessionStateResponse, TransportError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            (self.fetch)()
        }
    }

    /// Extractor returning a fixed identity and recording what it was given.
    #[derive(Default)]
    struct StubExtractor {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubExtractor {
        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    impl IdentityExtractor for StubExtractor {
        fn extract(&self, cert: &[u8]) -> Result<Identity, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(IdentityError::MissingAttribute("serialNumber"));
            }
            assert_eq!(cert, CERT);
            Identity::from_subject("PNOEE-30303039914", "QUALIFIED OK1", "TESTNUMBER")
        }
    }

    const CERT: &[u8] = b"der-bytes";

    #[derive(Debug, thiserror::Error)]
    #[error("marker {0}")]
    struct Marker(u32);

    fn stub_client(
        transport: StubTransport,
        extractor: StubExtractor,
    ) -> Client<StubTransport, StubExtractor> {
        Client::with_parts(Config::new("DEMO", "uuid"), transport, extractor)
    }

    fn complete(code: &str) -> StubTransport {
        let code = code.to_owned();
        StubTransport::fetching(move || {
            Ok(SessionStateResponse::complete(code.as_str(), Some(CERT.to_vec())))
        })
    }

    async fn fetch(client: &Client<StubTransport, StubExtractor>) -> Result<Person, Error> {
        client.fetch_session(&SessionId::from("session-1")).await
    }

    #[tokio::test]
    async fn ok_result_returns_person_from_certificate() {
        let client = stub_client(complete("OK"), StubExtractor::default());
        let person = fetch(&client).await.unwrap();

        assert_eq!(person.identity_number, "PNOEE-30303039914");
        assert_eq!(person.personal_code, "30303039914");
        assert_eq!(person.first_name, "QUALIFIED OK1");
        assert_eq!(person.last_name, "TESTNUMBER");
        assert_eq!(client.extractor.calls.load(Ordering::SeqCst), 1);
    }

    /// Extractor whose personal code is unrelated to the serial number.
    struct RegistryExtractor;

    impl IdentityExtractor for RegistryExtractor {
        fn extract(&self, _: &[u8]) -> Result<Identity, IdentityError> {
            Ok(Identity::new("PNOEE-30303039914", "X", "MARI", "MAASIKAS"))
        }
    }

    #[tokio::test]
    async fn person_copies_custom_extractor_fields() {
        let client = Client::with_parts(
            Config::new("DEMO", "uuid"),
            complete("OK"),
            RegistryExtractor,
        );
        let person = client
            .fetch_session(&SessionId::from("session-1"))
            .await
            .unwrap();

        assert_eq!(person.identity_number, "PNOEE-30303039914");
        assert_eq!(person.personal_code, "X");
        assert_eq!(person.first_name, "MARI");
        assert_eq!(person.last_name, "MAASIKAS");
    }

    #[tokio::test]
    async fn extraction_error_is_passed_through() {
        let client = stub_client(complete("OK"), StubExtractor::failing());
        let err = fetch(&client).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Identity(IdentityError::MissingAttribute("serialNumber"))
        ));
    }

    #[tokio::test]
    async fn known_failure_codes_map_to_taxonomy() {
        let cases = [
            ("USER_REFUSED", ErrorKind::UserRefused),
            ("USER_REFUSED_DISPLAYTEXTANDPIN", ErrorKind::UserRefused),
            ("USER_REFUSED_VC_CHOICE", ErrorKind::UserRefused),
            ("USER_REFUSED_CONFIRMATIONMESSAGE", ErrorKind::UserRefused),
            ("USER_REFUSED_CONFIRMATIONMESSAGE_WITH_VC_CHOICE", ErrorKind::UserRefused),
            ("USER_REFUSED_CERT_CHOICE", ErrorKind::UserRefused),
            ("WRONG_VC", ErrorKind::UserRefused),
            ("TIMEOUT", ErrorKind::Timeout),
        ];
        for (code, expected) in cases {
            let client = stub_client(complete(code), StubExtractor::default());
            let err = fetch(&client).await.unwrap_err();
            assert_eq!(err.kind(), expected, "{code}");
            assert_eq!(client.extractor.calls.load(Ordering::SeqCst), 0, "{code}");
        }
    }

    #[tokio::test]
    async fn running_state_asks_for_another_poll() {
        let client = stub_client(
            StubTransport::fetching(|| Ok(SessionStateResponse::running())),
            StubExtractor::default(),
        );

        for _ in 0..2 {
            let err = fetch(&client).await.unwrap_err();
            assert!(err.is_running());
        }
        assert_eq!(client.transport.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(client.extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unrecognized_end_result_is_unsupported_result() {
        let client = stub_client(complete("FOO_BAR"), StubExtractor::default());
        let err = fetch(&client).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedResult(ref code) if code == "FOO_BAR"));
        assert_eq!(client.extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn complete_without_result_is_unsupported_result() {
        let client = stub_client(
            StubTransport::fetching(|| {
                let mut response = SessionStateResponse::complete("OK", None);
                response.result = None;
                Ok(response)
            }),
            StubExtractor::default(),
        );
        assert_eq!(
            fetch(&client).await.unwrap_err().kind(),
            ErrorKind::UnsupportedResult
        );
    }

    #[tokio::test]
    async fn unrecognized_state_is_unsupported_state() {
        let client = stub_client(
            StubTransport::fetching(|| Ok(SessionStateResponse::with_state("PENDING"))),
            StubExtractor::default(),
        );
        let err = fetch(&client).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedState(ref state) if state == "PENDING"));
    }

    #[tokio::test]
    async fn create_session_returns_transport_session() {
        let client = stub_client(
            StubTransport::creating(|| Ok(Session::new("abc", "0042"))),
            StubExtractor::default(),
        );
        let session = client.create_session("PNOEE-30303039914").await.unwrap();
        assert_eq!(session.id.as_str(), "abc");
        assert_eq!(session.verification_code, "0042");
    }

    #[tokio::test]
    async fn create_session_rejects_over_length_text() {
        let config = Config::new("DEMO", "uuid").with_text("x".repeat(61));
        let client = Client::with_parts(
            config,
            StubTransport::creating(|| panic!("transport must not be called")),
            StubExtractor::default(),
        );
        let err = client.create_session("PNOEE-30303039914").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    async fn create_session_maps_known_transport_conditions() {
        let cases: [(fn() -> TransportError, ErrorKind); 3] = [
            (|| TransportError::AuthenticationRunning, ErrorKind::AuthenticationRunning),
            (|| TransportError::NoSuitableAccount, ErrorKind::NoSuitableAccount),
            (|| TransportError::Maintenance, ErrorKind::Maintenance),
        ];
        for (make, expected) in cases {
            let client = stub_client(
                StubTransport::creating(move || Err(make())),
                StubExtractor::default(),
            );
            let err = client.create_session("PNOEE-30303039914").await.unwrap_err();
            assert_eq!(err.kind(), expected);
        }
    }

    #[tokio::test]
    async fn create_session_passes_other_errors_through() {
        let client = stub_client(
            StubTransport::creating(|| Err(TransportError::Other(Box::new(Marker(7))))),
            StubExtractor::default(),
        );
        let err = client.create_session("PNOEE-30303039914").await.unwrap_err();

        let Error::Transport(TransportError::Other(inner)) = err else {
            panic!("expected pass-through transport error");
        };
        assert_eq!(inner.downcast_ref::<Marker>().map(|m| m.0), Some(7));
    }

    #[tokio::test]
    async fn fetch_session_maps_transport_errors() {
        let client = stub_client(
            StubTransport::fetching(|| Err(TransportError::Maintenance)),
            StubExtractor::default(),
        );
        assert_eq!(fetch(&client).await.unwrap_err().kind(), ErrorKind::Maintenance);

        let client = stub_client(
            StubTransport::fetching(|| {
                Err(TransportError::Status {
                    operation: "session status",
                    status: 404,
                    detail: "session not found".into(),
                })
            }),
            StubExtractor::default(),
        );
        let err = fetch(&client).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::Status { status: 404, ref detail, .. })
                if detail == "session not found"
        ));
    }

    /// Transport whose fetch never completes; records when its future is dropped.
    struct HangingTransport {
        dropped: Arc<AtomicBool>,
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    impl Transport for HangingTransport {
        async fn create_session(&self, _: &Config, _: &str) -> Result<Session, TransportError> {
            let _flag = DropFlag(self.dropped.clone());
            std::future::pending().await
        }

        async fn fetch_session(
            &self,
            _: &Config,
            _: &SessionId,
        ) -> Result<SessionStateResponse, TransportError> {
            let _flag = DropFlag(self.dropped.clone());
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn cancellation_drops_in_flight_request() {
        let dropped = Arc::new(AtomicBool::new(false));
        let client = Client::with_parts(
            Config::new("DEMO", "uuid"),
            HangingTransport {
                dropped: dropped.clone(),
            },
            StubExtractor::default(),
        );

        let outcome = tokio::time::timeout(
            Duration::from_millis(20),
            client.fetch_session(&SessionId::from("session-1")),
        )
        .await;

        assert!(outcome.is_err(), "fetch should still be pending");
        assert!(dropped.load(Ordering::SeqCst));
        assert_eq!(client.extractor.calls.load(Ordering::SeqCst), 0);

        dropped.store(false, Ordering::SeqCst);
        let outcome = tokio::time::timeout(
            Duration::from_millis(20),
            client.create_session("PNOEE-30303039914"),
        )
        .await;
        assert!(outcome.is_err());
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn concurrent_polls_are_independent() {
        let client = Arc::new(stub_client(complete("OK"), StubExtractor::default()));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    client
                        .fetch_session(&SessionId::from(format!("session-{i}")))
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(client.transport.fetches.load(Ordering::SeqCst), 4);
    }
}
