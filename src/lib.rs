#![doc = include_str!("../README.md")]

pub mod client;
pub mod config;
pub mod error;
pub mod hash;
pub mod identity;
pub mod status;
pub mod transport;
pub mod types;

// Re-exports for convenient access
pub use client::Client;
pub use config::{CertificateLevel, Config, InteractionType};
pub use error::{Error, ErrorKind, IdentityError, TransportError};
pub use hash::{AuthenticationHash, HashType, verification_code};
#[cfg(feature = "x509")]
pub use identity::CertificateExtractor;
pub use identity::{Identity, IdentityExtractor};
pub use status::{EndResult, SessionState, map_end_result, map_transport_error};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{SessionCertificate, SessionResult, SessionStateResponse, Transport};
pub use types::{Person, SemanticsIdentifier, Session, SessionId};
