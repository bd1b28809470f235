use crate::error::IdentityError;

/// Identity attributes read from an authentication certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Identity {
    pub identity_number: String,
    pub personal_code: String,
    pub first_name: String,
    pub last_name: String,
}

impl Identity {
    #[must_use]
    pub fn new(
        identity_number: impl Into<String>,
        personal_code: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            identity_number: identity_number.into(),
            personal_code: personal_code.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Builds an identity from the certificate subject's `serialNumber`, `givenName`
    /// and `surname` values.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidSerialNumber`] if the serial number has no
    /// `-` separated personal code.
    pub fn from_subject(
        serial_number: &str,
        given_name: &str,
        surname: &str,
    ) -> Result<Self, IdentityError> {
        let personal_code = serial_number
            .split_once('-')
            .map(|(_, code)| code)
            .filter(|code| !code.is_empty())
            .ok_or_else(|| IdentityError::InvalidSerialNumber(serial_number.to_owned()))?;

        Ok(Self::new(serial_number, personal_code, given_name, surname))
    }
}

/// Turns the certificate returned with a completed session into an [`Identity`].
pub trait IdentityExtractor: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`IdentityError`] when the certificate cannot be read.
    fn extract(&self, cert: &[u8]) -> Result<Identity, IdentityError>;
}

/// DER X.509 certificate extractor.
#[cfg(feature = "x509")]
#[derive(Debug, Clone, Copy, Default)]
pub struct CertificateExtractor;

#[cfg(feature = "x509")]
impl IdentityExtractor for CertificateExtractor {
    fn extract(&self, cert: &[u8]) -> Result<Identity, IdentityError> {
        use x509_parser::oid_registry::{
            OID_X509_GIVEN_NAME, OID_X509_SERIALNUMBER, OID_X509_SURNAME,
        };
        use x509_parser::prelude::*;

        let (_, cert) = X509Certificate::from_der(cert)
            .map_err(|e| IdentityError::Certificate(e.to_string()))?;
        let subject = cert.subject();

        let serial_number = subject_attribute(subject, &OID_X509_SERIALNUMBER, "serialNumber")?;
        let given_name = subject_attribute(subject, &OID_X509_GIVEN_NAME, "givenName")?;
        let surname = subject_attribute(subject, &OID_X509_SURNAME, "surname")?;

        Identity::from_subject(serial_number, given_name, surname)
    }
}

#[cfg(feature = "x509")]
fn subject_attribute<'a, 'n>(
    subject: &'a x509_parser::x509::X509Name<'n>,
    oid: &x509_parser::der_parser::oid::Oid<'n>,
    name: &'static str,
) -> Result<&'a str, IdentityError> {
    subject
        .iter_by_oid(oid)
        .next()
        .ok_or(IdentityError::MissingAttribute(name))?
        .as_str()
        .map_err(|e| IdentityError::Certificate(format!("{name}: {e}")))
}
