use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Digest algorithm applied to the random authentication challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashType {
    #[serde(rename = "SHA256")]
    Sha256,
    #[serde(rename = "SHA384")]
    Sha384,
    #[default]
    #[serde(rename = "SHA512")]
    Sha512,
}

impl HashType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
        }
    }

    fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl FromStr for HashType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            other => Err(format!("unknown hash type {other}")),
        }
    }
}

/// Digest of a fresh random challenge, sent with the authentication request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationHash {
    hash_type: HashType,
    digest: Vec<u8>,
}

impl AuthenticationHash {
    /// Digests 64 random bytes with `hash_type`.
    #[must_use]
    pub fn generate(hash_type: HashType) -> Self {
        let random_bytes: [u8; 64] = rand::rng().random();
        Self {
            hash_type,
            digest: hash_type.digest(&random_bytes),
        }
    }

    #[must_use]
    pub fn hash_type(&self) -> HashType {
        self.hash_type
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.digest
    }

    /// Standard base64, as the provider expects it in the request body.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.digest)
    }

    #[must_use]
    pub fn verification_code(&self) -> String {
        verification_code(&self.digest)
    }
}

/// Computes the four-digit code the user's app displays for `hash`.
///
/// `code = u16_be(SHA256(hash)[30..32]) % 10000`, zero-padded.
#[must_use]
pub fn verification_code(hash: &[u8]) -> String {
    let digest = Sha256::digest(hash);
    let tail = u16::from_be_bytes([digest[30], digest[31]]);
    format!("{:04}", tail % 10_000)
}
