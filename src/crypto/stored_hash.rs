//! Strongly typed wrapper around the persisted `salt:digest` string.
//!
//! `verify_password` accepts arbitrary text and simply answers `false` for
//! garbage. Account records want the stricter guarantee that what they hold
//! was produced by [`hash_password`](super::passwords::hash_password), so
//! parsing here checks the delimiter, both encodings and both lengths.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::digest::{DIGEST_LEN, SALT_DECODER, STANDARD};
use super::passwords::{hash_password, verify_password, DELIMITER, SALT_LEN};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashFormatError {
    #[error("stored hash has no ':' delimiter")]
    MissingDelimiter,
    #[error("stored hash has more than one ':' delimiter")]
    TooManyDelimiters,
    #[error("salt is not valid base64: {0}")]
    InvalidSalt(String),
    #[error("digest is not valid base64: {0}")]
    InvalidDigest(String),
    #[error("salt decodes to {actual} bytes; expected {expected}")]
    SaltLength { expected: usize, actual: usize },
    #[error("digest decodes to {actual} bytes; expected {expected}")]
    DigestLength { expected: usize, actual: usize },
}

/// A validated `<base64 salt>:<base64 sha256 digest>` string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StoredCredentialHash {
    encoded: String,
    split: usize,
}

impl StoredCredentialHash {
    /// Hashes `plaintext` with a fresh salt.
    pub fn generate(plaintext: &str) -> Self {
        let encoded = hash_password(plaintext);
        let split = encoded.find(DELIMITER).unwrap_or(encoded.len());
        Self { encoded, split }
    }

    pub fn parse(stored: &str) -> Result<Self, HashFormatError> {
        let (salt_b64, digest_b64) = stored
            .split_once(DELIMITER)
            .ok_or(HashFormatError::MissingDelimiter)?;
        if digest_b64.contains(DELIMITER) {
            return Err(HashFormatError::TooManyDelimiters);
        }

        let salt = SALT_DECODER
            .decode(salt_b64)
            .map_err(|e| HashFormatError::InvalidSalt(format!("{e}")))?;
        if salt.len() != SALT_LEN {
            return Err(HashFormatError::SaltLength {
                expected: SALT_LEN,
                actual: salt.len(),
            });
        }

        let digest = STANDARD
            .decode(digest_b64)
            .map_err(|e| HashFormatError::InvalidDigest(format!("{e}")))?;
        if digest.len() != DIGEST_LEN {
            return Err(HashFormatError::DigestLength {
                expected: DIGEST_LEN,
                actual: digest.len(),
            });
        }

        Ok(Self {
            encoded: stored.to_owned(),
            split: salt_b64.len(),
        })
    }

    pub fn salt_b64(&self) -> &str {
        &self.encoded[..self.split]
    }

    pub fn digest_b64(&self) -> &str {
        &self.encoded[self.split + DELIMITER.len_utf8()..]
    }

    pub fn salt_bytes(&self) -> Vec<u8> {
        // Validated at construction.
        SALT_DECODER.decode(self.salt_b64()).unwrap_or_default()
    }

    pub fn digest_bytes(&self) -> Vec<u8> {
        STANDARD.decode(self.digest_b64()).unwrap_or_default()
    }

    /// Checks `plaintext` against this hash.
    pub fn verify(&self, plaintext: &str) -> bool {
        verify_password(plaintext, &self.encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn into_string(self) -> String {
        self.encoded
    }
}

impl fmt::Display for StoredCredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

// The digest is not secret, but there is no reason to spray it into logs.
impl fmt::Debug for StoredCredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredentialHash")
            .field("salt", &self.salt_b64())
            .field("digest", &"<redacted>")
            .finish()
    }
}

impl AsRef<str> for StoredCredentialHash {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

impl FromStr for StoredCredentialHash {
    type Err = HashFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for StoredCredentialHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encoded)
    }
}

impl<'de> Deserialize<'de> for StoredCredentialHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
