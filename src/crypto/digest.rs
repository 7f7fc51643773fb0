//! Low-level digest helpers shared by the password hasher and the stored-hash
//! parser. Kept apart from the public hashing API so the salted payload layout
//! lives in exactly one place.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

pub use base64::engine::general_purpose::STANDARD;

/// Length in bytes of a SHA-256 digest.
pub const DIGEST_LEN: usize = 32;

/// Standard alphabet decoder that accepts salts with or without `=` padding.
pub const SALT_DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Computes `SHA-256(salt || password)` with no separator between the two.
pub fn salted_sha256(salt: &[u8], password: &[u8]) -> [u8; DIGEST_LEN] {
    let mut payload = Vec::with_capacity(salt.len() + password.len());
    payload.extend_from_slice(salt);
    payload.extend_from_slice(password);

    let mut hasher = Sha256::new();
    hasher.update(&payload);
    payload.zeroize();
    hasher.finalize().into()
}

/// Compares two byte strings without short-circuiting on the first mismatch.
/// Only the lengths are observable through timing.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::{constant_time_eq, salted_sha256, SALT_DECODER, STANDARD};
    use base64::Engine;
    use hex::ToHex;

    #[test]
    fn hashes_salt_then_password() {
        let digest = salted_sha256(&[0u8; 12], b"abc");
        assert_eq!(
            STANDARD.encode(digest),
            "cF5Q6rqc6CXX5Mmh2srzRqRFaPJluMk58V8dvtQgm+4="
        );
    }

    #[test]
    fn empty_salt_is_plain_sha256() {
        let digest = salted_sha256(&[], b"flashcards");
        assert_eq!(
            digest.encode_hex::<String>(),
            "92695d0d721e17e3bdfb6d5618809a5115e3c54f31525df6f11c9476554b30d6"
        );
    }

    #[test]
    fn salt_decoder_ignores_padding() {
        let padded = SALT_DECODER.decode("AAECAwQFBgcICQoLDA0ODw==").unwrap();
        let bare = SALT_DECODER.decode("AAECAwQFBgcICQoLDA0ODw").unwrap();
        assert_eq!(padded, bare);
        assert_eq!(padded, (0u8..16).collect::<Vec<_>>());
    }

    #[test]
    fn compares_in_constant_time() {
        assert!(constant_time_eq(b"same", b"same"));
        assert!(!constant_time_eq(b"same", b"sane"));
        assert!(!constant_time_eq(b"short", b"longer"));
        assert!(constant_time_eq(b"", b""));
    }
}
