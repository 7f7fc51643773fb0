//! Salted SHA-256 credential hashing.
//!
//! Stored values have the shape `<base64 salt>:<base64 digest>` where the digest
//! is `SHA-256(salt || password)`. The format is shared with existing user
//! records, so the algorithm is fixed: no stretching and no parameters.

use base64::Engine;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use super::digest::{constant_time_eq, salted_sha256, SALT_DECODER, STANDARD};

/// Number of random salt bytes generated per hash.
pub const SALT_LEN: usize = 16;

/// Separator between the salt and digest fields.
pub const DELIMITER: char = ':';

/// Hashes a password with a fresh salt from the operating system RNG.
/// Two calls with the same password return different strings.
pub fn hash_password(plaintext: &str) -> String {
    hash_password_with_rng(plaintext, &mut OsRng)
}

/// Same as [`hash_password`] but draws the salt from the supplied CSPRNG.
pub fn hash_password_with_rng<R>(plaintext: &str, rng: &mut R) -> String
where
    R: RngCore + CryptoRng,
{
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    hash_with_salt(plaintext, &salt)
}

pub(crate) fn hash_with_salt(plaintext: &str, salt: &[u8]) -> String {
    let salt_b64 = STANDARD.encode(salt);
    let digest = salted_sha256(salt, plaintext.as_bytes());
    format!("{salt_b64}{DELIMITER}{}", STANDARD.encode(digest))
}

/// Verifies a plaintext password against a stored `salt:digest` string.
/// Returns `false` for any malformed input instead of failing.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let (salt_b64, digest_b64) = match stored_hash.split_once(DELIMITER) {
        Some(parts) => parts,
        None => return false,
    };
    if digest_b64.contains(DELIMITER) {
        return false;
    }

    let salt = match SALT_DECODER.decode(salt_b64) {
        Ok(salt) => salt,
        Err(_) => return false,
    };

    let expected = STANDARD.encode(salted_sha256(&salt, plaintext.as_bytes()));
    constant_time_eq(expected.as_bytes(), digest_b64.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::{hash_password, hash_password_with_rng, hash_with_salt, verify_password, DELIMITER};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FIXED_SALT: [u8; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

    #[test]
    fn hashes_and_verifies_passwords() {
        let hash = hash_password("testPassword123");
        assert!(verify_password("testPassword123", &hash));
        assert!(!verify_password("wrongPassword", &hash));
    }

    #[test]
    fn produces_salt_and_digest_fields() {
        let hash = hash_password("testPassword123");
        let (salt, digest) = hash.split_once(DELIMITER).expect("delimiter present");
        assert_eq!(salt.len(), 24);
        assert_eq!(digest.len(), 44);
        assert_eq!(hash.matches(DELIMITER).count(), 1);
    }

    #[test]
    fn matches_known_vectors() {
        assert_eq!(
            hash_with_salt("testPassword123", &FIXED_SALT),
            "AAECAwQFBgcICQoLDA0ODw==:9jiQ/4ikeABJ7AAUhg0f0a2oQ8tf6RYOqcStH7lbPaY="
        );
        assert_eq!(
            hash_with_salt("", &FIXED_SALT),
            "AAECAwQFBgcICQoLDA0ODw==:vkXLJgW/Nr695oSEGijw/UPGmFCj3OX+26aZKO46iZE="
        );
    }

    #[test]
    fn verifies_unicode_and_symbols() {
        let password = "pässwörd!@#$%^&*()_+日本語";
        let stored = "AAECAwQFBgcICQoLDA0ODw==:vD+xkyS0AZ8GbbZZydMDvQ24MJ8OouB8uP4ASKcyy68=";
        assert!(verify_password(password, stored));
        assert!(verify_password(password, &hash_password(password)));
        assert!(!verify_password("passwörd", stored));
    }

    #[test]
    fn accepts_unpadded_salt() {
        let stored = "AAECAwQFBgcICQoLDA0ODw:9jiQ/4ikeABJ7AAUhg0f0a2oQ8tf6RYOqcStH7lbPaY=";
        assert!(verify_password("testPassword123", stored));
    }

    #[test]
    fn accepts_salts_of_other_lengths() {
        let stored = "AAAAAAAAAAAAAAAA:cF5Q6rqc6CXX5Mmh2srzRqRFaPJluMk58V8dvtQgm+4=";
        assert!(verify_password("abc", stored));
    }

    #[test]
    fn rejects_malformed_hashes() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not_a_valid_hash"));
        assert!(!verify_password("anything", ":"));
        assert!(!verify_password("anything", "!!!:AAAA"));
        assert!(!verify_password(
            "testPassword123",
            "AAECAwQFBgcICQoLDA0ODw==:9jiQ/4ikeABJ7AAUhg0f0a2oQ8tf6RYOqcStH7lbPaY=:extra"
        ));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let first = hash_password_with_rng("pw", &mut StdRng::seed_from_u64(7));
        let second = hash_password_with_rng("pw", &mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
        assert!(verify_password("pw", &first));
    }

    proptest! {
        #[test]
        fn every_hash_verifies(password in ".*") {
            let hash = hash_password(&password);
            prop_assert_eq!(hash.matches(DELIMITER).count(), 1);
            prop_assert!(verify_password(&password, &hash));
        }

        #[test]
        fn salts_differ_between_calls(password in ".*") {
            prop_assert_ne!(hash_password(&password), hash_password(&password));
        }

        #[test]
        fn other_passwords_fail(a in ".*", b in ".*") {
            prop_assume!(a != b);
            let hash = hash_password(&a);
            prop_assert!(!verify_password(&b, &hash));
        }

        #[test]
        fn verification_is_deterministic(password in ".*", stored in ".*") {
            prop_assert_eq!(
                verify_password(&password, &stored),
                verify_password(&password, &stored)
            );
        }
    }
}
