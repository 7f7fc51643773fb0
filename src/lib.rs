//! Credential handling for the flashcard study app: salted SHA-256 password
//! hashes in the `salt:digest` format the app stores, plus the account records
//! that hold them.

pub mod accounts;
pub mod config;
pub mod crypto;
pub mod logging;

pub use crypto::passwords::{hash_password, verify_password};
pub use crypto::stored_hash::{HashFormatError, StoredCredentialHash};
