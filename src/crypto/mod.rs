//! Credential cryptography. `passwords` is the hasher itself, `stored_hash`
//! is the validated persisted form, and `digest` holds the shared primitives.

pub mod digest;
pub mod passwords;
pub mod stored_hash;
