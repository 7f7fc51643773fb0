//! User account records keyed by username. Each record only ever holds the
//! salted hash; plaintext passwords are compared and dropped immediately.
//!
//! A store is either purely in-memory or backed by a JSON file that is
//! rewritten after every mutation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::crypto::passwords::verify_password;
use crate::crypto::stored_hash::StoredCredentialHash;

const FILE_VERSION: u32 = 1;

/// Well-formed hash checked against when the username is unknown.
const DECOY_HASH: &str = "AAECAwQFBgcICQoLDA0ODw==:9jiQ/4ikeABJ7AAUhg0f0a2oQ8tf6RYOqcStH7lbPaY=";

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account '{0}' already exists")]
    AlreadyExists(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("account file unavailable: {0}")]
    Io(String),
    #[error("account file parse failed: {0}")]
    Parse(String),
    #[error("unsupported account file version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub username: String,
    pub password_hash: StoredCredentialHash,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccountFile {
    version: u32,
    accounts: Vec<AccountRecord>,
}

#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: BTreeMap<String, AccountRecord>,
    path: Option<PathBuf>,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn normalize(username: &str) -> Result<String, AccountError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(AccountError::EmptyUsername);
    }
    Ok(trimmed.to_owned())
}

impl AccountStore {
    /// Creates an empty store that is never written to disk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a file-backed store. A missing file yields an empty store; the
    /// file is created on the first mutation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AccountError> {
        let path = path.as_ref().to_path_buf();
        let mut accounts = BTreeMap::new();

        if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| AccountError::Io(format!("{e}")))?;
            let file: AccountFile =
                serde_json::from_str(&raw).map_err(|e| AccountError::Parse(format!("{e}")))?;
            if file.version != FILE_VERSION {
                return Err(AccountError::UnsupportedVersion(file.version));
            }
            for mut record in file.accounts {
                let key = normalize(&record.username)
                    .map_err(|_| AccountError::Parse("record with empty username".to_string()))?;
                if accounts.contains_key(&key) {
                    return Err(AccountError::Parse(format!("duplicate account '{key}'")));
                }
                record.username = key.clone();
                accounts.insert(key, record);
            }
            debug!(path = %path.display(), count = accounts.len(), "loaded account file");
        } else {
            debug!(path = %path.display(), "account file missing; starting empty");
        }

        Ok(Self {
            accounts,
            path: Some(path),
        })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username.trim())
    }

    pub fn get(&self, username: &str) -> Option<&AccountRecord> {
        self.accounts.get(username.trim())
    }

    pub fn register(&mut self, username: &str, password: &str) -> Result<(), AccountError> {
        let username = normalize(username)?;
        if self.accounts.contains_key(&username) {
            return Err(AccountError::AlreadyExists(username));
        }

        let now = unix_now();
        let record = AccountRecord {
            username: username.clone(),
            password_hash: StoredCredentialHash::generate(password),
            created_at: now,
            updated_at: now,
        };
        let mut next = self.accounts.clone();
        next.insert(username.clone(), record);
        self.commit(next)?;
        info!(%username, "registered account");
        Ok(())
    }

    /// Unknown users and wrong passwords produce the same error.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<(), AccountError> {
        let record = self.checked_record(username, password)?;
        debug!(username = %record.username, "authenticated");
        Ok(())
    }

    pub fn reset_password(
        &mut self,
        username: &str,
        current: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let mut record = self.checked_record(username, current)?.clone();
        record.password_hash = StoredCredentialHash::generate(new_password);
        record.updated_at = unix_now();

        let key = record.username.clone();
        let mut next = self.accounts.clone();
        next.insert(key.clone(), record);
        self.commit(next)?;
        info!(username = %key, "password reset");
        Ok(())
    }

    pub fn delete_account(&mut self, username: &str, password: &str) -> Result<(), AccountError> {
        let key = self.checked_record(username, password)?.username.clone();
        let mut next = self.accounts.clone();
        next.remove(&key);
        self.commit(next)?;
        info!(username = %key, "deleted account");
        Ok(())
    }

    fn checked_record(&self, username: &str, password: &str) -> Result<&AccountRecord, AccountError> {
        let record = match self.accounts.get(username.trim()) {
            Some(record) => record,
            None => {
                // Same hashing work as a real mismatch.
                let _ = verify_password(password, DECOY_HASH);
                warn!(username = %username.trim(), "login for unknown account");
                return Err(AccountError::InvalidCredentials);
            }
        };
        if !record.password_hash.verify(password) {
            warn!(username = %record.username, "password mismatch");
            return Err(AccountError::InvalidCredentials);
        }
        Ok(record)
    }

    /// Persists `next` and only then replaces the in-memory records, so a
    /// failed write leaves the store exactly as it was.
    fn commit(&mut self, next: BTreeMap<String, AccountRecord>) -> Result<(), AccountError> {
        if let Some(path) = &self.path {
            write_account_file(path, &next)?;
        }
        self.accounts = next;
        Ok(())
    }
}

/// Writes to a sibling temp file and renames it over the target so a crash
/// never leaves a half-written account file behind.
fn write_account_file(
    path: &Path,
    accounts: &BTreeMap<String, AccountRecord>,
) -> Result<(), AccountError> {
    let file = AccountFile {
        version: FILE_VERSION,
        accounts: accounts.values().cloned().collect(),
    };
    let json = serde_json::to_vec_pretty(&file).map_err(|e| AccountError::Parse(format!("{e}")))?;

    let mut tmp = path.to_path_buf().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json).map_err(|e| AccountError::Io(format!("{e}")))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(AccountError::Io(format!("{e}")));
    }
    debug!(path = %path.display(), count = accounts.len(), "saved account file");
    Ok(())
}
