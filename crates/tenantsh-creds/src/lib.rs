//! Flat-file, bcrypt-backed credential store.
//!
//! One record per line: `username:bcrypt_hash`. Blank lines and lines whose
//! first non-whitespace character is `#` are comments. The store is loaded
//! once at startup and never mutated by the gateway process; only
//! `tenantsh-useradm` writes to the file.

pub mod error;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub use error::{CredsError, Result};

/// Default bcrypt work factor for newly created credentials.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// An in-memory snapshot of the credential file, keyed by username.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    /// Load a credential file from disk.
    ///
    /// Fails with [`CredsError::NotFound`] if the path does not exist — the
    /// gateway treats this as a fatal startup condition. Malformed lines are
    /// skipped and logged, never fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CredsError::NotFound(path.display().to_string()));
        }

        let contents = fs::read_to_string(path)?;
        let mut users = HashMap::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once(':') {
                Some((username, hashed)) if !username.is_empty() => {
                    users.insert(username.to_string(), hashed.to_string());
                }
                _ => {
                    tracing::warn!("invalid line in credential file: {line}");
                }
            }
        }

        tracing::info!(count = users.len(), path = %path.display(), "loaded credential store");
        Ok(Self { users })
    }

    /// Verify a password against the stored hash for `username`.
    ///
    /// Returns `false` for unknown usernames without distinguishing the
    /// reason, so clients cannot enumerate valid usernames by timing or
    /// response shape alone.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(hash) => bcrypt::verify(password, hash).unwrap_or(false),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Append a new user to the credential file at `path`, creating it if
/// necessary. Rejects duplicate usernames. Grounded in the external
/// credential-management helper's `add_user` behavior.
pub fn add_user(path: impl AsRef<Path>, username: &str, password: &str, cost: u32) -> Result<()> {
    let path = path.as_ref();

    let existing = if path.exists() {
        CredentialStore::load(path)?
    } else {
        CredentialStore::default()
    };

    if existing.users.contains_key(username) {
        return Err(CredsError::AlreadyExists(username.to_string()));
    }

    let hash = bcrypt::hash(password, cost)?;

    use std::io::Write;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{username}:{hash}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let err = CredentialStore::load("/nonexistent/users.txt").unwrap_err();
        assert!(matches!(err, CredsError::NotFound(_)));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let f = write_file("\n# a comment\nalice:$2b$10$abc\n\n");
        let store = CredentialStore::load(f.path()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn malformed_line_is_skipped_not_fatal() {
        let f = write_file("alice:$2b$10$abc\nnotcolonformatted\nbob:$2b$10$def\n");
        let store = CredentialStore::load(f.path()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn splits_on_first_colon_only() {
        let f = write_file("alice:$2b$10$abc:def:ghi\n");
        let store = CredentialStore::load(f.path()).unwrap();
        assert_eq!(store.users.get("alice").unwrap(), "$2b$10$abc:def:ghi");
    }

    #[test]
    fn duplicate_username_last_wins() {
        let f = write_file("alice:first\nalice:second\n");
        let store = CredentialStore::load(f.path()).unwrap();
        assert_eq!(store.users.get("alice").unwrap(), "second");
    }

    #[test]
    fn verify_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.txt");
        add_user(&path, "alice", "secret", 4).unwrap();

        let store = CredentialStore::load(&path).unwrap();
        assert!(store.verify("alice", "secret"));
        assert!(!store.verify("alice", "wrong"));
        assert!(!store.verify("mallory", "secret"));
    }

    #[test]
    fn add_user_rejects_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.txt");
        add_user(&path, "alice", "secret", 4).unwrap();
        let err = add_user(&path, "alice", "other", 4).unwrap_err();
        assert!(matches!(err, CredsError::AlreadyExists(_)));
    }
}
