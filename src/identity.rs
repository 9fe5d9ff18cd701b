use std::fmt;
use thiserror::Error;

// Partition keys carry this prefix so identity lists and other top-level keys
// (e.g. the resumption marker) never collide in the same store.
const PARTITION_PREFIX: &str = "expenses_";

/// A normalized identity string selecting one storage partition.
///
/// This is not an authenticated principal: any string the user supplies is
/// accepted after trimming, and two inputs that lowercase to the same string
/// share a partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

#[derive(Error, Debug, PartialEq)]
pub enum IdentityError {
    #[error("identity is empty after trimming whitespace")]
    Empty,
}

impl Identity {
    /// Validate and normalize a user-supplied identity string.
    pub fn select(raw: &str) -> Result<Self, IdentityError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::Empty);
        }
        Ok(Identity(trimmed.to_lowercase()))
    }

    /// Restore a previously persisted identity without re-validation.
    ///
    /// Stored identities were normalized by `select` before they were
    /// persisted, so this trusts the input. Idempotent: resuming the stored
    /// form of an identity yields that same identity.
    pub fn resume(stored: Option<&str>) -> Option<Self> {
        stored.map(|s| Identity(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The durable storage key holding this identity's record list.
    pub(crate) fn partition_key(&self) -> String {
        format!("{}{}", PARTITION_PREFIX, self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
