use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DurationUnit;

/// A key held in the key store.
///
/// `hash` is the SHA-256 digest of `key` and is what lookups match on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub key: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
    pub duration: u32,
    pub unit: DurationUnit,
    pub valid_days: i64,
    pub hash: String,
}

impl KeyRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires
    }
}

/// Why a presented key was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    Expired,
    UnknownKey,
    /// The store file does not exist yet
    NoKeys,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "Key expired"),
            Self::UnknownKey => write!(f, "Invalid key"),
            Self::NoKeys => write!(f, "No keys found"),
        }
    }
}

/// Outcome of validating a presented key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid(KeyRecord),
    Invalid(InvalidReason),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}
