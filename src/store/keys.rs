use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use crate::crypto::{digests_match, generate_store_key, hash_key};
use crate::error::{AppError, Result};
use crate::expiry::approx_valid_days;
use crate::models::{DurationUnit, InvalidReason, KeyRecord, Validation};

use super::file::{read_json_list, write_json_atomic};

/// Flat-file key database: a JSON array of [`KeyRecord`]s.
///
/// Every issue loads the whole file, appends, and rewrites it. There is no
/// cross-process lock, so concurrent issuers can lose updates.
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored records, oldest first. A missing or corrupt file yields an empty list.
    pub fn load(&self) -> Result<Vec<KeyRecord>> {
        Ok(read_json_list(&self.path)?.unwrap_or_default())
    }

    /// Issue a new key valid for `duration` units from now.
    pub fn issue_key(&self, duration: u32, unit: DurationUnit) -> Result<KeyRecord> {
        self.issue_key_at(duration, unit, Utc::now())
    }

    /// Issue a new key as if the current time were `now`.
    pub fn issue_key_at(
        &self,
        duration: u32,
        unit: DurationUnit,
        now: DateTime<Utc>,
    ) -> Result<KeyRecord> {
        let valid_days = approx_valid_days(unit, duration)?;
        let created = trim_to_seconds(now);
        let expires = Duration::try_days(valid_days)
            .and_then(|d| created.checked_add_signed(d))
            .ok_or_else(|| {
                AppError::invalid(format!("expiry of {} {} is out of range", duration, unit))
            })?;

        let key = generate_store_key();
        let record = KeyRecord {
            hash: hash_key(&key),
            key,
            created,
            expires,
            duration,
            unit,
            valid_days,
        };

        let mut records = self.load()?;
        records.push(record.clone());
        write_json_atomic(&self.path, &records)?;

        tracing::info!(
            store = %self.path.display(),
            valid_days,
            expires = %record.expires,
            "Issued key"
        );
        Ok(record)
    }

    /// Check a presented key against the store.
    pub fn validate_key(&self, presented: &str) -> Result<Validation> {
        self.validate_key_at(presented, Utc::now())
    }

    /// Check a presented key as if the current time were `now`. Read-only.
    pub fn validate_key_at(&self, presented: &str, now: DateTime<Utc>) -> Result<Validation> {
        let Some(records) = read_json_list::<KeyRecord>(&self.path)? else {
            return Ok(Validation::Invalid(InvalidReason::NoKeys));
        };

        let digest = hash_key(presented);
        let found = records
            .into_iter()
            .find(|record| digests_match(&record.hash, &digest));

        let outcome = match found {
            None => Validation::Invalid(InvalidReason::UnknownKey),
            Some(record) if record.is_expired_at(now) => {
                Validation::Invalid(InvalidReason::Expired)
            }
            Some(record) => Validation::Valid(record),
        };

        tracing::debug!(valid = outcome.is_valid(), "Validated key");
        Ok(outcome)
    }
}

fn trim_to_seconds(now: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}
