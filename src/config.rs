use std::env;
use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};

use crate::error::{AppError, Result};

const SECONDS_PER_HOUR: i32 = 3600;

/// Time zone used for the human-readable timestamps of an issuer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceZone {
    /// Label written into batch records (e.g. "Asia/Manila (GMT+8)")
    pub name: String,
    pub offset: FixedOffset,
}

impl ReferenceZone {
    pub fn new(name: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            name: name.into(),
            offset,
        }
    }

    /// Build a zone from a whole-hour offset east of UTC.
    pub fn from_hours(name: impl Into<String>, hours: i32) -> Result<Self> {
        let offset = hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| AppError::invalid(format!("UTC offset out of range: {} hours", hours)))?;
        Ok(Self::new(name, offset))
    }

    /// Asia/Manila, fixed at UTC+8 (no DST).
    pub fn manila() -> Self {
        Self::new(
            "Asia/Manila (GMT+8)",
            FixedOffset::east_opt(8 * SECONDS_PER_HOUR).unwrap_or_else(|| Utc.fix()),
        )
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        Self::manila()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub zone: ReferenceZone,
    /// Root directory for issuer runs
    pub output_dir: PathBuf,
    /// JSON file backing the key store
    pub store_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let zone_name =
            env::var("KEYMINT_TZ_NAME").unwrap_or_else(|_| ReferenceZone::manila().name);

        let zone = zone_from_offset_var(
            zone_name,
            env::var("KEYMINT_TZ_OFFSET_HOURS").ok().as_deref(),
        );

        let defaults = Self::defaults();
        Self {
            zone,
            output_dir: env::var("KEYMINT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            store_path: env::var("KEYMINT_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
        }
    }

    /// Built-in values used when nothing is set in the environment.
    pub fn defaults() -> Self {
        Self {
            zone: ReferenceZone::manila(),
            output_dir: PathBuf::from("keys"),
            store_path: PathBuf::from("keys.json"),
        }
    }
}

/// Resolve the reference zone from a raw `KEYMINT_TZ_OFFSET_HOURS` value.
///
/// Unset falls back to UTC+8 silently; a set but unusable value is logged first.
fn zone_from_offset_var(name: String, raw: Option<&str>) -> ReferenceZone {
    let fallback = |name: String| ReferenceZone::new(name, ReferenceZone::manila().offset);

    let Some(raw) = raw else {
        return fallback(name);
    };

    let parsed = raw
        .trim()
        .parse::<i32>()
        .map_err(|e| AppError::invalid(format!("not an integer: {}", e)))
        .and_then(|hours| ReferenceZone::from_hours(name.clone(), hours));

    match parsed {
        Ok(zone) => zone,
        Err(e) => {
            tracing::warn!(
                value = raw,
                error = %e,
                "Ignoring KEYMINT_TZ_OFFSET_HOURS, using UTC+8"
            );
            fallback(name)
        }
    }
}
