//! Shared helpers for integration tests.

#![allow(dead_code, unused_imports)]

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

pub use keymint::config::ReferenceZone;
pub use keymint::models::*;
pub use keymint::store::KeyStore;

pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

pub fn request(unit: DurationUnit, amount: u32, count: u32, tag: &str) -> GenerateRequest {
    GenerateRequest {
        unit,
        amount,
        count,
        tag: tag.to_string(),
    }
}

/// 2024-01-01T00:00:00+08:00
pub fn new_year_pht() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 12, 31, 16, 0, 0).unwrap()
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    let contents = std::fs::read_to_string(path).expect("Failed to read file");
    serde_json::from_str(&contents).expect("Failed to parse JSON")
}

pub fn store_in(dir: &TempDir) -> KeyStore {
    KeyStore::new(dir.path().join("keys.json"))
}
