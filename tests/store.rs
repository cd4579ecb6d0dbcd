//! Key store tests - issuing keys and validating presented keys.

use std::fs;

use chrono::{Duration, Utc};

mod common;
use common::*;

use keymint::crypto::hash_key;
use keymint::error::AppError;

#[test]
fn test_two_weeks_is_fourteen_days() {
    let dir = temp_dir();
    let store = store_in(&dir);

    let record = store.issue_key(2, DurationUnit::Weeks).unwrap();

    assert_eq!(record.valid_days, 14);
    assert_eq!(record.duration, 2);
    assert_eq!(record.unit, DurationUnit::Weeks);
    assert_eq!(record.expires - record.created, Duration::days(14));
    assert_eq!(record.hash, hash_key(&record.key));
}

#[test]
fn test_months_and_years_are_approximate() {
    let dir = temp_dir();
    let store = store_in(&dir);
    // Jan 31 + "1 month" is 30 days later, not the calendar month end
    let now = new_year_pht() + Duration::days(30);

    let month = store.issue_key_at(1, DurationUnit::Months, now).unwrap();
    assert_eq!(month.expires - month.created, Duration::days(30));

    let year = store.issue_key_at(1, DurationUnit::Years, now).unwrap();
    assert_eq!(year.valid_days, 365);
}

#[test]
fn test_issue_appends_to_store() {
    let dir = temp_dir();
    let store = store_in(&dir);

    let first = store.issue_key(1, DurationUnit::Days).unwrap();
    let second = store.issue_key(1, DurationUnit::Years).unwrap();

    let records = store.load().unwrap();
    assert_eq!(records, vec![first, second]);

    let raw: serde_json::Value = read_json(store.path());
    let entry = &raw[0];
    for field in ["key", "created", "expires", "duration", "unit", "valid_days", "hash"] {
        assert!(entry.get(field).is_some(), "missing field {}", field);
    }
}

#[test]
fn test_zero_duration_is_rejected() {
    let dir = temp_dir();
    let store = store_in(&dir);

    let err = store.issue_key(0, DurationUnit::Days).unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert!(!store.path().exists());
}

#[test]
fn test_fresh_key_is_valid() {
    let dir = temp_dir();
    let store = store_in(&dir);
    let record = store.issue_key(1, DurationUnit::Years).unwrap();

    match store.validate_key(&record.key).unwrap() {
        Validation::Valid(found) => assert_eq!(found, record),
        other => panic!("expected valid key, got {:?}", other),
    }
}

#[test]
fn test_backdated_key_is_expired() {
    let dir = temp_dir();
    let store = store_in(&dir);
    let record = store
        .issue_key_at(1, DurationUnit::Days, Utc::now() - Duration::days(3))
        .unwrap();

    let outcome = store.validate_key(&record.key).unwrap();
    assert_eq!(outcome, Validation::Invalid(InvalidReason::Expired));
    assert_eq!(InvalidReason::Expired.to_string(), "Key expired");
}

#[test]
fn test_expiry_boundary() {
    let dir = temp_dir();
    let store = store_in(&dir);
    let record = store
        .issue_key_at(1, DurationUnit::Days, new_year_pht())
        .unwrap();

    assert!(store.validate_key_at(&record.key, record.expires).unwrap().is_valid());
    assert_eq!(
        store
            .validate_key_at(&record.key, record.expires + Duration::seconds(1))
            .unwrap(),
        Validation::Invalid(InvalidReason::Expired)
    );
}

#[test]
fn test_unknown_key_is_invalid() {
    let dir = temp_dir();
    let store = store_in(&dir);
    store.issue_key(1, DurationUnit::Years).unwrap();

    let outcome = store.validate_key("definitely-not-issued").unwrap();
    assert_eq!(outcome, Validation::Invalid(InvalidReason::UnknownKey));
    assert_eq!(InvalidReason::UnknownKey.to_string(), "Invalid key");
}

#[test]
fn test_missing_store_has_no_keys() {
    let dir = temp_dir();
    let store = store_in(&dir);

    let outcome = store.validate_key("anything").unwrap();
    assert_eq!(outcome, Validation::Invalid(InvalidReason::NoKeys));
    assert_eq!(InvalidReason::NoKeys.to_string(), "No keys found");
    assert!(!store.path().exists());
}

#[test]
fn test_validate_does_not_modify_store() {
    let dir = temp_dir();
    let store = store_in(&dir);
    let record = store.issue_key(1, DurationUnit::Weeks).unwrap();
    let before = fs::read(store.path()).unwrap();

    store.validate_key(&record.key).unwrap();
    store.validate_key("nope").unwrap();

    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn test_corrupt_store_is_treated_as_empty() {
    let dir = temp_dir();
    let store = store_in(&dir);
    fs::write(store.path(), "[{ broken").unwrap();

    assert_eq!(
        store.validate_key("anything").unwrap(),
        Validation::Invalid(InvalidReason::UnknownKey)
    );

    let record = store.issue_key(1, DurationUnit::Days).unwrap();
    assert_eq!(store.load().unwrap(), vec![record]);
}

#[test]
fn test_non_utf8_store_is_treated_as_empty() {
    let dir = temp_dir();
    let store = store_in(&dir);
    fs::write(store.path(), [0xff, 0xfe, 0x00, 0x5b]).unwrap();

    assert_eq!(
        store.validate_key("anything").unwrap(),
        Validation::Invalid(InvalidReason::UnknownKey)
    );

    let record = store.issue_key(1, DurationUnit::Days).unwrap();
    assert_eq!(store.load().unwrap(), vec![record]);
}
