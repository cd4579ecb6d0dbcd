use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::DurationUnit;

/// Metadata and key list produced by a single issuer run.
///
/// Every key in the batch shares the same expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub generated_at_pht: DateTime<FixedOffset>,
    #[serde(serialize_with = "utc_with_numeric_offset")]
    pub generated_at_utc: DateTime<Utc>,
    pub unit: DurationUnit,
    pub amount: u32,
    pub count: u32,
    #[serde(default)]
    pub tag: String,
    pub expires_at_pht: DateTime<FixedOffset>,
    #[serde(serialize_with = "utc_with_numeric_offset")]
    pub expires_at_utc: DateTime<Utc>,
    pub expires_at_unix: i64,
    /// Human-readable label of the reference zone
    pub timezone: String,
    pub keys: Vec<String>,
}

/// Write UTC timestamps as `+00:00` rather than `Z`, matching the zoned fields.
fn utc_with_numeric_offset<S: Serializer>(
    dt: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Parameters for one issuer run, validated by `issuer::generate_keys`.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub unit: DurationUnit,
    pub amount: u32,
    pub count: u32,
    pub tag: String,
}

/// One entry of the append-only `index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run folder name, e.g. `run_20240101_000000`
    pub run: String,
    pub unit: DurationUnit,
    pub amount: u32,
    pub count: u32,
    pub generated_at_pht: DateTime<FixedOffset>,
    pub expires_at_pht: DateTime<FixedOffset>,
    #[serde(default)]
    pub tag: String,
}

impl RunSummary {
    pub fn from_batch(run: impl Into<String>, batch: &BatchRecord) -> Self {
        Self {
            run: run.into(),
            unit: batch.unit,
            amount: batch.amount,
            count: batch.keys.len() as u32,
            generated_at_pht: batch.generated_at_pht,
            expires_at_pht: batch.expires_at_pht,
            tag: batch.tag.clone(),
        }
    }
}

/// CSV row shape: batch metadata repeated for each key.
#[derive(Debug, Serialize)]
pub(crate) struct BatchCsvRow<'a> {
    pub key: &'a str,
    pub generated_at_pht: String,
    pub expires_at_pht: String,
    pub expires_at_unix: i64,
    pub unit: DurationUnit,
    pub amount: u32,
    pub tag: &'a str,
}
