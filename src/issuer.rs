//! Batch key issuance.
//!
//! A run generates `count` keys sharing one calendar-aware expiry and writes:
//!
//! ```text
//! <output_dir>/
//! ├── run_<YYYYMMDD_HHMMSS>/
//! │   ├── keys.json     full batch record
//! │   └── keys.csv      one row per key
//! ├── latest.json       copy of the most recent batch (overwritten)
//! └── index.json        append-only list of run summaries
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone, Utc};

use crate::config::ReferenceZone;
use crate::crypto::generate_issuer_key;
use crate::error::{AppError, Result};
use crate::expiry::compute_expiry;
use crate::models::{BatchCsvRow, BatchRecord, GenerateRequest, RunSummary};
use crate::store::file::{read_json_list, write_atomic, write_json_atomic};

pub const BATCH_JSON: &str = "keys.json";
pub const BATCH_CSV: &str = "keys.csv";
pub const LATEST_JSON: &str = "latest.json";
pub const INDEX_JSON: &str = "index.json";

/// A written batch and the artifacts it touched.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub batch: BatchRecord,
    pub run_dir: PathBuf,
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
    pub latest_path: PathBuf,
    pub index_path: PathBuf,
}

/// Generate a batch of keys and write it under `output_dir`.
pub fn generate_keys(
    request: &GenerateRequest,
    output_dir: &Path,
    zone: &ReferenceZone,
) -> Result<BatchResult> {
    generate_keys_at(request, output_dir, zone, Utc::now())
}

/// Same as [`generate_keys`], with the generation time supplied by the caller.
pub fn generate_keys_at(
    request: &GenerateRequest,
    output_dir: &Path,
    zone: &ReferenceZone,
    now: DateTime<Utc>,
) -> Result<BatchResult> {
    let batch = build_batch(request, zone, now)?;

    fs::create_dir_all(output_dir).map_err(|e| AppError::io(output_dir, e))?;
    let run_dir = create_run_dir(output_dir, &batch.generated_at_pht)?;
    let run_name = run_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let json_path = run_dir.join(BATCH_JSON);
    write_json_atomic(&json_path, &batch)?;

    let csv_path = run_dir.join(BATCH_CSV);
    write_batch_csv(&csv_path, &batch)?;

    let latest_path = output_dir.join(LATEST_JSON);
    write_json_atomic(&latest_path, &batch)?;

    let index_path = output_dir.join(INDEX_JSON);
    append_run_summary(&index_path, RunSummary::from_batch(run_name, &batch))?;

    tracing::info!(
        run_dir = %run_dir.display(),
        count = batch.keys.len(),
        unit = %batch.unit,
        amount = batch.amount,
        expires_at = %batch.expires_at_pht,
        "Wrote key batch"
    );

    Ok(BatchResult {
        batch,
        run_dir,
        json_path,
        csv_path,
        latest_path,
        index_path,
    })
}

/// Build the batch record without touching the filesystem.
pub fn build_batch(
    request: &GenerateRequest,
    zone: &ReferenceZone,
    now: DateTime<Utc>,
) -> Result<BatchRecord> {
    if request.count == 0 {
        return Err(AppError::invalid("count must be a positive integer"));
    }

    let generated_at = to_zone(now, zone);
    let expires_at = compute_expiry(generated_at, request.unit, request.amount)?;
    let keys = (0..request.count).map(|_| generate_issuer_key()).collect();

    Ok(BatchRecord {
        generated_at_pht: generated_at,
        generated_at_utc: generated_at.with_timezone(&Utc),
        unit: request.unit,
        amount: request.amount,
        count: request.count,
        tag: request.tag.clone(),
        expires_at_pht: expires_at,
        expires_at_utc: expires_at.with_timezone(&Utc),
        expires_at_unix: expires_at.timestamp(),
        timezone: zone.name.clone(),
        keys,
    })
}

/// Convert to the reference zone at whole-second precision.
fn to_zone(now: DateTime<Utc>, zone: &ReferenceZone) -> DateTime<FixedOffset> {
    zone.offset
        .timestamp_opt(now.timestamp(), 0)
        .single()
        .unwrap_or_else(|| now.with_timezone(&zone.offset))
}

/// Create `run_<stamp>`, adding `_2`, `_3`, ... if a run from the same second exists.
fn create_run_dir(output_dir: &Path, generated_at: &DateTime<FixedOffset>) -> Result<PathBuf> {
    let base = format!("run_{}", generated_at.format("%Y%m%d_%H%M%S"));
    let mut attempt = 1u32;
    loop {
        let name = if attempt == 1 {
            base.clone()
        } else {
            format!("{}_{}", base, attempt)
        };
        let path = output_dir.join(name);
        match fs::create_dir(&path) {
            Ok(()) => return Ok(path),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(AppError::io(&path, e)),
        }
    }
}

fn rfc3339(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn write_batch_csv(path: &Path, batch: &BatchRecord) -> Result<()> {
    let generated_at = rfc3339(&batch.generated_at_pht);
    let expires_at = rfc3339(&batch.expires_at_pht);

    write_atomic(path, |w| {
        let mut csv = csv::Writer::from_writer(w);
        for key in &batch.keys {
            csv.serialize(BatchCsvRow {
                key,
                generated_at_pht: generated_at.clone(),
                expires_at_pht: expires_at.clone(),
                expires_at_unix: batch.expires_at_unix,
                unit: batch.unit,
                amount: batch.amount,
                tag: &batch.tag,
            })?;
        }
        csv.flush().map_err(|e| AppError::io(path, e))
    })
}

/// Append to the run index. An unreadable index is logged and started over.
fn append_run_summary(path: &Path, summary: RunSummary) -> Result<()> {
    let mut index: Vec<RunSummary> = match read_json_list(path) {
        Ok(existing) => existing.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read run index, starting fresh");
            Vec::new()
        }
    };
    index.push(summary);
    write_json_atomic(path, &index)
}
