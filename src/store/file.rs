//! Whole-file JSON persistence.
//!
//! Writes go to a temp file in the target's directory and are renamed over the
//! target, so a reader sees either the old contents or the new ones.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::error::{AppError, Result};

/// Load a JSON array from `path`.
///
/// Returns `Ok(None)` when the file does not exist. A file that exists but does
/// not parse is logged and treated as an empty list.
pub fn read_json_list<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AppError::io(path, e)),
    };

    match serde_json::from_slice(&contents) {
        Ok(items) => Ok(Some(items)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable JSON list");
            Ok(Some(Vec::new()))
        }
    }
}

/// Replace `path` with whatever `write` produces.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir).map_err(|e| AppError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        write(&mut writer)?;
        writer.flush().map_err(|e| AppError::io(tmp.path(), e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| AppError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| AppError::io(path, e.error))?;

    tracing::debug!(path = %path.display(), "Wrote file");
    Ok(())
}

/// Replace `path` with `value` as pretty-printed JSON.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, |w| {
        serde_json::to_writer_pretty(&mut *w, value)?;
        w.write_all(b"\n").map_err(|e| AppError::io(path, e))
    })
}
