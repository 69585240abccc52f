//! Reading log entries from the user's activity log.
//!
//! JSONL files are read under a shared lock so a concurrent writer never
//! hands us a half-written line. CSV exports are read with headers
//! `substance,dose_value,dose_unit,route,taken_at`. Malformed records are
//! logged and skipped; they never abort the batch.

use crate::types::parse_dose;
use crate::{Error, LogEntry, Result};
use csv::ReaderBuilder;
use fs2::FileExt;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// CSV row format for exported logs
#[derive(Debug, Deserialize)]
struct CsvRow {
    substance: String,
    dose_value: Option<String>,
    dose_unit: Option<String>,
    route: Option<String>,
    taken_at: String,
}

impl From<CsvRow> for LogEntry {
    fn from(row: CsvRow) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        LogEntry {
            substance: row.substance,
            dose_value: row.dose_value.as_deref().and_then(parse_dose),
            dose_unit: non_empty(row.dose_unit),
            route: non_empty(row.route),
            taken_at: row.taken_at,
        }
    }
}

/// Load entries from `path`, picking the format from its extension.
///
/// A missing file is an empty log.
pub fn load_entries(path: &Path) -> Result<Vec<LogEntry>> {
    if !path.exists() {
        tracing::info!("No log file at {:?}, treating as empty", path);
        return Ok(Vec::new());
    }

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        read_csv(path)
    } else {
        read_jsonl(path)
    }
}

/// Read one JSON entry per line.
///
/// Lines are split on raw bytes so that invalid UTF-8 only costs that line.
pub fn read_jsonl(path: &Path) -> Result<Vec<LogEntry>> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.split(b'\n').enumerate() {
        let line = match line_result {
            Ok(line) => line,
            Err(e) => {
                let _ = file.unlock();
                return Err(Error::LogSource(format!(
                    "{}: read failed at line {}: {}",
                    path.display(),
                    line_num + 1,
                    e
                )));
            }
        };
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<LogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Skipping log line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} entries from {:?}", entries.len(), path);
    Ok(entries)
}

/// Read a CSV export with a header row.
pub fn read_csv(path: &Path) -> Result<Vec<LogEntry>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut entries = Vec::new();
    for (row_num, result) in reader.deserialize::<CsvRow>().enumerate() {
        match result {
            Ok(row) => entries.push(LogEntry::from(row)),
            Err(e) => {
                tracing::warn!("Skipping CSV row {}: {}", row_num + 1, e);
            }
        }
    }

    tracing::debug!("Read {} entries from {:?}", entries.len(), path);
    Ok(entries)
}
