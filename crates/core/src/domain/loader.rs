//! Log file loading
//!
//! The plugin logger writes a banner line, a column header row and then one
//! CSV row per event:
//!
//! ```text
//! === AMNEZIAGAZE VST Real-Time Log Started ===
//! Timestamp,Level,Component,Parameter,Value,Additional_Info
//! 14:02:11.250,WARNING,Distortion,clipping,1.231000,clipped_at_threshold_0.950
//! ```
//!
//! The first line is always discarded. A column header row right after it is
//! skipped, as are `=== ... ===` banner lines. Every remaining row must carry
//! exactly six fields; any malformed row fails the whole load.

use super::record::{LogLevel, LogRecord};
use chrono::{NaiveTime, Timelike};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

pub type Result<T> = std::result::Result<T, LoadError>;

/// Number of comma-separated fields in a data row
pub const FIELD_COUNT: usize = 6;

/// Errors that abort loading a log file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Log file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Log contains no data rows")]
    Empty,

    #[error("Line {line}: expected 6 fields, found {found}")]
    FieldCount { line: u64, found: usize },

    #[error("Line {line}: timestamp '{value}' does not match HH:MM:SS.ffffff")]
    InvalidTimestamp { line: u64, value: String },

    #[error("Line {line}: value '{value}' is not a number")]
    InvalidValue { line: u64, value: String },
}

/// Load and parse a log file from disk
#[instrument(skip(path))]
pub fn load_log_file<P: AsRef<Path>>(path: P) -> Result<Vec<LogRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    info!(path = %path.display(), "Loading log file");
    let text = std::fs::read_to_string(path)?;
    let records = parse_log(&text)?;

    debug!(count = records.len(), "Log file loaded");
    Ok(records)
}

/// Parse a log from any reader
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Vec<LogRecord>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_log(&text)
}

/// Parse the full text of a log
pub fn parse_log(text: &str) -> Result<Vec<LogRecord>> {
    // Everything after the first line
    let body = match text.split_once('\n') {
        Some((_, rest)) => rest,
        None => "",
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'='))
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        // Lines are counted within the body, the discarded first line shifts them by one
        let line = row.position().map(|p| p.line() + 1).unwrap_or_default();

        if index == 0 && is_column_header(&row) {
            debug!(line, "Skipping column header row");
            continue;
        }

        records.push(parse_row(&row, line)?);
    }

    if records.is_empty() {
        return Err(LoadError::Empty);
    }

    Ok(records)
}

fn is_column_header(row: &csv::StringRecord) -> bool {
    row.get(0)
        .map(|field| field.trim().eq_ignore_ascii_case("Timestamp"))
        .unwrap_or(false)
}

fn parse_row(row: &csv::StringRecord, line: u64) -> Result<LogRecord> {
    if row.len() != FIELD_COUNT {
        return Err(LoadError::FieldCount {
            line,
            found: row.len(),
        });
    }

    let raw_timestamp = &row[0];
    let timestamp =
        parse_timestamp(raw_timestamp).ok_or_else(|| LoadError::InvalidTimestamp {
            line,
            value: raw_timestamp.to_string(),
        })?;

    let raw_value = &row[4];
    let value = raw_value
        .trim()
        .parse::<f64>()
        .map_err(|_| LoadError::InvalidValue {
            line,
            value: raw_value.to_string(),
        })?;

    Ok(LogRecord {
        timestamp,
        level: LogLevel::parse(&row[1]),
        component: row[2].to_string(),
        parameter: row[3].to_string(),
        value,
        additional_info: row[5].to_string(),
    })
}

/// Parse `HH:MM:SS.f` with one to six fractional digits. Leap seconds
/// (`SS` = 60) are rejected.
pub fn parse_timestamp(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    let (clock, fraction) = raw.split_once('.')?;

    if clock.len() != 8
        || fraction.is_empty()
        || fraction.len() > 6
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
        .ok()
        .filter(|time| time.nanosecond() < 1_000_000_000)
}
