//! Bulk upload decoding.
//!
//! One parser per input shape, selected by a format descriptor derived from
//! the file name. Both shapes produce the same per-record output: a sequence
//! of raw field bundles (or per-record failures) in input order, from a
//! single pass over the content. Structural problems with the file itself
//! (missing name, empty content, unsupported shape) fail before any record
//! is produced.

use capture_core::{Error, RawTrade, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

/// Columns of the delimited-text shape, in fixed order:
/// account, security, type, amount, timestamp.
const CSV_COLUMNS: usize = 5;

/// Supported bulk-upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Delimited text with a header line.
    Csv,
    /// Structured document: one object or a list of objects.
    Json,
}

impl FileFormat {
    /// Dispatch on the upload's file extension.
    pub fn from_filename(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::MissingFilename);
        }
        let ext = match name.rsplit_once('.') {
            Some((_, ext)) => ext.to_lowercase(),
            None => return Err(Error::UnsupportedFormat(name.to_string())),
        };
        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "json" => Ok(FileFormat::Json),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Decode an uploaded file into per-record outcomes.
///
/// The outer `Result` carries structural errors; the inner ones carry
/// per-record parse failures that skip that record only.
pub fn parse(format: FileFormat, bytes: &[u8]) -> Result<Vec<Result<RawTrade>>> {
    if bytes.is_empty() {
        return Err(Error::EmptyFile);
    }
    match format {
        FileFormat::Csv => parse_csv(bytes),
        FileFormat::Json => parse_json(bytes),
    }
}

/// Delimited-text shape. The first line is a header and is discarded; lines
/// with fewer than five fields are skipped without producing an outcome.
/// A malformed amount or timestamp rejects that record and the batch
/// continues.
fn parse_csv(bytes: &[u8]) -> Result<Vec<Result<RawTrade>>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::parse("file is not valid UTF-8"))?;

    let mut lines = text.lines();
    if lines.next().is_none() {
        return Err(Error::EmptyFile);
    }

    let mut records = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2; // 1-based, after the header
        if line.trim().is_empty() {
            continue;
        }
        // split keeps empty trailing fields
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < CSV_COLUMNS {
            debug!(line = line_no, fields = parts.len(), "skipping short line");
            continue;
        }
        records.push(parse_csv_line(&parts, line_no));
    }
    Ok(records)
}

fn parse_csv_line(parts: &[&str], line_no: usize) -> Result<RawTrade> {
    let amount: f64 = parts[3]
        .trim()
        .parse()
        .map_err(|_| Error::parse(format!("invalid amount at line {line_no}")))?;
    let timestamp = parse_timestamp(parts[4].trim())
        .ok_or_else(|| Error::parse(format!("invalid timestamp at line {line_no}")))?;

    Ok(RawTrade {
        account_number: parts[0].trim().to_string(),
        security_id: parts[1].trim().to_string(),
        trade_type: parts[2].trim().to_string(),
        amount: Some(amount),
        timestamp: Some(timestamp),
    })
}

/// Structured-document shape: a single object or a homogeneous list of
/// objects with named fields. Any other top-level shape is a structural
/// error. A malformed record inside a list rejects that record only.
fn parse_json(bytes: &[u8]) -> Result<Vec<Result<RawTrade>>> {
    let root: Value = serde_json::from_slice(bytes)?;
    match root {
        Value::Object(_) => Ok(vec![decode_record(root, 0)]),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| decode_record(item, idx))
            .collect()),
        _ => Err(Error::UnsupportedShape),
    }
}

fn decode_record(value: Value, idx: usize) -> Result<RawTrade> {
    // Error message carries the index only, never field contents.
    serde_json::from_value(value)
        .map_err(|_| Error::parse(format!("invalid record at index {idx}")))
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
