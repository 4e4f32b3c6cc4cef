use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use thiserror::Error;

use super::model::{Observation, UnifiedTable, MEDIAN_SOURCE, PRICE_SCALE, QUORUM};

/// Name of the single CSV entry expected inside the archive.
pub const CSV_ENTRY: &str = "data.csv";

/// Rows parsed per batch; bounds peak memory of the record buffer.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Header names the CSV must carry (external contract).
pub const REQUIRED_COLUMNS: [&str; 4] = ["Block Timestamp", "Price", "Volume", "Source"];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal load failures. Either kind aborts the whole load; there is never
/// a partial table. Malformed volumes are not errors (see `parse_record`).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The archive or its `data.csv` entry is missing, unreadable, or
    /// lacks a required column.
    #[error("archive error: {0}")]
    Archive(String),
    /// A timestamp or price field failed type conversion.
    #[error("parse error: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an archive into a [`UnifiedTable`] using the default batch size.
pub fn load_archive(path: &Path) -> Result<UnifiedTable, LoadError> {
    load_archive_with_batch_size(path, DEFAULT_BATCH_SIZE)
}

/// Load an archive, parsing `batch_size` CSV rows at a time.
///
/// Pipeline: decompress → parse/coerce per batch → concatenate → quorum
/// filter (global, so the result is independent of `batch_size`) → median
/// synthesis → unified table.
pub fn load_archive_with_batch_size(
    path: &Path,
    batch_size: usize,
) -> Result<UnifiedTable, LoadError> {
    let text = read_csv_entry(path)?;

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let columns = locate_columns(&mut reader)?;

    // Parse in fixed-size batches. Quorum filtering is deliberately NOT
    // done here: a timestamp's rows may straddle a batch boundary, and the
    // keep-or-drop decision must see the whole group.
    let mut rows: Vec<Observation> = Vec::new();
    let mut batch: Vec<StringRecord> = Vec::with_capacity(batch_size.max(1));
    let mut row_no = 0usize;

    for result in reader.records() {
        let record =
            result.map_err(|e| LoadError::Parse(format!("CSV row {row_no}: {e}")))?;
        batch.push(record);
        if batch.len() >= batch_size.max(1) {
            parse_batch(&columns, &batch, row_no + 1 - batch.len(), &mut rows)?;
            batch.clear();
        }
        row_no += 1;
    }
    if !batch.is_empty() {
        parse_batch(&columns, &batch, row_no - batch.len(), &mut rows)?;
    }

    apply_quorum_filter(&mut rows);
    let medians = synthesize_medians(&rows);
    rows.extend(medians);

    Ok(UnifiedTable::from_rows(rows))
}

// ---------------------------------------------------------------------------
// Archive handling
// ---------------------------------------------------------------------------

/// Open the zip archive and decompress its `data.csv` entry to text.
fn read_csv_entry(path: &Path) -> Result<String, LoadError> {
    let file = File::open(path).map_err(|e| {
        LoadError::Archive(format!("cannot open archive {}: {e}", path.display()))
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        LoadError::Archive(format!("{} is not a readable zip archive: {e}", path.display()))
    })?;
    let mut entry = archive.by_name(CSV_ENTRY).map_err(|e| {
        LoadError::Archive(format!("archive {} has no {CSV_ENTRY} entry: {e}", path.display()))
    })?;

    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|e| LoadError::Archive(format!("cannot decompress {CSV_ENTRY}: {e}")))?;
    Ok(text)
}

/// Column indices of the required headers.
struct Columns {
    timestamp: usize,
    price: usize,
    volume: usize,
    source: usize,
}

fn locate_columns(reader: &mut csv::Reader<&[u8]>) -> Result<Columns, LoadError> {
    let headers = reader
        .headers()
        .map_err(|e| LoadError::Archive(format!("cannot read CSV headers: {e}")))?;

    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::Archive(format!("{CSV_ENTRY} is missing column '{name}'")))
    };

    Ok(Columns {
        timestamp: position(REQUIRED_COLUMNS[0])?,
        price: position(REQUIRED_COLUMNS[1])?,
        volume: position(REQUIRED_COLUMNS[2])?,
        source: position(REQUIRED_COLUMNS[3])?,
    })
}

// ---------------------------------------------------------------------------
// Row parsing / type coercion
// ---------------------------------------------------------------------------

fn parse_batch(
    columns: &Columns,
    batch: &[StringRecord],
    first_row: usize,
    out: &mut Vec<Observation>,
) -> Result<(), LoadError> {
    out.reserve(batch.len());
    for (offset, record) in batch.iter().enumerate() {
        out.push(parse_record(columns, record, first_row + offset)?);
    }
    Ok(())
}

fn parse_record(
    columns: &Columns,
    record: &StringRecord,
    row_no: usize,
) -> Result<Observation, LoadError> {
    let ts_field = record.get(columns.timestamp).unwrap_or("").trim();
    let timestamp = parse_timestamp(ts_field).ok_or_else(|| {
        LoadError::Parse(format!("row {row_no}: invalid timestamp '{ts_field}'"))
    })?;

    let price_field = record.get(columns.price).unwrap_or("").trim();
    let raw_price: f64 = price_field.parse().map_err(|_| {
        LoadError::Parse(format!("row {row_no}: invalid price '{price_field}'"))
    })?;

    // "coerce" semantics: a malformed volume becomes an explicit missing
    // value and the row is kept.
    let volume_field = record.get(columns.volume).unwrap_or("").trim();
    let volume = match volume_field.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            if !volume_field.is_empty() {
                log::warn!("row {row_no}: non-numeric volume '{volume_field}', marking missing");
            }
            None
        }
    };

    Ok(Observation {
        timestamp,
        price: raw_price / PRICE_SCALE,
        volume,
        source: record.get(columns.source).unwrap_or("").to_string(),
    })
}

/// Parse the ISO-like timestamp formats found in these archives:
/// space- or `T`-separated date-times with optional fractional seconds,
/// RFC 3339 with offset (normalized to UTC), and bare dates (midnight).
pub(crate) fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    None
}

// ---------------------------------------------------------------------------
// Quorum filter + median synthesis
// ---------------------------------------------------------------------------

/// Drop every row whose timestamp has fewer than [`QUORUM`] observations.
/// Group-level predicate: a timestamp's rows survive or vanish together.
fn apply_quorum_filter(rows: &mut Vec<Observation>) {
    let mut counts: HashMap<NaiveDateTime, usize> = HashMap::new();
    for obs in rows.iter() {
        *counts.entry(obs.timestamp).or_insert(0) += 1;
    }
    rows.retain(|obs| counts[&obs.timestamp] >= QUORUM);
}

/// One median row per surviving timestamp, in ascending timestamp order.
fn synthesize_medians(rows: &[Observation]) -> Vec<Observation> {
    let mut groups: BTreeMap<NaiveDateTime, Vec<f64>> = BTreeMap::new();
    for obs in rows {
        groups.entry(obs.timestamp).or_default().push(obs.price);
    }

    groups
        .into_iter()
        .map(|(timestamp, mut prices)| Observation {
            timestamp,
            price: median(&mut prices),
            volume: None,
            source: MEDIAN_SOURCE.to_string(),
        })
        .collect()
}

/// Statistical median. `values` must be non-empty; even counts average the
/// two middle values.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
