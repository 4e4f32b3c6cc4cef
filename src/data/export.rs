use anyhow::{Context, Result};

use super::loader::REQUIRED_COLUMNS;
use super::model::FilteredView;

// ---------------------------------------------------------------------------
// CSV export of a FilteredView
// ---------------------------------------------------------------------------

/// Timestamp layout used for export; fractional seconds only when present.
/// Re-parsable by the loader's timestamp conventions.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Serialize the view to CSV text: UTF-8, header row in unified-table
/// column order, one row per entry, no index column. Numeric fields use
/// shortest round-trip formatting; a missing volume is an empty field.
pub fn to_csv(view: &FilteredView<'_>) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(REQUIRED_COLUMNS)
        .context("writing CSV header")?;

    for obs in view.rows() {
        writer
            .write_record([
                obs.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                obs.price.to_string(),
                obs.volume.map(|v| v.to_string()).unwrap_or_default(),
                obs.source.clone(),
            ])
            .context("writing CSV row")?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("flushing CSV writer")?;
    String::from_utf8(bytes).context("exported CSV is not UTF-8")
}
