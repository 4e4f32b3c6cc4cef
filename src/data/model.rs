use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// Raw `Price` column values are fixed-point integers scaled by 10^8.
pub const PRICE_SCALE: f64 = 100_000_000.0;

/// Minimum number of observations a timestamp needs across all sources
/// for its rows to survive the quorum filter.
pub const QUORUM: usize = 5;

/// Source label of the synthesized per-timestamp median rows.
pub const MEDIAN_SOURCE: &str = "Median";

// ---------------------------------------------------------------------------
// Observation – one row of the unified table
// ---------------------------------------------------------------------------

/// A single normalized price observation (one CSV row after type coercion),
/// or a synthesized median row when `source == MEDIAN_SOURCE`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Block timestamp; parse failures abort the whole load.
    pub timestamp: NaiveDateTime,
    /// Price already divided by [`PRICE_SCALE`].
    pub price: f64,
    /// Traded volume. `None` marks a value that failed numeric coercion
    /// (the row itself is kept) and every median row.
    pub volume: Option<f64>,
    /// Reporting source identifier.
    pub source: String,
}

// ---------------------------------------------------------------------------
// UnifiedTable – the complete aggregated dataset
// ---------------------------------------------------------------------------

/// The aggregator's sole output: quorum-filtered observations followed by
/// one median row per timestamp. Immutable after construction; the UI and
/// export only ever borrow filtered views of it.
#[derive(Debug, Clone)]
pub struct UnifiedTable {
    /// All rows, in deterministic order (input order, then medians by
    /// ascending timestamp).
    pub rows: Vec<Observation>,
    /// Sorted distinct `source` values, including [`MEDIAN_SOURCE`].
    pub sources: Vec<String>,
}

impl UnifiedTable {
    /// Build the source index from the finished row set.
    pub fn from_rows(rows: Vec<Observation>) -> Self {
        let sources: BTreeSet<String> = rows.iter().map(|o| o.source.clone()).collect();
        UnifiedTable {
            rows,
            sources: sources.into_iter().collect(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest calendar dates present, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.rows.iter().map(|o| o.timestamp.date());
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some((min, max))
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria – one user interaction's worth of constraints
// ---------------------------------------------------------------------------

/// The user's current date range, hour-of-day range, and source selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive hour bounds, 0–23. `start_hour > end_hour` is not a
    /// wraparound range; it simply matches nothing.
    pub start_hour: u32,
    pub end_hour: u32,
    /// Sources to keep. Defaults to every source in the table.
    pub selected_sources: BTreeSet<String>,
}

impl FilterCriteria {
    /// Default criteria spanning the whole table: full date range, all
    /// hours, every observed source selected (median included). `None`
    /// for an empty table.
    pub fn spanning(table: &UnifiedTable) -> Option<Self> {
        let (start_date, end_date) = table.date_range()?;
        Some(FilterCriteria {
            start_date,
            end_date,
            start_hour: 0,
            end_hour: 23,
            selected_sources: table.sources.iter().cloned().collect(),
        })
    }

    /// Whether a row satisfies every constraint.
    pub fn matches(&self, obs: &Observation) -> bool {
        let date = obs.timestamp.date();
        let hour = obs.timestamp.hour();
        date >= self.start_date
            && date <= self.end_date
            && hour >= self.start_hour
            && hour <= self.end_hour
            && self.selected_sources.contains(&obs.source)
    }
}

// ---------------------------------------------------------------------------
// FilteredView – borrowed, read-only subset of a UnifiedTable
// ---------------------------------------------------------------------------

/// The rows matching one [`FilterCriteria`], as indices into the backing
/// table. Shared unchanged by the plot, the table widget, and CSV export.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a UnifiedTable,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub(crate) fn new(table: &'a UnifiedTable, indices: Vec<usize>) -> Self {
        FilteredView { table, indices }
    }

    /// Matching rows in table order.
    pub fn rows(&self) -> impl Iterator<Item = &'a Observation> + '_ {
        self.indices.iter().map(|&i| &self.table.rows[i])
    }

    /// Give up the borrow and keep only the indices.
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(ts: &str, price: f64, source: &str) -> Observation {
        Observation {
            timestamp: ts.parse().unwrap(),
            price,
            volume: None,
            source: source.to_string(),
        }
    }

    #[test]
    fn source_index_is_sorted_and_distinct() {
        let table = UnifiedTable::from_rows(vec![
            obs("2024-01-01T00:00:00", 1.0, "beta"),
            obs("2024-01-01T00:00:00", 2.0, "alpha"),
            obs("2024-01-01T01:00:00", 3.0, "beta"),
        ]);
        assert_eq!(table.sources, vec!["alpha", "beta"]);
    }

    #[test]
    fn spanning_criteria_select_all_sources_including_median() {
        let table = UnifiedTable::from_rows(vec![
            obs("2024-01-02T05:00:00", 1.0, "alpha"),
            obs("2024-01-05T20:00:00", 2.0, "beta"),
            obs("2024-01-02T05:00:00", 1.5, MEDIAN_SOURCE),
        ]);
        let criteria = FilterCriteria::spanning(&table).unwrap();
        assert_eq!(
            criteria.start_date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(
            criteria.end_date,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
        assert_eq!(criteria.start_hour, 0);
        assert_eq!(criteria.end_hour, 23);
        assert!(criteria.selected_sources.contains(MEDIAN_SOURCE));
        assert_eq!(criteria.selected_sources.len(), table.sources.len());
    }

    #[test]
    fn spanning_criteria_absent_for_empty_table() {
        assert!(FilterCriteria::spanning(&UnifiedTable::from_rows(Vec::new())).is_none());
    }
}
