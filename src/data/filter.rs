use chrono::NaiveDate;
use thiserror::Error;

use super::model::{FilterCriteria, FilteredView, UnifiedTable};

// ---------------------------------------------------------------------------
// Filtering: UnifiedTable × FilterCriteria → FilteredView
// ---------------------------------------------------------------------------

/// User-input validation failure: the requested date range is inverted.
/// Surfaced before any filtering so the UI can show a validation message
/// instead of an empty chart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("End date must fall after start date ({start} > {end})")]
pub struct RangeError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Derive the view of `table` matching `criteria`.
///
/// Date and hour bounds are inclusive on both ends; an inverted hour range
/// matches nothing (no wraparound). Never fails on well-formed criteria;
/// no matches yields an empty view.
pub fn filter<'a>(
    table: &'a UnifiedTable,
    criteria: &FilterCriteria,
) -> Result<FilteredView<'a>, RangeError> {
    if criteria.start_date > criteria.end_date {
        return Err(RangeError {
            start: criteria.start_date,
            end: criteria.end_date,
        });
    }

    let indices: Vec<usize> = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, obs)| criteria.matches(obs))
        .map(|(i, _)| i)
        .collect();

    Ok(FilteredView::new(table, indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Observation, MEDIAN_SOURCE};
    use std::collections::BTreeSet;

    fn obs(ts: &str, source: &str) -> Observation {
        Observation {
            timestamp: ts.parse().unwrap(),
            price: 1.0,
            volume: Some(1.0),
            source: source.to_string(),
        }
    }

    fn table() -> UnifiedTable {
        UnifiedTable::from_rows(vec![
            obs("2024-01-10T07:00:00", "alpha"),
            obs("2024-01-10T08:00:00", "alpha"),
            obs("2024-01-10T12:00:00", "beta"),
            obs("2024-01-10T17:00:00", "alpha"),
            obs("2024-01-10T18:00:00", "beta"),
            obs("2024-01-11T12:00:00", MEDIAN_SOURCE),
        ])
    }

    fn criteria(table: &UnifiedTable) -> FilterCriteria {
        FilterCriteria::spanning(table).unwrap()
    }

    #[test]
    fn hour_bounds_are_inclusive() {
        let table = table();
        let mut c = criteria(&table);
        c.start_hour = 8;
        c.end_hour = 17;

        let view = filter(&table, &c).unwrap();
        let hours: Vec<u32> = view
            .rows()
            .map(|o| chrono::Timelike::hour(&o.timestamp))
            .collect();
        // 07:00 and 18:00 sit one unit outside and must be excluded.
        assert_eq!(hours, vec![8, 12, 17, 12]);
    }

    #[test]
    fn inverted_hour_range_matches_nothing() {
        let table = table();
        let mut c = criteria(&table);
        c.start_hour = 18;
        c.end_hour = 6;

        let view = filter(&table, &c).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let table = table();
        let mut c = criteria(&table);
        c.end_date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

        let view = filter(&table, &c).unwrap();
        assert_eq!(view.len(), 5);
    }

    #[test]
    fn source_subset_is_honored() {
        let table = table();
        let mut c = criteria(&table);
        c.selected_sources = BTreeSet::from(["beta".to_string()]);

        let view = filter(&table, &c).unwrap();
        assert!(view.rows().all(|o| o.source == "beta"));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn inverted_date_range_is_a_range_error() {
        let table = table();
        let mut c = criteria(&table);
        c.start_date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        c.end_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // Other criteria values must not matter.
        c.start_hour = 23;
        c.end_hour = 0;
        c.selected_sources.clear();

        let err = filter(&table, &c).unwrap_err();
        assert_eq!(err.start, c.start_date);
        assert_eq!(err.end, c.end_date);
    }

    #[test]
    fn no_matches_is_an_empty_view_not_an_error() {
        let table = table();
        let mut c = criteria(&table);
        c.selected_sources.clear();

        let view = filter(&table, &c).unwrap();
        assert!(view.is_empty());
    }
}
