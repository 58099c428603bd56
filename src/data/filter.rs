use std::fmt;

use thiserror::Error;

use super::model::Dataset;

/// Number of hour-of-day buckets.
pub const HOURS_PER_DAY: usize = 24;

// ---------------------------------------------------------------------------
// Hour – validated hour-of-day filter parameter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HourError {
    #[error("hour {0} is out of range (expected 0..=23)")]
    OutOfRange(i64),
}

/// An hour of the day in `0..=23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hour(u8);

impl Hour {
    pub fn new(value: u8) -> Result<Self, HourError> {
        if usize::from(value) < HOURS_PER_DAY {
            Ok(Hour(value))
        } else {
            Err(HourError::OutOfRange(i64::from(value)))
        }
    }

    /// Clamp any integer into `0..=23` (slider semantics).
    pub fn clamped(value: i64) -> Self {
        Hour(value.clamp(0, HOURS_PER_DAY as i64 - 1) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// Return indices of rows whose timestamp hour equals `hour`, ascending.
pub fn rows_at_hour(dataset: &Dataset, hour: Hour) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| rec.hour() == hour.get())
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Row counts per hour of day, bucket `i` covering `[i, i + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourHistogram {
    counts: [u64; HOURS_PER_DAY],
}

impl HourHistogram {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut counts = [0u64; HOURS_PER_DAY];
        for rec in &dataset.records {
            counts[usize::from(rec.hour())] += 1;
        }
        HourHistogram { counts }
    }

    pub fn counts(&self) -> &[u64; HOURS_PER_DAY] {
        &self.counts
    }

    pub fn count(&self, hour: Hour) -> u64 {
        self.counts[usize::from(hour.get())]
    }

    /// Sum over all buckets; equals the dataset's row count.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Busiest hour. Ties resolve to the earliest hour; `None` when empty.
    pub fn peak(&self) -> Option<Hour> {
        if self.total() == 0 {
            return None;
        }
        let mut best = 0;
        for (hour, &count) in self.counts.iter().enumerate() {
            if count > self.counts[best] {
                best = hour;
            }
        }
        Some(Hour(best as u8))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::Record;

    fn dataset_with_hours(hours: &[u32]) -> Dataset {
        let records = hours
            .iter()
            .enumerate()
            .map(|(i, &h)| Record {
                timestamp: NaiveDate::from_ymd_opt(2014, 9, 1 + (i % 28) as u32)
                    .and_then(|d| d.and_hms_opt(h, (i % 60) as u32, 0))
                    .unwrap(),
                fields: BTreeMap::new(),
            })
            .collect();
        Dataset::new(vec!["date/time".into()], "date/time".into(), records)
    }

    #[test]
    fn hour_rejects_24() {
        assert_eq!(Hour::new(24), Err(HourError::OutOfRange(24)));
        assert_eq!(Hour::new(255), Err(HourError::OutOfRange(255)));
        assert_eq!(Hour::new(23).map(Hour::get), Ok(23));
    }

    #[test]
    fn hour_clamps() {
        assert_eq!(Hour::clamped(24).get(), 23);
        assert_eq!(Hour::clamped(-5).get(), 0);
        assert_eq!(Hour::clamped(17).get(), 17);
    }

    #[test]
    fn hour_display() {
        assert_eq!(Hour::clamped(7).to_string(), "07:00");
    }

    #[test]
    fn filter_on_empty_dataset_is_empty() {
        let ds = dataset_with_hours(&[]);
        assert!(rows_at_hour(&ds, Hour::clamped(17)).is_empty());
        assert_eq!(HourHistogram::from_dataset(&ds).peak(), None);
    }

    #[test]
    fn filter_picks_matching_rows() {
        let ds = dataset_with_hours(&[17, 3, 17, 18, 16]);
        assert_eq!(rows_at_hour(&ds, Hour::clamped(17)), vec![0, 2]);
        assert!(rows_at_hour(&ds, Hour::clamped(5)).is_empty());
    }

    #[test]
    fn histogram_counts_and_peak() {
        let ds = dataset_with_hours(&[17, 3, 17, 18, 3, 17]);
        let hist = HourHistogram::from_dataset(&ds);
        assert_eq!(hist.count(Hour::clamped(17)), 3);
        assert_eq!(hist.count(Hour::clamped(3)), 2);
        assert_eq!(hist.count(Hour::clamped(0)), 0);
        assert_eq!(hist.peak(), Some(Hour::clamped(17)));
    }

    #[test]
    fn histogram_peak_ties_go_to_earliest_hour() {
        let ds = dataset_with_hours(&[9, 4, 9, 4]);
        assert_eq!(HourHistogram::from_dataset(&ds).peak(), Some(Hour::clamped(4)));
    }

    proptest! {
        #[test]
        fn filtered_rows_match_hour_exactly(
            hours in prop::collection::vec(0u32..24, 0..200),
            h in 0u8..24,
        ) {
            let ds = dataset_with_hours(&hours);
            let hour = Hour::new(h).unwrap();
            let rows = rows_at_hour(&ds, hour);
            for &i in &rows {
                prop_assert_eq!(ds.records[i].hour(), h);
            }
            let expected = hours.iter().filter(|&&x| x == u32::from(h)).count();
            prop_assert_eq!(rows.len(), expected);
        }

        #[test]
        fn histogram_sums_to_row_count(hours in prop::collection::vec(0u32..24, 0..200)) {
            let ds = dataset_with_hours(&hours);
            let hist = HourHistogram::from_dataset(&ds);
            prop_assert_eq!(hist.total(), ds.len() as u64);
            for h in 0..24u8 {
                let hour = Hour::new(h).unwrap();
                prop_assert_eq!(hist.count(hour), rows_at_hour(&ds, hour).len() as u64);
            }
        }
    }
}
