use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDateTime, Timelike};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a non-timestamp column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value guessed from the CSV text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Null,
}

// Floats hash by bit pattern so a whole dataset can be fingerprinted.
impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::DateTime(dt) => dt.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` (used for coordinates).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// A single pickup (one CSV row).
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct Record {
    /// Parsed value of the dataset's timestamp column.
    pub timestamp: NaiveDateTime,
    /// Every other column: column_name → value.
    pub fields: BTreeMap<String, CellValue>,
}

impl Record {
    /// Hour-of-day component of the timestamp, `0..=23`.
    pub fn hour(&self) -> u8 {
        self.timestamp.hour() as u8
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Column names that can carry a latitude, in lookup order.
const LATITUDE_COLUMNS: &[&str] = &["lat", "latitude"];
/// Column names that can carry a longitude, in lookup order.
const LONGITUDE_COLUMNS: &[&str] = &["lon", "lng", "longitude"];

/// The parsed dataset. Column names are lower-case.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct Dataset {
    /// Column names in header order, timestamp column included.
    pub columns: Vec<String>,
    /// Name of the column parsed into [`Record::timestamp`].
    pub timestamp_column: String,
    /// All rows.
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, timestamp_column: String, records: Vec<Record>) -> Self {
        Dataset {
            columns,
            timestamp_column,
            records,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The value of `column` in row `row`, with the timestamp column
    /// surfaced as [`CellValue::DateTime`].
    pub fn cell(&self, row: usize, column: &str) -> Option<CellValue> {
        let record = self.records.get(row)?;
        if column == self.timestamp_column {
            return Some(CellValue::DateTime(record.timestamp));
        }
        record.fields.get(column).cloned()
    }

    /// Names of the latitude and longitude columns, if the dataset has both.
    pub fn coordinate_columns(&self) -> Option<(&str, &str)> {
        let find = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|c| self.columns.iter().find(|col| col.as_str() == *c))
                .map(String::as_str)
        };
        Some((find(LATITUDE_COLUMNS)?, find(LONGITUDE_COLUMNS)?))
    }

    /// `[lon, lat]` of row `row`, for plotting with longitude on the x axis.
    pub fn coordinates(&self, row: usize) -> Option<[f64; 2]> {
        let (lat_col, lon_col) = self.coordinate_columns()?;
        let record = self.records.get(row)?;
        let lat = record.fields.get(lat_col)?.as_f64()?;
        let lon = record.fields.get(lon_col)?.as_f64()?;
        Some([lon, lat])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(hour: u32, lat: f64, lon: f64) -> Record {
        let timestamp = NaiveDate::from_ymd_opt(2014, 9, 1)
            .and_then(|d| d.and_hms_opt(hour, 1, 0))
            .unwrap();
        let mut fields = BTreeMap::new();
        fields.insert("lat".to_string(), CellValue::Float(lat));
        fields.insert("lon".to_string(), CellValue::Float(lon));
        fields.insert("base".to_string(), CellValue::String("B02512".into()));
        Record { timestamp, fields }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["date/time".into(), "lat".into(), "lon".into(), "base".into()],
            "date/time".into(),
            vec![record(0, 40.2201, -74.0021), record(17, 40.75, -73.99)],
        )
    }

    #[test]
    fn record_hour_comes_from_timestamp() {
        assert_eq!(record(17, 0.0, 0.0).hour(), 17);
        assert_eq!(record(0, 0.0, 0.0).hour(), 0);
    }

    #[test]
    fn cell_surfaces_timestamp_column() {
        let ds = dataset();
        match ds.cell(1, "date/time") {
            Some(CellValue::DateTime(dt)) => assert_eq!(dt.hour(), 17),
            other => panic!("unexpected cell {other:?}"),
        }
        assert_eq!(ds.cell(0, "base"), Some(CellValue::String("B02512".into())));
        assert_eq!(ds.cell(0, "missing"), None);
        assert_eq!(ds.cell(5, "base"), None);
    }

    #[test]
    fn coordinates_are_lon_lat() {
        let ds = dataset();
        assert_eq!(ds.coordinate_columns(), Some(("lat", "lon")));
        assert_eq!(ds.coordinates(0), Some([-74.0021, 40.2201]));
    }

    #[test]
    fn no_coordinates_without_both_columns() {
        let mut ds = dataset();
        ds.columns.retain(|c| c != "lon");
        assert_eq!(ds.coordinate_columns(), None);
        assert_eq!(ds.coordinates(0), None);
    }

    #[test]
    fn display_formats_cells() {
        assert_eq!(CellValue::Float(40.5).to_string(), "40.5000");
        assert_eq!(CellValue::Null.to_string(), "<null>");
    }
}
