// Integration tests for the memoized loader: real gzip files on disk, the
// hour filter and histogram on top of what was loaded, and the cache contract.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::write::GzEncoder;
use flate2::Compression;

use pickup_explorer::data::cache::CacheOutcome;
use pickup_explorer::data::filter::{rows_at_hour, Hour, HourHistogram};
use pickup_explorer::data::loader::{load_data, CachedLoader, DataSource};
use pickup_explorer::data::model::CellValue;

// ===========================================================================
// Test helpers
// ===========================================================================

/// CSV text with mixed-case headers; row `i` is at hour `i % 24`.
fn pickups_csv(rows: usize) -> String {
    let mut csv = String::from("Date/Time,Lat,Lon,BASE\n");
    for i in 0..rows {
        csv.push_str(&format!(
            "9/{}/2014 {}:{:02}:00,40.{:04},-73.{:04},B0{}\n",
            1 + i % 28,
            i % 24,
            i % 60,
            i % 10_000,
            (i * 7) % 10_000,
            2512 + i % 5
        ));
    }
    csv
}

fn write_gz(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

// ===========================================================================
// Loading
// ===========================================================================

#[test]
fn loads_gzip_with_lowercase_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "pickups.csv.gz", &pickups_csv(50));

    let ds = load_data(&DataSource::Local(path), None, "date/time").unwrap();
    assert_eq!(ds.len(), 50);
    assert_eq!(ds.columns, vec!["date/time", "lat", "lon", "base"]);
    assert!(ds.columns.iter().all(|c| *c == c.to_lowercase()));
    assert_eq!(
        ds.records[0].fields["base"],
        CellValue::String("B02512".into())
    );
}

#[test]
fn plain_csv_is_read_as_is() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pickups.csv");
    std::fs::write(&path, pickups_csv(30)).unwrap();

    let ds = load_data(&DataSource::Local(path), Some(10), "date/time").unwrap();
    assert_eq!(ds.len(), 10);
}

#[test]
fn ten_thousand_rows_filtered_at_17() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "pickups.csv.gz", &pickups_csv(12_000));

    let ds = load_data(&DataSource::Local(path), Some(10_000), "date/time").unwrap();
    assert_eq!(ds.len(), 10_000);

    let rows = rows_at_hour(&ds, Hour::new(17).unwrap());
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|&i| ds.records[i].hour() == 17));
    assert_eq!(rows.len(), (0..10_000).filter(|i| i % 24 == 17).count());

    let hist = HourHistogram::from_dataset(&ds);
    assert_eq!(hist.total(), 10_000);
    assert_eq!(hist.count(Hour::new(17).unwrap()), rows.len() as u64);

    assert!(Hour::new(24).is_err());
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let src = DataSource::Local(dir.path().join("absent.csv.gz"));
    let err = load_data(&src, None, "date/time").unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv.gz"));
}

// ===========================================================================
// Memoization
// ===========================================================================

#[test]
fn repeated_loads_are_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "pickups.csv.gz", &pickups_csv(200));
    let src = DataSource::Local(path);
    let mut loader = CachedLoader::new();

    let first = loader.load(&src, Some(100), "date/time").unwrap();
    let second = loader.load(&src, Some(100), "date/time").unwrap();

    assert_eq!(first.outcome(), CacheOutcome::Miss);
    assert_eq!(second.outcome(), CacheOutcome::Hit);
    assert!(Arc::ptr_eq(&first.shared(), &second.shared()));
    assert_eq!(*first, *second);
    assert_eq!(loader.stats().misses, 1);
    assert_eq!(loader.stats().hits, 1);
}

#[test]
fn different_row_count_is_a_separate_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "pickups.csv.gz", &pickups_csv(200));
    let src = DataSource::Local(path);
    let mut loader = CachedLoader::new();

    let small = loader.load(&src, Some(10), "date/time").unwrap();
    let large = loader.load(&src, Some(100), "date/time").unwrap();
    assert_eq!(small.len(), 10);
    assert_eq!(large.len(), 100);
    assert_eq!(large.outcome(), CacheOutcome::Miss);
    assert_eq!(loader.cached_entries(), 2);
}

#[test]
fn changed_file_invalidates_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "pickups.csv.gz", &pickups_csv(20));
    let src = DataSource::Local(path.clone());
    let mut loader = CachedLoader::new();

    let before = loader.load(&src, None, "date/time").unwrap();
    assert_eq!(before.len(), 20);

    write_gz(dir.path(), "pickups.csv.gz", &pickups_csv(400));
    let after = loader.load(&src, None, "date/time").unwrap();
    assert_eq!(after.outcome(), CacheOutcome::Miss);
    assert_eq!(after.len(), 400);
}

#[test]
fn failed_loads_are_retried_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("later.csv");
    let src = DataSource::Local(path.clone());
    let mut loader = CachedLoader::new();

    assert!(loader.load(&src, None, "date/time").is_err());
    assert_eq!(loader.cached_entries(), 0);

    std::fs::write(&path, pickups_csv(5)).unwrap();
    let ds = loader.load(&src, None, "date/time").unwrap();
    assert_eq!(ds.len(), 5);
}

#[test]
fn mutating_a_returned_dataset_leaves_cache_intact() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "pickups.csv.gz", &pickups_csv(48));
    let src = DataSource::Local(path);
    let mut loader = CachedLoader::new();

    let mut handle = loader.load(&src, None, "date/time").unwrap();
    handle.make_mut().records.truncate(1);
    handle.make_mut().columns[0] = "clobbered".into();
    assert_eq!(handle.len(), 1);

    let again = loader.load(&src, None, "date/time").unwrap();
    assert_eq!(again.outcome(), CacheOutcome::Hit);
    assert!(again.warning().is_none());
    assert_eq!(again.len(), 48);
    assert_eq!(again.columns[0], "date/time");
}

#[test]
fn clear_drops_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "pickups.csv.gz", &pickups_csv(10));
    let src = DataSource::Local(path);
    let mut loader = CachedLoader::new();

    loader.load(&src, None, "date/time").unwrap();
    loader.clear();
    assert_eq!(loader.cached_entries(), 0);
    let reloaded = loader.load(&src, None, "date/time").unwrap();
    assert_eq!(reloaded.outcome(), CacheOutcome::Miss);
}
