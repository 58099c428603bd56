use std::collections::BTreeMap;
use std::fmt;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use flate2::read::GzDecoder;

use super::cache::{fingerprint, Cached, CacheKey, CacheStats, Memo};
use super::model::{CellValue, Dataset, Record};

/// Bumped whenever the parsing rules below change, so memoized datasets
/// produced by older rules are never served.
pub const LOADER_REVISION: u32 = 1;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Timestamp layouts tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where the CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// Downloaded over HTTP(S).
    Remote(String),
    /// Read from the local file system.
    Local(PathBuf),
}

impl FromStr for DataSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(DataSource::Remote(s.to_string()))
        } else {
            Ok(DataSource::Local(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote(url) => write!(f, "{url}"),
            DataSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

impl DataSource {
    /// Identity of the data this source currently points at.
    ///
    /// Remote sources are identified by URL only. Local files also fold in
    /// length and modification time, so editing the file invalidates the
    /// cache.
    pub fn fingerprint(&self) -> u64 {
        match self {
            DataSource::Remote(url) => fingerprint(&("remote", url)),
            DataSource::Local(path) => {
                let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
                let meta = std::fs::metadata(path).ok();
                let len = meta.as_ref().map(|m| m.len());
                let modified = meta
                    .and_then(|m| m.modified().ok())
                    .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok());
                fingerprint(&("local", canonical, len, modified))
            }
        }
    }

    /// Fetch the raw (possibly compressed) bytes.
    fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            DataSource::Remote(url) => {
                log::info!("Downloading {url}");
                let response = reqwest::blocking::get(url)
                    .with_context(|| format!("requesting {url}"))?
                    .error_for_status()
                    .with_context(|| format!("downloading {url}"))?;
                let bytes = response
                    .bytes()
                    .with_context(|| format!("reading response body from {url}"))?;
                Ok(bytes.to_vec())
            }
            DataSource::Local(path) => {
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))
            }
        }
    }

    fn looks_gzipped(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(&GZIP_MAGIC)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load up to `nrows` rows (all when `None`) from `source`, lower-case the
/// column names and parse `date_column` into timestamps.
pub fn load_data(
    source: &DataSource,
    nrows: Option<usize>,
    date_column: &str,
) -> Result<Dataset> {
    let bytes = source.read_bytes()?;
    let reader: Box<dyn Read> = if source.looks_gzipped(&bytes) {
        log::debug!("{source}: gzip stream");
        Box::new(GzDecoder::new(Cursor::new(bytes)))
    } else {
        Box::new(Cursor::new(bytes))
    };
    let dataset = parse_csv(reader, nrows, date_column)
        .with_context(|| format!("parsing CSV from {source}"))?;
    log::info!(
        "Loaded {} rows with columns {:?} from {source}",
        dataset.len(),
        dataset.columns
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parse CSV with a header row. All columns except `date_column` are
/// type-guessed per cell.
///
/// Header names must stay distinct after lower-casing. Errors name data rows
/// from 1 together with their file line.
pub fn parse_csv<R: Read>(
    reader: R,
    nrows: Option<usize>,
    date_column: &str,
) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("reading CSV headers")?.clone();
    let columns = lowercase_headers(&headers)?;

    let date_column = date_column.to_lowercase();
    let date_idx = columns
        .iter()
        .position(|h| *h == date_column)
        .with_context(|| format!("CSV missing '{date_column}' column (found {columns:?})"))?;

    let limit = nrows.unwrap_or(usize::MAX);
    let mut records = Vec::new();

    for (row_no, result) in (1..).zip(reader.records().take(limit)) {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let line = record.position().map_or(0, |p| p.line());

        let raw_ts = record.get(date_idx).unwrap_or("");
        let timestamp = parse_timestamp(raw_ts).with_context(|| {
            format!("CSV row {row_no} (line {line}): '{raw_ts}' is not a valid {date_column} value")
        })?;

        let fields = columns
            .iter()
            .zip(record.iter())
            .enumerate()
            .filter(|(col_idx, _)| *col_idx != date_idx)
            .map(|(_, (name, value))| (name.clone(), guess_cell_type(value)))
            .collect::<BTreeMap<_, _>>();

        records.push(Record { timestamp, fields });
    }

    Ok(Dataset::new(columns, date_column, records))
}

/// Lower-case every header, refusing two headers that collapse to one name.
fn lowercase_headers(headers: &csv::StringRecord) -> Result<Vec<String>> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut columns = Vec::with_capacity(headers.len());
    for original in headers.iter() {
        let name = original.to_lowercase();
        if let Some(first) = seen.get(&name) {
            bail!("CSV headers '{first}' and '{original}' both become column '{name}'");
        }
        seen.insert(name.clone(), original);
        columns.push(name);
    }
    Ok(columns)
}

/// Parse a timestamp in any of the supported layouts.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .with_context(|| format!("unrecognised timestamp '{s}'"))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    if let Ok(dt) = parse_timestamp(s) {
        return CellValue::DateTime(dt);
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Memoized loader
// ---------------------------------------------------------------------------

/// [`load_data`] behind a [`Memo`]: repeated calls with the same source
/// contents, row count and date column return the same shared dataset.
pub struct CachedLoader {
    memo: Memo<Dataset>,
}

impl Default for CachedLoader {
    fn default() -> Self {
        Self { memo: Memo::new() }
    }
}

impl CachedLoader {
    const FUNCTION: &'static str = "load_data";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(source: &DataSource, nrows: Option<usize>, date_column: &str) -> CacheKey {
        let logic = (
            Self::FUNCTION,
            env!("CARGO_PKG_VERSION"),
            LOADER_REVISION,
            TIMESTAMP_FORMATS,
        );
        CacheKey::new(
            Self::FUNCTION,
            &logic,
            source.fingerprint(),
            &(nrows, date_column.to_lowercase()),
        )
    }

    pub fn load(
        &mut self,
        source: &DataSource,
        nrows: Option<usize>,
        date_column: &str,
    ) -> Result<Cached<Dataset>> {
        let key = Self::key(source, nrows, date_column);
        self.memo
            .get_or_try_insert_with(key, || load_data(source, nrows, date_column))
    }

    /// Whether a load with these arguments would be served from the cache.
    pub fn is_cached(&self, source: &DataSource, nrows: Option<usize>, date_column: &str) -> bool {
        self.memo.contains(&Self::key(source, nrows, date_column))
    }

    pub fn stats(&self) -> CacheStats {
        self.memo.stats()
    }

    pub fn cached_entries(&self) -> usize {
        self.memo.len()
    }

    pub fn clear(&mut self) {
        log::info!("Clearing {} cached dataset(s)", self.memo.len());
        self.memo.clear();
    }
}
