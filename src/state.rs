use std::sync::Arc;

use crate::config::AppConfig;
use crate::data::cache::{CacheOutcome, CacheStats};
use crate::data::filter::{rows_at_hour, Hour, HourHistogram};
use crate::data::loader::{CachedLoader, DataSource};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Load status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing requested yet.
    Idle,
    /// A load was requested and runs on the next frame.
    Pending,
    /// Last load succeeded; `cached` tells whether it was served from the memo.
    Done { cached: bool },
    /// Last load failed.
    Failed(String),
}

impl LoadStatus {
    pub fn message(&self) -> Option<String> {
        match self {
            LoadStatus::Idle => None,
            LoadStatus::Pending => Some("Loading data…".into()),
            LoadStatus::Done { cached: false } => Some("Done!".into()),
            LoadStatus::Done { cached: true } => Some("Done! (using cache)".into()),
            LoadStatus::Failed(err) => Some(format!("Error: {err}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub source: DataSource,
    pub nrows: Option<usize>,
    pub date_column: String,

    /// Row-count field being edited in the side panel; applied on demand.
    pub nrows_input: usize,

    loader: CachedLoader,

    /// Loaded dataset, shared with the loader's cache.
    pub dataset: Option<Arc<Dataset>>,

    /// Pickups per hour of the current dataset.
    pub histogram: Option<HourHistogram>,

    /// Hour selected by the slider.
    pub hour: Hour,

    /// Indices of rows at `hour` (recomputed on every hour change).
    pub visible_rows: Vec<usize>,

    /// Whether the raw data table is shown.
    pub show_raw_data: bool,

    pub status: LoadStatus,

    /// Last advisory message from the cache.
    pub cache_warning: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            source: config.data_source(),
            nrows: config.row_limit(),
            nrows_input: config.nrows,
            date_column: config.date_column.clone(),
            loader: CachedLoader::new(),
            dataset: None,
            histogram: None,
            hour: Hour::clamped(i64::from(config.initial_hour)),
            visible_rows: Vec::new(),
            show_raw_data: config.show_raw_data,
            status: LoadStatus::Idle,
            cache_warning: None,
        }
    }

    /// Ask for a load on the next frame so the status line can show first.
    pub fn request_load(&mut self) {
        self.status = LoadStatus::Pending;
    }

    pub fn load_pending(&self) -> bool {
        self.status == LoadStatus::Pending
    }

    /// Load (or fetch from cache) the configured dataset and install it.
    pub fn load(&mut self) {
        match self.loader.load(&self.source, self.nrows, &self.date_column) {
            Ok(cached) => {
                self.cache_warning = cached.warning().map(|w| w.to_string());
                let from_cache = cached.outcome() == CacheOutcome::Hit;
                self.set_dataset(cached.shared());
                self.status = LoadStatus::Done { cached: from_cache };
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", self.source);
                self.status = LoadStatus::Failed(format!("{e:#}"));
            }
        }
    }

    /// Ingest a dataset, rebuild the histogram and the hour view.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.histogram = Some(HourHistogram::from_dataset(&dataset));
        self.dataset = Some(dataset);
        self.refilter();
    }

    /// Select an hour from raw slider input, clamped into `0..=23`.
    pub fn set_hour(&mut self, hour: i64) {
        let hour = Hour::clamped(hour);
        if hour != self.hour {
            self.hour = hour;
            self.refilter();
        }
    }

    pub fn set_source(&mut self, source: DataSource) {
        self.source = source;
        self.request_load();
    }

    /// Change the row limit; `0` means all rows.
    pub fn set_nrows(&mut self, nrows: usize) {
        let nrows = (nrows > 0).then_some(nrows);
        if nrows != self.nrows {
            self.nrows = nrows;
            self.request_load();
        }
    }

    /// Recompute `visible_rows` after an hour or dataset change.
    pub fn refilter(&mut self) {
        self.visible_rows = match &self.dataset {
            Some(ds) => rows_at_hour(ds, self.hour),
            None => Vec::new(),
        };
    }

    /// `[lon, lat]` of every visible row that has coordinates.
    pub fn map_points(&self) -> Vec<[f64; 2]> {
        let Some(ds) = &self.dataset else {
            return Vec::new();
        };
        self.visible_rows
            .iter()
            .filter_map(|&row| ds.coordinates(row))
            .collect()
    }

    pub fn clear_cache(&mut self) {
        self.loader.clear();
        self.cache_warning = None;
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.loader.stats()
    }

    /// True when reloading the current source and row count is a cache hit.
    pub fn current_load_cached(&self) -> bool {
        self.loader.is_cached(&self.source, self.nrows, &self.date_column)
    }

    pub fn cached_entries(&self) -> usize {
        self.loader.cached_entries()
    }
}
