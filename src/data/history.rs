//! Horse History Index
//!
//! Provides lookup of a horse's past race results, newest first, for the
//! look-back window. Backed by a results CSV with one row per horse per race.

use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::corners::CHECKPOINTS;
use crate::data::dates::parse_date;
use crate::models::{CornerPositions, HorseId, PastRaceRecord};

/// Corner cell columns, one per checkpoint
const CORNER_COLUMNS: [&str; CHECKPOINTS] = ["corner_1", "corner_2", "corner_3", "corner_4"];

/// Alternative single-column passage form ("3-2-1-1")
const PASSAGE_COLUMN: &str = "passage";

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history source unavailable for horse {horse_id}: {reason}")]
    SourceUnavailable { horse_id: HorseId, reason: String },

    #[error("failed to load history: {0}")]
    Load(#[from] PolarsError),

    #[error("history data has neither a `passage` column nor corner columns: {0}")]
    MissingColumns(String),
}

impl HistoryError {
    pub fn unavailable(horse_id: &str, reason: impl Into<String>) -> Self {
        HistoryError::SourceUnavailable {
            horse_id: horse_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Something that answers "past races of this horse before a date".
///
/// Implementations return records strictly older than `before`, newest first,
/// at most `limit` of them. A horse with no history is `Ok(vec![])`.
pub trait HistoryProvider: Send + Sync {
    fn fetch_history(
        &self,
        horse_id: &str,
        before: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PastRaceRecord>, HistoryError>;
}

impl<T: HistoryProvider + ?Sized> HistoryProvider for Arc<T> {
    fn fetch_history(
        &self,
        horse_id: &str,
        before: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PastRaceRecord>, HistoryError> {
        (**self).fetch_history(horse_id, before, limit)
    }
}

/// Upstream that can (re)load a horse's complete history, e.g. a scraper
pub trait HistorySource: Send + Sync {
    fn load_history(&self, horse_id: &str) -> Result<Vec<PastRaceRecord>, HistoryError>;
}

/// Historical data indexed by horse id
#[derive(Debug, Default, Clone)]
pub struct HorseHistoryIndex {
    /// horse_id -> past races, sorted by date descending
    history: HashMap<HorseId, Vec<PastRaceRecord>>,
}

impl HorseHistoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and index all race results from CSV.
    ///
    /// Every column is read as text so one malformed cell only blanks that
    /// checkpoint instead of failing the whole file.
    pub fn load<P: AsRef<Path>>(csv_path: P) -> Result<Self, HistoryError> {
        let df = CsvReadOptions::default()
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(csv_path.as_ref().to_path_buf()))?
            .finish()?;

        let index = Self::from_dataframe(&df)?;
        info!(
            "Indexed {} records for {} horses from {:?}",
            index.record_count(),
            index.len(),
            csv_path.as_ref()
        );
        Ok(index)
    }

    fn from_dataframe(df: &DataFrame) -> Result<Self, HistoryError> {
        let horse_col = df.column("horse_id")?.cast(&DataType::String)?;
        let horse_ids = horse_col.str()?;
        let date_col = df.column("date")?.cast(&DataType::String)?;
        let dates = date_col.str()?;

        let passage_col = match df.column(PASSAGE_COLUMN) {
            Ok(col) => Some(col.cast(&DataType::String)?),
            Err(_) => None,
        };
        let mut corner_cols = Vec::with_capacity(CHECKPOINTS);
        if passage_col.is_none() {
            for name in CORNER_COLUMNS {
                let col = df
                    .column(name)
                    .map_err(|_| HistoryError::MissingColumns(name.to_string()))?;
                corner_cols.push(col.cast(&DataType::String)?);
            }
        }
        let passages = passage_col.as_ref().map(|c| c.str()).transpose()?;
        let corners = corner_cols
            .iter()
            .map(|c| c.str())
            .collect::<Result<Vec<_>, _>>()?;

        let mut index = Self::new();
        for i in 0..df.height() {
            let (Some(horse_id), Some(raw_date)) = (horse_ids.get(i), dates.get(i)) else {
                debug!("Skipping history row {}: missing horse_id or date", i);
                continue;
            };
            let horse_id = horse_id.trim();
            let Some(date) = parse_date(raw_date) else {
                debug!("Skipping history row {}: invalid date {:?}", i, raw_date);
                continue;
            };

            let positions = match passages {
                Some(p) => CornerPositions::parse_passage(p.get(i).unwrap_or("")),
                None => {
                    let mut cells = [None; CHECKPOINTS];
                    for (slot, col) in cells.iter_mut().zip(&corners) {
                        *slot = col.get(i);
                    }
                    CornerPositions::from_cells(cells)
                }
            };

            index
                .history
                .entry(horse_id.to_string())
                .or_default()
                .push(PastRaceRecord {
                    date,
                    corners: positions,
                });
        }

        index.sort_all();
        Ok(index)
    }

    /// Build from (horse_id, record) pairs in any order
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (HorseId, PastRaceRecord)>,
    {
        let mut index = Self::new();
        for (horse_id, record) in records {
            index.history.entry(horse_id).or_default().push(record);
        }
        index.sort_all();
        index
    }

    /// Add one record, keeping the horse's list newest first
    pub fn insert(&mut self, horse_id: &str, record: PastRaceRecord) {
        let results = self.history.entry(horse_id.to_string()).or_default();
        results.push(record);
        results.sort_by(|a, b| b.date.cmp(&a.date));
    }

    fn sort_all(&mut self) {
        for results in self.history.values_mut() {
            results.sort_by(|a, b| b.date.cmp(&a.date));
        }
    }

    /// Get recent race results for a horse before a given date
    pub fn get_recent_races(
        &self,
        horse_id: &str,
        before: NaiveDate,
        limit: usize,
    ) -> Vec<&PastRaceRecord> {
        self.history
            .get(horse_id)
            .map(|results| {
                results
                    .iter()
                    .filter(|r| r.date < before)
                    .take(limit)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total records across all horses
    pub fn record_count(&self) -> usize {
        self.history.values().map(Vec::len).sum()
    }

    /// Number of unique horses in the index
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl HistoryProvider for HorseHistoryIndex {
    fn fetch_history(
        &self,
        horse_id: &str,
        before: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PastRaceRecord>, HistoryError> {
        Ok(self
            .get_recent_races(horse_id, before, limit)
            .into_iter()
            .cloned()
            .collect())
    }
}

impl HistorySource for HorseHistoryIndex {
    fn load_history(&self, horse_id: &str) -> Result<Vec<PastRaceRecord>, HistoryError> {
        Ok(self.history.get(horse_id).cloned().unwrap_or_default())
    }
}

/// History CSV on disk, re-read when the file changes
///
/// Serves as the reloadable upstream behind `CachedHistory` in long-running
/// processes: new results appended to the file show up once a horse's cached
/// entry goes stale.
pub struct HistoryFile {
    path: PathBuf,
    loaded: RwLock<LoadedIndex>,
}

struct LoadedIndex {
    modified: Option<SystemTime>,
    index: Arc<HorseHistoryIndex>,
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl HistoryFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HistoryError> {
        let path = path.as_ref().to_path_buf();
        let modified = modified_at(&path);
        let index = Arc::new(HorseHistoryIndex::load(&path)?);
        Ok(Self {
            path,
            loaded: RwLock::new(LoadedIndex { modified, index }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Index as of the last (re)load
    pub fn index(&self) -> Arc<HorseHistoryIndex> {
        match self.loaded.read() {
            Ok(loaded) => loaded.index.clone(),
            Err(poisoned) => poisoned.into_inner().index.clone(),
        }
    }

    /// Current index, re-reading the file if its modification time moved
    fn current(&self, horse_id: &str) -> Result<Arc<HorseHistoryIndex>, HistoryError> {
        let Some(modified) = modified_at(&self.path) else {
            return Err(HistoryError::unavailable(
                horse_id,
                format!("history file {:?} is not readable", self.path),
            ));
        };

        {
            let loaded = self
                .loaded
                .read()
                .map_err(|_| HistoryError::unavailable(horse_id, "history file lock poisoned"))?;
            if loaded.modified == Some(modified) {
                return Ok(loaded.index.clone());
            }
        }

        let index = Arc::new(HorseHistoryIndex::load(&self.path)?);
        info!("Reloaded history from {:?}", self.path);
        let mut loaded = self
            .loaded
            .write()
            .map_err(|_| HistoryError::unavailable(horse_id, "history file lock poisoned"))?;
        *loaded = LoadedIndex {
            modified: Some(modified),
            index: index.clone(),
        };
        Ok(index)
    }
}

impl HistorySource for HistoryFile {
    fn load_history(&self, horse_id: &str) -> Result<Vec<PastRaceRecord>, HistoryError> {
        self.current(horse_id)?.load_history(horse_id)
    }
}
