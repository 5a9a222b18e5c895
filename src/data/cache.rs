//! Freshness-cached history
//!
//! Serves a horse's history from memory while it is young enough, and asks
//! the upstream source to reload it once it goes stale.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};

use crate::data::history::{HistoryError, HistoryProvider, HistorySource};
use crate::models::{HorseId, PastRaceRecord};

/// Default age after which a cached history is reloaded
pub const DEFAULT_MAX_AGE_DAYS: i64 = 3;

/// When cached history must be reloaded
#[derive(Debug, Clone, Copy)]
pub struct FreshnessPolicy {
    pub max_age: Duration,
    /// Serve the stale copy if the reload fails
    pub serve_stale_on_error: bool,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::days(DEFAULT_MAX_AGE_DAYS),
            serve_stale_on_error: false,
        }
    }
}

impl FreshnessPolicy {
    pub fn is_fresh(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - fetched_at < self.max_age
    }
}

#[derive(Debug, Clone)]
struct CachedEntry {
    fetched_at: DateTime<Utc>,
    /// Newest first
    records: Vec<PastRaceRecord>,
}

/// History provider backed by a reloadable source and a freshness window
pub struct CachedHistory<S: HistorySource> {
    source: S,
    policy: FreshnessPolicy,
    entries: RwLock<HashMap<HorseId, CachedEntry>>,
}

impl<S: HistorySource> CachedHistory<S> {
    pub fn new(source: S, policy: FreshnessPolicy) -> Self {
        Self {
            source,
            policy,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the cache with a previously fetched history
    pub fn preload(&self, horse_id: &str, records: Vec<PastRaceRecord>, fetched_at: DateTime<Utc>) {
        let entry = CachedEntry {
            fetched_at,
            records: sorted(records),
        };
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(horse_id.to_string(), entry);
            }
            Err(_) => warn!("History cache lock poisoned, not caching horse {}", horse_id),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn policy(&self) -> &FreshnessPolicy {
        &self.policy
    }

    /// Number of horses currently cached
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Same as `fetch_history`, with an explicit clock
    pub fn fetch_history_at(
        &self,
        horse_id: &str,
        before: NaiveDate,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<PastRaceRecord>, HistoryError> {
        let cached = self
            .entries
            .read()
            .map_err(|_| HistoryError::unavailable(horse_id, "history cache lock poisoned"))?
            .get(horse_id)
            .cloned();

        let records = match cached {
            Some(entry) if self.policy.is_fresh(entry.fetched_at, now) => {
                debug!("History cache hit for horse {}", horse_id);
                entry.records
            }
            stale => {
                debug!("Reloading history for horse {}", horse_id);
                match self.source.load_history(horse_id) {
                    Ok(records) => {
                        let records = sorted(records);
                        self.preload(horse_id, records.clone(), now);
                        records
                    }
                    Err(e) => match stale {
                        Some(entry) if self.policy.serve_stale_on_error => {
                            warn!(
                                "History reload failed for horse {}, serving copy from {}: {}",
                                horse_id, entry.fetched_at, e
                            );
                            entry.records
                        }
                        _ => {
                            return Err(match e {
                                HistoryError::SourceUnavailable { .. } => e,
                                other => HistoryError::unavailable(horse_id, other.to_string()),
                            })
                        }
                    },
                }
            }
        };

        Ok(records
            .into_iter()
            .filter(|r| r.date < before)
            .take(limit)
            .collect())
    }
}

impl<S: HistorySource> HistoryProvider for CachedHistory<S> {
    fn fetch_history(
        &self,
        horse_id: &str,
        before: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PastRaceRecord>, HistoryError> {
        self.fetch_history_at(horse_id, before, limit, Utc::now())
    }
}

fn sorted(mut records: Vec<PastRaceRecord>) -> Vec<PastRaceRecord> {
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records
}
