//! Look-back window selection
//!
//! Picks the most recent past races with usable corner data for one horse.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::classifier::classify_run;
use crate::data::history::{HistoryError, HistoryProvider};
use crate::models::{PastRaceRecord, RunningStyleFacts};

/// Hard cap on raw history records fetched per horse
pub const HISTORY_FETCH_LIMIT: usize = 20;

/// Number of races with corner data that make up the window
pub const QUALIFYING_RUN_LIMIT: usize = 3;

/// Window configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Raw records fetched; values above `HISTORY_FETCH_LIMIT` are clamped
    pub fetch_limit: usize,
    /// Qualifying races kept
    pub qualifying_limit: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            fetch_limit: HISTORY_FETCH_LIMIT,
            qualifying_limit: QUALIFYING_RUN_LIMIT,
        }
    }
}

impl WindowConfig {
    pub fn effective_fetch_limit(&self) -> usize {
        self.fetch_limit.min(HISTORY_FETCH_LIMIT)
    }
}

/// Qualifying races of one horse, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub facts: Vec<RunningStyleFacts>,
    /// Raw records scanned before the window filled or the budget ran out
    pub considered: usize,
}

/// Build the window from records already ordered newest first.
///
/// Records on or after `before` are ignored, at most `fetch_limit` remaining
/// records are scanned, and records without any corner data are skipped
/// without using up a window slot.
pub fn window_from_records(
    records: &[PastRaceRecord],
    before: NaiveDate,
    config: &WindowConfig,
) -> HistoryWindow {
    let mut window = HistoryWindow::default();
    if config.qualifying_limit == 0 {
        return window;
    }

    for record in records
        .iter()
        .filter(|r| r.date < before)
        .take(config.effective_fetch_limit())
    {
        window.considered += 1;
        if let Some(facts) = classify_run(&record.corners.present()) {
            window.facts.push(facts);
            if window.facts.len() >= config.qualifying_limit {
                break;
            }
        }
    }

    window
}

/// Fetch a horse's history and select its window
pub fn select_window<P: HistoryProvider + ?Sized>(
    provider: &P,
    horse_id: &str,
    before: NaiveDate,
    config: &WindowConfig,
) -> Result<HistoryWindow, HistoryError> {
    let records = provider.fetch_history(horse_id, before, config.effective_fetch_limit())?;
    Ok(window_from_records(&records, before, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::history::HorseHistoryIndex;
    use crate::models::CornerPositions;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(d as i64)
    }

    fn record(d: u32, passage: &str) -> PastRaceRecord {
        PastRaceRecord {
            date: day(d),
            corners: CornerPositions::parse_passage(passage),
        }
    }

    /// Newest first, as a provider returns them
    fn history(passages: &[&str]) -> Vec<PastRaceRecord> {
        passages
            .iter()
            .enumerate()
            .map(|(i, p)| record(200 - i as u32, p))
            .collect()
    }

    #[test]
    fn test_window_config_default() {
        let config = WindowConfig::default();
        assert_eq!(config.fetch_limit, 20);
        assert_eq!(config.qualifying_limit, 3);
    }

    #[test]
    fn test_fetch_limit_clamped() {
        let config = WindowConfig {
            fetch_limit: 50,
            ..Default::default()
        };
        assert_eq!(config.effective_fetch_limit(), 20);
    }

    #[test]
    fn test_empty_history() {
        let window = window_from_records(&[], day(300), &WindowConfig::default());
        assert!(window.facts.is_empty());
        assert_eq!(window.considered, 0);
    }

    #[test]
    fn test_takes_first_three_qualifying() {
        let records = history(&["1-1-1-1", "5-5-5-5", "2-1-1-1", "9-9", "1"]);
        let window = window_from_records(&records, day(300), &WindowConfig::default());

        assert_eq!(window.facts.len(), 3);
        assert_eq!(window.considered, 3);
        assert!(window.facts[0].is_front_runner);
        assert!(!window.facts[1].stayed_prominent);
        assert!(window.facts[2].is_front_runner);
    }

    #[test]
    fn test_empty_records_do_not_use_slots() {
        let records = history(&["", "0-0-0-0", "3-3", "x", "1-1", "4-4"]);
        let window = window_from_records(&records, day(300), &WindowConfig::default());

        assert_eq!(window.facts.len(), 3);
        assert_eq!(window.considered, 6);
    }

    #[test]
    fn test_never_scans_more_than_fetch_limit() {
        let mut passages = vec![""; 25];
        passages.push("1-1-1-1");
        let records = history(&passages);
        let window = window_from_records(&records, day(300), &WindowConfig::default());

        assert!(window.facts.is_empty());
        assert_eq!(window.considered, 20);
    }

    #[test]
    fn test_records_on_target_date_excluded() {
        let records = vec![record(10, "1-1"), record(9, "5-5"), record(8, "6-6")];
        let window = window_from_records(&records, day(10), &WindowConfig::default());

        assert_eq!(window.facts.len(), 2);
        assert!(window.facts.iter().all(|f| !f.is_front_runner));
    }

    #[test]
    fn test_select_window_via_provider() {
        let mut index = HorseHistoryIndex::new();
        for (d, p) in [(1, "1-1"), (2, "3-3"), (3, "1-2"), (4, "7-7"), (50, "1-1")] {
            index.insert("h1", record(d, p));
        }

        let window = select_window(&index, "h1", day(10), &WindowConfig::default()).unwrap();
        assert_eq!(window.facts.len(), 3);
        // Newest first: 7-7, 1-2, 3-3
        assert!(!window.facts[0].stayed_prominent);
        assert!(window.facts[1].is_front_runner);
        assert!(!window.facts[2].is_front_runner);
    }

    #[test]
    fn test_select_window_unknown_horse() {
        let index = HorseHistoryIndex::new();
        let window = select_window(&index, "nobody", day(10), &WindowConfig::default()).unwrap();
        assert_eq!(window, HistoryWindow::default());
    }
}
