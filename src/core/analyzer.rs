//! Race-level pace bias analysis
//!
//! Runs window selection and labeling for every horse of a race card and
//! scores the field once all labels are in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::thread;
use tracing::{debug, warn};

use crate::core::labeler::label_horse;
use crate::core::scorer::{score_field, RaceBiasScore};
use crate::core::window::{select_window, WindowConfig};
use crate::data::history::HistoryProvider;
use crate::models::{HorseLabel, HorseOutcome, PaceLabel, RaceCard};

/// Analyzer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub window: WindowConfig,
    /// Horses whose history is fetched at the same time
    pub max_concurrency: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            max_concurrency: 1,
        }
    }
}

/// Scored race with the per-horse outcomes behind the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceBiasReport {
    pub race_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub race_name: String,
    #[serde(flatten)]
    pub score: RaceBiasScore,
    /// Roster order
    pub horses: Vec<HorseOutcome>,
}

impl RaceBiasReport {
    /// Horses carrying `label`, in roster order
    pub fn horses_with_label(&self, label: PaceLabel) -> Vec<&HorseLabel> {
        self.horses
            .iter()
            .filter_map(HorseOutcome::label)
            .filter(|h| h.label == label)
            .collect()
    }

    /// Horses whose history could not be read
    pub fn unknown_horses(&self) -> Vec<(&str, &str)> {
        self.horses
            .iter()
            .filter_map(|o| match o {
                HorseOutcome::Unknown { horse_id, reason } => {
                    Some((horse_id.as_str(), reason.as_str()))
                }
                HorseOutcome::Labeled(_) => None,
            })
            .collect()
    }
}

/// Scores races against a history provider
pub struct PaceBiasAnalyzer<P: HistoryProvider> {
    provider: P,
    config: AnalyzerConfig,
}

impl<P: HistoryProvider> PaceBiasAnalyzer<P> {
    pub fn new(provider: P, config: AnalyzerConfig) -> Self {
        Self { provider, config }
    }

    pub fn with_defaults(provider: P) -> Self {
        Self::new(provider, AnalyzerConfig::default())
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Label one horse for a race on `date`.
    ///
    /// A provider failure becomes `HorseOutcome::Unknown`, never a missing
    /// or zeroed label.
    pub fn analyze_horse(&self, horse_id: &str, date: NaiveDate) -> HorseOutcome {
        match select_window(&self.provider, horse_id, date, &self.config.window) {
            Ok(window) => {
                let label = label_horse(horse_id, &window);
                debug!(
                    "Horse {}: label {} (front {}, prominent {}, considered {})",
                    horse_id,
                    label.label.code(),
                    label.front_runner_count,
                    label.prominent_count,
                    label.considered
                );
                HorseOutcome::Labeled(label)
            }
            Err(e) => {
                warn!("History unavailable for horse {}: {}", horse_id, e);
                HorseOutcome::Unknown {
                    horse_id: horse_id.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Label every horse, keeping input order
    pub fn analyze_horses(&self, horse_ids: &[&str], date: NaiveDate) -> Vec<HorseOutcome> {
        let batch = self.config.max_concurrency.max(1);
        if batch == 1 {
            return horse_ids
                .iter()
                .map(|id| self.analyze_horse(id, date))
                .collect();
        }

        let mut outcomes = Vec::with_capacity(horse_ids.len());
        for chunk in horse_ids.chunks(batch) {
            thread::scope(|s| {
                let handles: Vec<_> = chunk
                    .iter()
                    .map(|id| s.spawn(move || self.analyze_horse(id, date)))
                    .collect();
                for (handle, id) in handles.into_iter().zip(chunk) {
                    let outcome = handle.join().unwrap_or_else(|_| HorseOutcome::Unknown {
                        horse_id: id.to_string(),
                        reason: "history lookup panicked".to_string(),
                    });
                    outcomes.push(outcome);
                }
            });
        }
        outcomes
    }

    /// Score a race from its card
    pub fn analyze_race(&self, card: &RaceCard) -> RaceBiasReport {
        let horse_ids: Vec<&str> = card.horse_ids().collect();
        let horses = self.analyze_horses(&horse_ids, card.date);
        let score = score_field(&horses);

        debug!(
            "Race {}: score {} ({}) a={} b={} c={} unknown={}",
            card.race_id,
            score.score,
            score.state.as_str(),
            score.a,
            score.b,
            score.c,
            score.unknown
        );

        RaceBiasReport {
            race_id: card.race_id.clone(),
            date: card.date,
            race_name: card.race_name.clone(),
            score,
            horses,
        }
    }
}
