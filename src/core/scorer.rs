//! Race Pace Bias Scoring
//!
//! Combines the labels of every horse in a field into one number. Lower
//! means the early pace is more likely to be uncontested, favoring horses
//! that race on or near the lead.
//!
//! With `a`, `b`, `c` the headcounts of A, B and C horses:
//!     score = b * 1.0 + c * 0.5
//!           - 2.5  if a == 0
//!           + 1.5  if a >= 2
//!           - 1.0  if b <= 2
//!
//! A field where no horse carries a label scores the sentinel -3.5.

use serde::{Deserialize, Serialize};

use crate::models::{HorseOutcome, PaceLabel};

/// Sentinel score for a field with no signal at all
pub const NO_SIGNAL_SCORE: f64 = -3.5;

/// Scores above this carry no notable bias
pub const NO_BIAS_THRESHOLD: f64 = 4.0;

const PROMINENT_WEIGHT: f64 = 1.0;
const PARTIAL_WEIGHT: f64 = 0.5;
const NO_FRONT_RUNNER_ADJUSTMENT: f64 = -2.5;
const CONTESTED_LEAD_ADJUSTMENT: f64 = 1.5;
const FEW_PROMINENT_ADJUSTMENT: f64 = -1.0;
const FEW_PROMINENT_MAX: usize = 2;

/// Race-level bias state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiasState {
    /// Score above the threshold
    None,
    BiasPresent,
    /// No horse produced a signal
    Invalid,
}

impl BiasState {
    pub fn from_score(score: f64) -> Self {
        if score > NO_BIAS_THRESHOLD {
            BiasState::None
        } else if score == NO_SIGNAL_SCORE {
            BiasState::Invalid
        } else {
            BiasState::BiasPresent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BiasState::None => "NONE",
            BiasState::BiasPresent => "BIAS_PRESENT",
            BiasState::Invalid => "INVALID",
        }
    }
}

/// Label headcounts across a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl LabelCounts {
    pub fn add(&mut self, label: PaceLabel) {
        match label {
            PaceLabel::Front => self.a += 1,
            PaceLabel::Prominent => self.b += 1,
            PaceLabel::Partial => self.c += 1,
            PaceLabel::NoSignal => {}
        }
    }

    pub fn total(&self) -> usize {
        self.a + self.b + self.c
    }

    /// Score for these headcounts
    pub fn score(&self) -> f64 {
        if self.total() == 0 {
            return NO_SIGNAL_SCORE;
        }

        let mut score = self.b as f64 * PROMINENT_WEIGHT + self.c as f64 * PARTIAL_WEIGHT;
        if self.a == 0 {
            score += NO_FRONT_RUNNER_ADJUSTMENT;
        } else if self.a >= 2 {
            score += CONTESTED_LEAD_ADJUSTMENT;
        }
        if self.b <= FEW_PROMINENT_MAX {
            score += FEW_PROMINENT_ADJUSTMENT;
        }
        score
    }
}

/// Bias score for one race
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceBiasScore {
    pub score: f64,
    pub state: BiasState,
    pub a: usize,
    pub b: usize,
    pub c: usize,
    /// Horses whose history could not be read; excluded from a/b/c
    #[serde(default)]
    pub unknown: usize,
}

impl RaceBiasScore {
    pub fn from_counts(counts: LabelCounts, unknown: usize) -> Self {
        let score = counts.score();
        Self {
            score,
            state: BiasState::from_score(score),
            a: counts.a,
            b: counts.b,
            c: counts.c,
            unknown,
        }
    }

    pub fn counts(&self) -> LabelCounts {
        LabelCounts {
            a: self.a,
            b: self.b,
            c: self.c,
        }
    }

    /// Some horses in the field have unknown history
    pub fn is_degraded(&self) -> bool {
        self.unknown > 0
    }

    /// Marker shown next to races with a bias
    pub fn pace_mark(&self) -> Option<&'static str> {
        match self.state {
            BiasState::BiasPresent => Some("★"),
            _ => None,
        }
    }
}

/// Score a field from its labels; order does not matter
pub fn score_labels<I>(labels: I) -> RaceBiasScore
where
    I: IntoIterator<Item = PaceLabel>,
{
    let mut counts = LabelCounts::default();
    for label in labels {
        counts.add(label);
    }
    RaceBiasScore::from_counts(counts, 0)
}

/// Score a field of per-horse outcomes, counting unknown horses separately
pub fn score_field(outcomes: &[HorseOutcome]) -> RaceBiasScore {
    let mut counts = LabelCounts::default();
    let mut unknown = 0;
    for outcome in outcomes {
        match outcome {
            HorseOutcome::Labeled(horse) => counts.add(horse.label),
            HorseOutcome::Unknown { .. } => unknown += 1,
        }
    }
    RaceBiasScore::from_counts(counts, unknown)
}
