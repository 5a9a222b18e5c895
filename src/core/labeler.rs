//! Horse-level labeling from the look-back window

use crate::core::window::HistoryWindow;
use crate::models::{HorseLabel, PaceLabel};

/// Window races needed for the A and B labels
const REPEAT_THRESHOLD: u8 = 2;

impl PaceLabel {
    /// Derive the label from window counters. Front-running takes priority.
    pub fn from_counts(front_runner_count: u8, prominent_count: u8) -> Self {
        if front_runner_count >= REPEAT_THRESHOLD {
            PaceLabel::Front
        } else if prominent_count >= REPEAT_THRESHOLD {
            PaceLabel::Prominent
        } else if prominent_count >= 1 {
            PaceLabel::Partial
        } else {
            PaceLabel::NoSignal
        }
    }

    /// Short code used in reports
    pub fn code(&self) -> &'static str {
        match self {
            PaceLabel::Front => "A",
            PaceLabel::Prominent => "B",
            PaceLabel::Partial => "C",
            PaceLabel::NoSignal => "-",
        }
    }

    /// Heading used when listing horses per label
    pub fn description(&self) -> &'static str {
        match self {
            PaceLabel::Front => "front-ran in 2+ of last 3",
            PaceLabel::Prominent => "top-4 at every corner in 2+ of last 3",
            PaceLabel::Partial => "top-4 at every corner in 1 of last 3",
            PaceLabel::NoSignal => "no signal",
        }
    }
}

/// Fold a horse's window into its label and counters
pub fn label_horse(horse_id: &str, window: &HistoryWindow) -> HorseLabel {
    let front_runner_count = window.facts.iter().filter(|f| f.is_front_runner).count() as u8;
    let prominent_count = window.facts.iter().filter(|f| f.stayed_prominent).count() as u8;

    HorseLabel {
        horse_id: horse_id.to_string(),
        label: PaceLabel::from_counts(front_runner_count, prominent_count),
        front_runner_count,
        prominent_count,
        considered: window.considered,
    }
}
