use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Horse identifier as issued by the results source (e.g. "2019105219")
pub type HorseId = String;

/// Running positions at the four timing checkpoints of one past race.
///
/// `None` means no data for that checkpoint (scratched, missing telemetry,
/// short course with fewer corners).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerPositions(pub [Option<u32>; 4]);

/// One finished race in a horse's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastRaceRecord {
    pub date: NaiveDate,
    pub corners: CornerPositions,
}

/// Facts derived from a single past race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningStyleFacts {
    /// Led, or sat second behind a leader who was then passed, from the first checkpoint
    pub is_front_runner: bool,
    /// Never worse than 4th at any recorded checkpoint
    pub stayed_prominent: bool,
}

/// Horse-level running style label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaceLabel {
    /// A: front-ran in at least two of the qualifying races
    #[serde(rename = "A")]
    Front,
    /// B: stayed prominent in at least two of the qualifying races
    #[serde(rename = "B")]
    Prominent,
    /// C: stayed prominent in exactly one qualifying race
    #[serde(rename = "C")]
    Partial,
    /// No usable signal
    #[serde(rename = "none")]
    NoSignal,
}

/// Label and counters for one horse entered in a target race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorseLabel {
    pub horse_id: HorseId,
    pub label: PaceLabel,
    pub front_runner_count: u8,
    pub prominent_count: u8,
    /// Raw history records scanned to fill the window (diagnostics only)
    pub considered: usize,
}

/// Per-horse result of the labeling step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HorseOutcome {
    Labeled(HorseLabel),
    /// History could not be read; distinct from "no signal"
    Unknown { horse_id: HorseId, reason: String },
}

impl HorseOutcome {
    pub fn horse_id(&self) -> &str {
        match self {
            HorseOutcome::Labeled(label) => &label.horse_id,
            HorseOutcome::Unknown { horse_id, .. } => horse_id,
        }
    }

    pub fn label(&self) -> Option<&HorseLabel> {
        match self {
            HorseOutcome::Labeled(label) => Some(label),
            HorseOutcome::Unknown { .. } => None,
        }
    }
}

/// Horse entered in a race card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub horse_id: HorseId,
    #[serde(default)]
    pub horse_name: String,
}

/// Target race: date plus entered horses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceCard {
    pub race_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub race_name: String,
    pub entries: Vec<RosterEntry>,
}

impl RaceCard {
    pub fn horse_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.horse_id.as_str())
    }

    /// Display name for a horse, falling back to its id
    pub fn horse_name<'a>(&'a self, horse_id: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|e| e.horse_id == horse_id && !e.horse_name.is_empty())
            .map(|e| e.horse_name.as_str())
            .unwrap_or(horse_id)
    }
}

/// Ad hoc bias request
#[derive(Debug, Serialize, Deserialize)]
pub struct BiasRequest {
    /// Race date (YYYYMMDD)
    pub date: String,
    #[serde(default)]
    pub race_id: Option<String>,
    pub horse_ids: Vec<HorseId>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub horses_indexed: usize,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> RaceCard {
        RaceCard {
            race_id: "202505020811".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 5, 4).unwrap(),
            race_name: "NHKマイルC".to_string(),
            entries: vec![
                RosterEntry {
                    horse_id: "2022104001".to_string(),
                    horse_name: "Alpha".to_string(),
                },
                RosterEntry {
                    horse_id: "2022104002".to_string(),
                    horse_name: String::new(),
                },
            ],
        }
    }

    #[test]
    fn test_pace_label_serialization() {
        assert_eq!(serde_json::to_string(&PaceLabel::Front).unwrap(), "\"A\"");
        assert_eq!(serde_json::to_string(&PaceLabel::Prominent).unwrap(), "\"B\"");
        assert_eq!(serde_json::to_string(&PaceLabel::Partial).unwrap(), "\"C\"");
        assert_eq!(serde_json::to_string(&PaceLabel::NoSignal).unwrap(), "\"none\"");
    }

    #[test]
    fn test_horse_outcome_tagged() {
        let outcome = HorseOutcome::Unknown {
            horse_id: "2022104001".to_string(),
            reason: "timeout".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "unknown");
        assert_eq!(json["horse_id"], "2022104001");
        assert!(outcome.label().is_none());
        assert_eq!(outcome.horse_id(), "2022104001");
    }

    #[test]
    fn test_race_card_horse_name_fallback() {
        let card = card();
        assert_eq!(card.horse_name("2022104001"), "Alpha");
        assert_eq!(card.horse_name("2022104002"), "2022104002");
        assert_eq!(card.horse_ids().count(), 2);
    }

    #[test]
    fn test_bias_request_defaults() {
        let req: BiasRequest =
            serde_json::from_str(r#"{"date":"20250504","horse_ids":["1","2"]}"#).unwrap();
        assert!(req.race_id.is_none());
        assert_eq!(req.horse_ids.len(), 2);
    }
}
