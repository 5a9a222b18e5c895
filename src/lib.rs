//! Pacebias - Pace bias scoring for horse races
//!
//! This library provides:
//! - Corner position parsing and per-race running style classification
//! - Look-back windows over each horse's recent races and A/B/C labels
//! - A race-level bias score and state
//! - CSV-backed history and roster providers with an optional freshness cache
//!
//! # Example
//!
//! ```no_run
//! use pacebias::core::PaceBiasAnalyzer;
//! use pacebias::data::{HorseHistoryIndex, RosterData, RosterProvider};
//!
//! let history = HorseHistoryIndex::load("data/history.csv").unwrap();
//! let roster = RosterData::load("data/roster.csv").unwrap();
//!
//! let analyzer = PaceBiasAnalyzer::with_defaults(history);
//! if let Some(card) = roster.race("202505020811") {
//!     let report = analyzer.analyze_race(&card);
//!     println!("{} {:.1} {}", report.race_id, report.score.score, report.score.state.as_str());
//! }
//! ```

pub mod core;
pub mod data;
pub mod models;

// API-specific modules (only available with api feature)
#[cfg(feature = "api")]
pub mod error;

// Re-export commonly used types
pub use core::{
    AnalyzerConfig, BiasState, PaceBiasAnalyzer, RaceBiasReport, RaceBiasScore, WindowConfig,
};
pub use data::{HistoryError, HistoryProvider, HorseHistoryIndex, RosterData, RosterProvider};
pub use models::{
    BiasRequest, CornerPositions, HorseLabel, HorseOutcome, PaceLabel, PastRaceRecord, RaceCard,
    RosterEntry,
};
