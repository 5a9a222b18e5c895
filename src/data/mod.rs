//! History and roster providers

pub mod cache;
pub mod dates;
pub mod history;
pub mod roster;

// Re-export commonly used types
pub use cache::{CachedHistory, FreshnessPolicy};
pub use dates::{date_from_number, parse_date};
pub use history::{HistoryError, HistoryFile, HistoryProvider, HistorySource, HorseHistoryIndex};
pub use roster::{venue_name, RaceIdParts, RosterData, RosterProvider};
