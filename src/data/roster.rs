//! Race roster loading
//!
//! A roster CSV lists one row per horse entered in a race:
//! `race_id,date,horse_id[,race_name][,horse_name]`.

use chrono::NaiveDate;
use polars::prelude::*;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::data::dates::parse_date;
use crate::models::{RaceCard, RosterEntry};

/// Supplies race cards for target races
pub trait RosterProvider {
    fn race(&self, race_id: &str) -> Option<RaceCard>;
    /// Races on a date, ordered by race id
    fn races_on(&self, date: NaiveDate) -> Vec<RaceCard>;
}

/// Venue code to name mapping
pub fn venue_name(code: u8) -> &'static str {
    match code {
        1 => "札幌",
        2 => "函館",
        3 => "福島",
        4 => "新潟",
        5 => "東京",
        6 => "中山",
        7 => "中京",
        8 => "京都",
        9 => "阪神",
        10 => "小倉",
        _ => "不明",
    }
}

/// Components of a 12-digit race id: YYYY + venue + meeting + day + race
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceIdParts {
    pub year: u16,
    pub venue_code: u8,
    pub kaiji: u8,
    pub nichiji: u8,
    pub race_no: u8,
}

fn race_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})(\d{2})(\d{2})(\d{2})(\d{2})$").expect("race id pattern is valid")
    })
}

impl RaceIdParts {
    pub fn parse(race_id: &str) -> Option<Self> {
        let caps = race_id_pattern().captures(race_id.trim())?;
        Some(Self {
            year: caps[1].parse().ok()?,
            venue_code: caps[2].parse().ok()?,
            kaiji: caps[3].parse().ok()?,
            nichiji: caps[4].parse().ok()?,
            race_no: caps[5].parse().ok()?,
        })
    }

    pub fn venue_name(&self) -> &'static str {
        venue_name(self.venue_code)
    }

    /// Short label such as "東京 11R"
    pub fn short_label(&self) -> String {
        format!("{} {}R", self.venue_name(), self.race_no)
    }

    /// Long label such as "東京 2回 8日目 11R"
    pub fn long_label(&self) -> String {
        format!(
            "{} {}回 {}日目 {}R",
            self.venue_name(),
            self.kaiji,
            self.nichiji,
            self.race_no
        )
    }
}

/// Race cards indexed by race id
#[derive(Debug, Default, Clone)]
pub struct RosterData {
    races: HashMap<String, RaceCard>,
    /// All dates in sorted order
    dates: Vec<NaiveDate>,
}

impl RosterData {
    /// Load and index a roster CSV; every column is read as text
    pub fn load<P: AsRef<Path>>(csv_path: P) -> Result<Self, PolarsError> {
        let df = CsvReadOptions::default()
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(csv_path.as_ref().to_path_buf()))?
            .finish()?;

        let roster = Self::from_dataframe(&df)?;
        info!(
            "Loaded {} races on {} dates from {:?}",
            roster.len(),
            roster.dates.len(),
            csv_path.as_ref()
        );
        Ok(roster)
    }

    fn from_dataframe(df: &DataFrame) -> Result<Self, PolarsError> {
        let race_col = df.column("race_id")?.cast(&DataType::String)?;
        let race_ids = race_col.str()?;
        let date_col = df.column("date")?.cast(&DataType::String)?;
        let dates = date_col.str()?;
        let horse_col = df.column("horse_id")?.cast(&DataType::String)?;
        let horse_ids = horse_col.str()?;

        // Optional display columns
        let race_name_col = df.column("race_name").ok().map(|c| c.cast(&DataType::String)).transpose()?;
        let race_names = race_name_col.as_ref().map(|c| c.str()).transpose()?;
        let horse_name_col = df.column("horse_name").ok().map(|c| c.cast(&DataType::String)).transpose()?;
        let horse_names = horse_name_col.as_ref().map(|c| c.str()).transpose()?;

        let mut cards = Vec::new();
        for i in 0..df.height() {
            let (Some(race_id), Some(raw_date), Some(horse_id)) =
                (race_ids.get(i), dates.get(i), horse_ids.get(i))
            else {
                debug!("Skipping roster row {}: missing race_id, date or horse_id", i);
                continue;
            };
            let Some(date) = parse_date(raw_date) else {
                debug!("Skipping roster row {}: invalid date {:?}", i, raw_date);
                continue;
            };

            cards.push((
                race_id.trim().to_string(),
                date,
                race_names.and_then(|c| c.get(i)).unwrap_or("").to_string(),
                RosterEntry {
                    horse_id: horse_id.trim().to_string(),
                    horse_name: horse_names.and_then(|c| c.get(i)).unwrap_or("").to_string(),
                },
            ));
        }

        Ok(Self::from_rows(cards))
    }

    /// Build from (race_id, date, race_name, entry) rows; row order is roster order
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, NaiveDate, String, RosterEntry)>,
    {
        let mut races: HashMap<String, RaceCard> = HashMap::new();
        let mut date_set = BTreeSet::new();

        for (race_id, date, race_name, entry) in rows {
            date_set.insert(date);
            let card = races.entry(race_id.clone()).or_insert_with(|| RaceCard {
                race_id,
                date,
                race_name: String::new(),
                entries: Vec::new(),
            });
            if card.race_name.is_empty() && !race_name.is_empty() {
                card.race_name = race_name;
            }
            if card.entries.iter().any(|e| e.horse_id == entry.horse_id) {
                debug!("Duplicate horse {} in race {}", entry.horse_id, card.race_id);
                continue;
            }
            card.entries.push(entry);
        }

        Self {
            races,
            dates: date_set.into_iter().collect(),
        }
    }

    /// Get all dates in sorted order
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Total number of races
    pub fn len(&self) -> usize {
        self.races.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }
}

impl RosterProvider for RosterData {
    fn race(&self, race_id: &str) -> Option<RaceCard> {
        self.races.get(race_id).cloned()
    }

    fn races_on(&self, date: NaiveDate) -> Vec<RaceCard> {
        let mut cards: Vec<RaceCard> = self
            .races
            .values()
            .filter(|c| c.date == date)
            .cloned()
            .collect();
        cards.sort_by(|a, b| a.race_id.cmp(&b.race_id));
        cards
    }
}
