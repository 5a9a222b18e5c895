//! YYYYMMDD date helpers shared by the loaders and binaries

use chrono::NaiveDate;

/// Convert a YYYYMMDD integer (e.g. 20250504) to a date
pub fn date_from_number(value: i64) -> Option<NaiveDate> {
    if !(10_000_101..=99_991_231).contains(&value) {
        return None;
    }
    let year = (value / 10_000) as i32;
    let month = ((value / 100) % 100) as u32;
    let day = (value % 100) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse "YYYYMMDD" or "YYYY-MM-DD"
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let digits: String = text.trim().chars().filter(|c| *c != '-' && *c != '/').collect();
    if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok().and_then(date_from_number)
}
