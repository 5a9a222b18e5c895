//! Corner position parsing
//!
//! Turns raw per-checkpoint positions into the ordered list of usable ranks.
//! Bad input never fails: anything that is not a positive integer is treated
//! as "no data for this checkpoint".
//!
//! # Example
//!
//! ```
//! use pacebias::models::CornerPositions;
//!
//! let corners = CornerPositions::parse_passage("3-2-1-1");
//! assert_eq!(corners.present(), vec![3, 2, 1, 1]);
//!
//! let partial = CornerPositions::parse_passage("--5-4");
//! assert_eq!(partial.present(), vec![5, 4]);
//! ```

use crate::models::CornerPositions;

/// Number of timing checkpoints per race
pub const CHECKPOINTS: usize = 4;

/// Separator used in passage strings ("3-2-1-1")
pub const PASSAGE_SEPARATOR: char = '-';

/// Convert fullwidth digits to halfwidth
pub fn normalize_fullwidth_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Parse a single checkpoint token; blank, non-numeric, zero or negative is absent
pub fn parse_corner_token(token: &str) -> Option<u32> {
    let normalized = normalize_fullwidth_digits(token.trim());
    normalized.parse::<u32>().ok().filter(|&v| v > 0)
}

impl CornerPositions {
    /// Build from raw integer cells, dropping non-positive values
    pub fn from_values(values: [Option<i64>; CHECKPOINTS]) -> Self {
        Self(values.map(|v| v.filter(|&n| n > 0).and_then(|n| u32::try_from(n).ok())))
    }

    /// Build from raw text cells, one per checkpoint
    pub fn from_cells(cells: [Option<&str>; CHECKPOINTS]) -> Self {
        Self(cells.map(|c| c.and_then(parse_corner_token)))
    }

    /// Parse a passage string such as "3-2-1-1".
    ///
    /// Tokens are positional; only the first four are read.
    pub fn parse_passage(passage: &str) -> Self {
        let mut positions = [None; CHECKPOINTS];
        for (slot, token) in positions
            .iter_mut()
            .zip(passage.split(PASSAGE_SEPARATOR))
        {
            *slot = parse_corner_token(token);
        }
        Self(positions)
    }

    /// Present ranks in checkpoint order
    pub fn present(&self) -> Vec<u32> {
        self.0.iter().flatten().copied().filter(|&v| v > 0).collect()
    }

    /// True when no checkpoint has usable data
    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }

    /// Render back to passage form, absent checkpoints left blank
    pub fn to_passage(&self) -> String {
        self.0
            .iter()
            .map(|v| v.map(|n| n.to_string()).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("-")
    }
}
