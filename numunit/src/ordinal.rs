// Copyright 2024 Numunit Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fmt;
use std::str::FromStr;

/// Error type for ordinal numeral parsing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The numeral contains no symbols once whitespace is removed.
    #[error("Empty ordinal numeral")]
    Empty,

    /// The numeral contains a character outside the ordinal alphabet.
    #[error("Unknown ordinal symbol {symbol:?} in {input:?}")]
    UnknownSymbol { symbol: char, input: String },

    /// Two adjacent symbols belong to the same level, e.g. `十十`.
    #[error("Invalid ordinal number: {0:?}")]
    RepeatedLevel(String),

    /// The numeral denotes a value that does not fit in `u64`.
    #[error("Ordinal number {0:?} overflows")]
    Overflow(String),
}

/// Grammatical class of an ordinal symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Bare digit, 一 to 九.
    Digit,
    /// Power-of-ten multiplier: 十, 百, 千.
    Multiplier,
    /// Large magnitude: 万 and above.
    Magnitude,
}

impl Level {
    /// Numeric rank of the level, 1 for digits up to 3 for large magnitudes.
    pub fn rank(self) -> u8 {
        match self {
            Level::Digit => 1,
            Level::Multiplier => 2,
            Level::Magnitude => 3,
        }
    }
}

/// Every symbol of the ordinal alphabet, in ascending value.
pub const ALPHABET: [char; 15] = [
    '一', '二', '三', '四', '五', '六', '七', '八', '九', '十', '百', '千', '万', '亿', '兆',
];

/// Looks up the level and value of an ordinal symbol.
pub fn digit(symbol: char) -> Option<(Level, u64)> {
    let entry = match symbol {
        '一' => (Level::Digit, 1),
        '二' => (Level::Digit, 2),
        '三' => (Level::Digit, 3),
        '四' => (Level::Digit, 4),
        '五' => (Level::Digit, 5),
        '六' => (Level::Digit, 6),
        '七' => (Level::Digit, 7),
        '八' => (Level::Digit, 8),
        '九' => (Level::Digit, 9),

        '十' => (Level::Multiplier, 10),
        '百' => (Level::Multiplier, 100),
        '千' => (Level::Multiplier, 1_000),

        '万' => (Level::Magnitude, 10_000),
        '亿' => (Level::Magnitude, 100_000_000),
        '兆' => (Level::Magnitude, 1_000_000_000_000),

        _ => return None,
    };
    Some(entry)
}

/// Returns `true` if `symbol` belongs to the ordinal alphabet.
pub fn is_ordinal_symbol(symbol: char) -> bool {
    digit(symbol).is_some()
}

/// Parses a traditional numeral such as `一百二十` into its integer value.
///
/// Whitespace anywhere in the input is ignored. Symbols of the same level may not
/// follow each other, so `十十` and `三五` are rejected.
///
/// Multiplier groups are added to the total as soon as they are complete, which
/// means a multiplier group followed by a large magnitude (`十万`) is not
/// regrouped under that magnitude.
pub fn parse_ordinal(text: &str) -> Result<u64, ParseError> {
    let overflow = || ParseError::Overflow(text.to_string());

    let mut result: u64 = 0;
    let mut pending: u64 = 0;
    let mut last_level: Option<Level> = None;
    let mut seen_any = false;

    for symbol in text.chars().filter(|c| !c.is_whitespace()) {
        seen_any = true;
        let (level, value) = digit(symbol).ok_or_else(|| ParseError::UnknownSymbol {
            symbol,
            input: text.to_string(),
        })?;

        if last_level == Some(level) {
            return Err(ParseError::RepeatedLevel(text.to_string()));
        }
        last_level = Some(level);

        match level {
            Level::Magnitude | Level::Multiplier => {
                let group = if pending != 0 { pending } else { 1 };
                let amount = group.checked_mul(value).ok_or_else(overflow)?;
                result = result.checked_add(amount).ok_or_else(overflow)?;
                pending = 0;
            }
            Level::Digit => {
                pending = pending.checked_add(value).ok_or_else(overflow)?;
            }
        }
    }

    if !seen_any {
        return Err(ParseError::Empty);
    }
    result.checked_add(pending).ok_or_else(overflow)
}

/// Integer value of a traditional numeral, usable with `str::parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ordinal(pub u64);

impl FromStr for Ordinal {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_ordinal(s).map(Ordinal)
    }
}

impl From<Ordinal> for u64 {
    fn from(val: Ordinal) -> u64 {
        val.0
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
