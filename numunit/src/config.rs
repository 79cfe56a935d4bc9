// Copyright 2024 Numunit Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::units::UnitRegistry;

/// Characters that join two quantities into a range, e.g. `3-5斤`.
pub const DEFAULT_RANGE_SELECTORS: [char; 2] = ['-', '~'];

/// Configuration for the rewriter.
#[derive(Debug, Clone)]
pub struct Config {
    /// Characters accepted between the two quantities of a range.
    /// The matched character is kept between the converted values.
    pub range_selectors: Vec<char>,
    /// Units recognized after a quantity and the conversions applied to them.
    pub units: UnitRegistry,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            range_selectors: DEFAULT_RANGE_SELECTORS.to_vec(),
            units: UnitRegistry::chinese(),
        }
    }
}

impl Config {
    /// Creates a new `Config` recognizing the given units. Range selectors are set to
    /// their default values.
    ///
    /// # Arguments
    ///
    /// * `units` - The units to recognize and their conversions.
    ///
    /// # Returns
    ///
    /// A new `Config` with the given units.
    pub fn new(units: UnitRegistry) -> Self {
        Self {
            range_selectors: DEFAULT_RANGE_SELECTORS.to_vec(),
            units,
        }
    }

    /// Replaces the range selectors.
    pub fn with_range_selectors(mut self, selectors: impl IntoIterator<Item = char>) -> Self {
        self.range_selectors = selectors.into_iter().collect();
        self
    }
}
