// Copyright 2024 Numunit Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::ops::Range;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::config::Config;
use crate::ordinal::{self, ParseError};
use crate::units::{Conversion, ConversionError, UnitRegistry};

const CARDINAL: &str = r"[0-9]+(?:\.[0-9]*)?";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("Unit {0:?} is not registered")]
    UnknownUnit(String),
    #[error("No units registered")]
    EmptyRegistry,
    #[error("Invalid range selector {0:?}: {1}")]
    InvalidRangeSelector(char, &'static str),
    #[error("Failed to compile unit grammar: {0}")]
    Regex(#[from] regex::Error),
}

/// A single quantity found by the rewriter.
#[derive(Debug)]
pub struct Replacement<'t> {
    /// Byte range of the quantity, unit included, in the scanned text.
    pub span: Range<usize>,
    /// The matched text.
    pub source: &'t str,
    /// The normalized text, or the reason the quantity is kept as is.
    pub outcome: Result<String, Error>,
}

impl<'t> Replacement<'t> {
    /// Text that ends up in the output: the conversion if it succeeded, the source otherwise.
    pub fn output(&self) -> &str {
        match &self.outcome {
            Ok(converted) => converted,
            Err(_) => self.source,
        }
    }

    /// Returns `true` if the quantity was rewritten.
    pub fn is_converted(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Rewrites quantities such as `3斤` or `3~5里` into metric values.
///
/// A quantity is an Arabic number (`3`, `2.5`) or a traditional numeral (`二十三`),
/// optionally followed by a range selector and by a second quantity, and then by a
/// registered unit. Surrounding text is never modified.
#[derive(Debug)]
pub struct Rewriter {
    regex: Regex,
    units: UnitRegistry,
}

impl Rewriter {
    /// Compiles the matching grammar for the units and range selectors of `config`.
    pub fn new(config: Config) -> Result<Self, Error> {
        let pattern = build_pattern(&config)?;
        log::trace!("unit grammar: {}", pattern);
        Ok(Self {
            regex: Regex::new(&pattern)?,
            units: config.units,
        })
    }

    /// Units recognized by this rewriter.
    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    /// Rewrites every quantity in `text`.
    pub fn rewrite(&self, text: &str) -> String {
        self.rewrite_from(text, 0)
    }

    /// Rewrites every quantity found at or after the character offset `start_offset`.
    /// Text before the offset is copied unchanged.
    ///
    /// Quantities that cannot be converted are logged and kept verbatim.
    pub fn rewrite_from(&self, text: &str, start_offset: usize) -> String {
        let mut output = String::with_capacity(text.len());
        let mut copied = 0;
        for replacement in self.replacements(text, start_offset) {
            match &replacement.outcome {
                Ok(converted) => {
                    log::debug!("{:?} -> {:?}", replacement.source, converted);
                }
                Err(err) => {
                    log::warn!("Skipping {:?}: {}", replacement.source, err);
                }
            }
            output.push_str(&text[copied..replacement.span.start]);
            output.push_str(replacement.output());
            copied = replacement.span.end;
        }
        output.push_str(&text[copied..]);
        output
    }

    /// Returns the quantities found at or after the character offset `start_offset`,
    /// left to right. Matches are searched lazily as the iterator advances.
    pub fn replacements<'r, 't>(
        &'r self,
        text: &'t str,
        start_offset: usize,
    ) -> Replacements<'r, 't> {
        let pos = text
            .char_indices()
            .nth(start_offset)
            .map_or(text.len(), |(i, _)| i);
        Replacements {
            rewriter: self,
            text,
            pos,
        }
    }

    fn convert(&self, caps: &Captures<'_>) -> Result<String, Error> {
        let group = |name: &str| caps.name(name).map(|m| m.as_str());
        let unit = group("unit").unwrap_or_default();
        let conversion = self
            .units
            .get(unit)
            .ok_or_else(|| Error::UnknownUnit(unit.to_string()))?;

        // a missing second quantity converts to nothing, so `3-斤` keeps its selector
        let mut converted = convert_quantity(conversion, group("first").unwrap_or_default())?;
        converted.push_str(group("range").unwrap_or_default());
        if let Some(second) = group("second") {
            converted.push_str(&convert_quantity(conversion, second)?);
        }
        Ok(converted)
    }
}

/// Iterator over the quantities of a text. Created by [`Rewriter::replacements`].
pub struct Replacements<'r, 't> {
    rewriter: &'r Rewriter,
    text: &'t str,
    pos: usize,
}

impl<'r, 't> Iterator for Replacements<'r, 't> {
    type Item = Replacement<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }
        let caps = self.rewriter.regex.captures_at(self.text, self.pos)?;
        let whole = caps.get(0)?;
        // a unit is mandatory, so every match is non-empty and the scan always advances
        debug_assert!(whole.end() > self.pos);
        self.pos = whole.end();

        Some(Replacement {
            span: whole.range(),
            source: whole.as_str(),
            outcome: self.rewriter.convert(&caps),
        })
    }
}

fn convert_quantity(conversion: &dyn Conversion, quantity: &str) -> Result<String, Error> {
    let quantity = quantity.trim();
    let converted = if quantity.starts_with(|c: char| c.is_ascii_digit()) {
        conversion.convert(quantity)?
    } else {
        let value = ordinal::parse_ordinal(quantity)?;
        conversion.convert(&value.to_string())?
    };
    if converted.is_empty() {
        return Err(ConversionError::EmptyOutput(quantity.to_string()).into());
    }
    Ok(converted)
}

fn build_pattern(config: &Config) -> Result<String, Error> {
    if config.units.is_empty() {
        return Err(Error::EmptyRegistry);
    }

    let ordinals: String = ordinal::ALPHABET.iter().collect();
    let quantity = format!(r"{CARDINAL}|[{ordinals}][{ordinals}\s]*");

    // longest first: the alternation takes the first unit that matches
    let mut units: Vec<&str> = config.units.units().collect();
    units.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    let units = units
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");

    let mut pattern = format!(r"(?P<first>{quantity})\s*");
    if !config.range_selectors.is_empty() {
        let mut selectors = Vec::with_capacity(config.range_selectors.len());
        for &selector in &config.range_selectors {
            validate_range_selector(selector)?;
            selectors.push(regex::escape(selector.encode_utf8(&mut [0; 4])));
        }
        pattern.push_str(&format!(r"(?P<range>{})?\s*", selectors.join("|")));
    }
    pattern.push_str(&format!(r"(?P<second>{quantity})?\s*(?P<unit>{units})"));
    Ok(pattern)
}

fn validate_range_selector(selector: char) -> Result<(), Error> {
    if selector.is_ascii_digit() || selector == '.' {
        return Err(Error::InvalidRangeSelector(selector, "part of a number"));
    }
    if selector.is_whitespace() {
        return Err(Error::InvalidRangeSelector(selector, "whitespace"));
    }
    if ordinal::is_ordinal_symbol(selector) {
        return Err(Error::InvalidRangeSelector(selector, "ordinal numeral"));
    }
    Ok(())
}

fn default_rewriter() -> &'static Result<Rewriter, Error> {
    static DEFAULT: OnceLock<Result<Rewriter, Error>> = OnceLock::new();
    DEFAULT.get_or_init(|| Rewriter::new(Config::default()))
}

/// Rewrites every quantity in `text` using the default Chinese units.
///
/// Quantities that cannot be converted are kept verbatim, so this never fails.
pub fn rewrite(text: &str) -> String {
    rewrite_from(text, 0)
}

/// Like [`rewrite`], but scanning starts at the character offset `start_offset`.
pub fn rewrite_from(text: &str, start_offset: usize) -> String {
    match default_rewriter() {
        Ok(rewriter) => rewriter.rewrite_from(text, start_offset),
        Err(err) => {
            log::error!("Default unit grammar is unusable: {}", err);
            text.to_string()
        }
    }
}
