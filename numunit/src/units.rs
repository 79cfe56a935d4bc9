// Copyright 2024 Numunit Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::ordinal;

/// Error type for unit conversions.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// The quantity is not a decimal number.
    #[error("Invalid number {0:?}")]
    InvalidNumber(String),

    /// The quantity or its converted value is not finite.
    #[error("Value {0:?} is out of range")]
    OutOfRange(String),

    /// The conversion produced no text for a non-empty quantity.
    #[error("Conversion of {0:?} produced an empty result")]
    EmptyOutput(String),
}

/// Error type for building a unit registry.
#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    /// A unit symbol is the empty string.
    #[error("Unit symbol is empty")]
    EmptyUnit,

    /// A unit symbol contains characters that belong to the quantity grammar.
    #[error("Invalid unit symbol {0:?}: {1}")]
    InvalidUnit(String, &'static str),

    /// The unit table is not valid JSON.
    #[error("Invalid unit table: {0}")]
    Json(#[from] serde_json::Error),
}

/// A conversion from a quantity in a traditional unit into its metric form.
///
/// `value` is a plain decimal string such as `3`, `2.5` or `120`. The result is the
/// rescaled value with its metric label appended.
pub trait Conversion: Send + Sync {
    fn convert(&self, value: &str) -> Result<String, ConversionError>;
}

impl<F> Conversion for F
where
    F: Fn(&str) -> Result<String, ConversionError> + Send + Sync,
{
    fn convert(&self, value: &str) -> Result<String, ConversionError> {
        self(value)
    }
}

const SIGNIFICANT_DIGITS: usize = 10;

/// Linear conversion: multiplies the value by `factor` and appends `label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleConversion {
    pub factor: f64,
    pub label: String,
    /// Number of decimals to print. `None` prints the shortest representation of the
    /// value rounded to 10 significant digits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<usize>,
}

impl ScaleConversion {
    pub fn new(factor: f64, label: impl Into<String>) -> Self {
        Self {
            factor,
            label: label.into(),
            precision: None,
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }
}

impl Conversion for ScaleConversion {
    fn convert(&self, value: &str) -> Result<String, ConversionError> {
        let number: f64 = value
            .trim()
            .parse()
            .map_err(|_| ConversionError::InvalidNumber(value.to_string()))?;
        let scaled = number * self.factor;
        if !number.is_finite() || !scaled.is_finite() {
            return Err(ConversionError::OutOfRange(value.to_string()));
        }
        Ok(match self.precision {
            Some(precision) => format!("{:.*}{}", precision, scaled, self.label),
            // Debug keeps the trailing `.0` on whole numbers
            None => format!("{:?}{}", round_significant(scaled), self.label),
        })
    }
}

/// Rounds to `SIGNIFICANT_DIGITS` so products like `3 * 0.05` print as `0.15`.
fn round_significant(value: f64) -> f64 {
    format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value)
        .parse()
        .unwrap_or(value)
}

/// Unit symbols and the conversions applied to quantities written in them.
#[derive(Clone, Default)]
pub struct UnitRegistry {
    units: BTreeMap<String, Arc<dyn Conversion>>,
}

impl UnitRegistry {
    /// Creates a registry without any unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Traditional Chinese mass and distance units.
    pub fn chinese() -> Self {
        let mut registry = Self::new();
        for (unit, factor, label) in [
            ("斤", 0.5, "kg"),
            ("两", 0.05, "kg"),
            ("公斤", 1.0, "kg"),
            ("里", 0.5, "km"),
            ("公里", 1.0, "km"),
        ] {
            registry
                .units
                .insert(unit.to_string(), Arc::new(ScaleConversion::new(factor, label)));
        }
        registry
    }

    /// Loads a registry from a JSON object mapping unit symbols to [`ScaleConversion`]s.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let table: BTreeMap<String, ScaleConversion> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for (unit, conversion) in table {
            registry.insert(unit, conversion)?;
        }
        Ok(registry)
    }

    /// Registers `conversion` for `unit`, replacing any previous conversion.
    pub fn insert(
        &mut self,
        unit: impl Into<String>,
        conversion: impl Conversion + 'static,
    ) -> Result<(), RegistryError> {
        let unit = unit.into();
        validate_unit(&unit)?;
        self.units.insert(unit, Arc::new(conversion));
        Ok(())
    }

    /// Removes `unit` from the registry. Returns `true` if it was registered.
    pub fn remove(&mut self, unit: &str) -> bool {
        self.units.remove(unit).is_some()
    }

    /// Adds every unit of `other`, overriding units present in both.
    pub fn extend(&mut self, other: UnitRegistry) {
        self.units.extend(other.units);
    }

    /// Conversion registered for `unit`.
    pub fn get(&self, unit: &str) -> Option<&dyn Conversion> {
        self.units.get(unit).map(|c| c.as_ref())
    }

    /// Returns `true` if `unit` is registered.
    pub fn contains(&self, unit: &str) -> bool {
        self.units.contains_key(unit)
    }

    /// Unit symbols in lexicographic order.
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if no unit is registered.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Converts `value` written in `unit`. Returns `None` for unknown units.
    pub fn convert(&self, unit: &str, value: &str) -> Option<Result<String, ConversionError>> {
        self.get(unit).map(|c| c.convert(value))
    }
}

impl fmt::Debug for UnitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.units()).finish()
    }
}

// A unit must not start inside a quantity, otherwise the grammar could never reach it.
fn validate_unit(unit: &str) -> Result<(), RegistryError> {
    let first = unit.chars().next().ok_or(RegistryError::EmptyUnit)?;
    if first.is_ascii_digit() || first == '.' {
        return Err(RegistryError::InvalidUnit(
            unit.to_string(),
            "starts with a digit",
        ));
    }
    if unit.chars().any(char::is_whitespace) {
        return Err(RegistryError::InvalidUnit(
            unit.to_string(),
            "contains whitespace",
        ));
    }
    if ordinal::is_ordinal_symbol(first) {
        return Err(RegistryError::InvalidUnit(
            unit.to_string(),
            "starts with an ordinal numeral",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_conversion() {
        let jin = ScaleConversion::new(0.5, "kg");
        assert_eq!(jin.convert("3").unwrap(), "1.5kg");
        assert_eq!(jin.convert("2").unwrap(), "1.0kg");
        assert_eq!(jin.convert("2.5").unwrap(), "1.25kg");
        assert_eq!(jin.convert("3.").unwrap(), "1.5kg");
    }

    #[test]
    fn test_scale_conversion_precision() {
        let mu = ScaleConversion::new(666.67, "m²").with_precision(1);
        assert_eq!(mu.convert("3").unwrap(), "2000.0m²");
        assert_eq!(mu.convert("1").unwrap(), "666.7m²");
    }

    #[test]
    fn test_scale_conversion_errors() {
        let jin = ScaleConversion::new(0.5, "kg");
        assert_eq!(
            jin.convert("abc"),
            Err(ConversionError::InvalidNumber("abc".to_string()))
        );
        let huge = "9".repeat(400);
        assert_eq!(jin.convert(&huge), Err(ConversionError::OutOfRange(huge.clone())));
    }

    #[test]
    fn test_closure_conversion() {
        let mut registry = UnitRegistry::new();
        registry
            .insert("尺", |v: &str| -> Result<String, ConversionError> {
                Ok(format!("{v}chi"))
            })
            .unwrap();
        assert_eq!(registry.convert("尺", "7"), Some(Ok("7chi".to_string())));
        assert_eq!(registry.convert("寸", "7"), None);
    }

    #[test]
    fn test_chinese_defaults() {
        let registry = UnitRegistry::chinese();
        assert_eq!(registry.len(), 5);
        assert!(registry.contains("斤"));
        assert!(registry.contains("公里"));
        assert_eq!(registry.convert("两", "4"), Some(Ok("0.2kg".to_string())));
        assert_eq!(registry.convert("公斤", "4"), Some(Ok("4.0kg".to_string())));
    }

    #[test]
    fn test_scaled_values_drop_float_noise() {
        let registry = UnitRegistry::chinese();
        assert_eq!(registry.convert("两", "3"), Some(Ok("0.15kg".to_string())));
        assert_eq!(registry.convert("两", "7"), Some(Ok("0.35kg".to_string())));
        assert_eq!(registry.convert("两", "0"), Some(Ok("0.0kg".to_string())));

        let third = ScaleConversion::new(1.0 / 3.0, "m");
        assert_eq!(third.convert("1").unwrap(), "0.3333333333m");
        assert_eq!(third.convert("3").unwrap(), "1.0m");
    }

    #[test]
    fn test_insert_remove_extend() {
        let mut registry = UnitRegistry::chinese();
        assert!(registry.remove("斤"));
        assert!(!registry.remove("斤"));
        assert!(!registry.contains("斤"));

        let mut extra = UnitRegistry::new();
        extra.insert("斤", ScaleConversion::new(0.6, "kg")).unwrap();
        registry.extend(extra);
        assert_eq!(registry.convert("斤", "1"), Some(Ok("0.6kg".to_string())));
    }

    #[test]
    fn test_invalid_units() {
        let mut registry = UnitRegistry::new();
        let conv = || ScaleConversion::new(1.0, "x");
        assert!(matches!(
            registry.insert("", conv()),
            Err(RegistryError::EmptyUnit)
        ));
        assert!(matches!(
            registry.insert("3斤", conv()),
            Err(RegistryError::InvalidUnit(..))
        ));
        assert!(matches!(
            registry.insert("公 斤", conv()),
            Err(RegistryError::InvalidUnit(..))
        ));
        assert!(matches!(
            registry.insert("十斤", conv()),
            Err(RegistryError::InvalidUnit(..))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_from_json() {
        let registry = UnitRegistry::from_json(
            r#"{"斤": {"factor": 0.5, "label": "kg"},
                "亩": {"factor": 666.67, "label": "m²", "precision": 1}}"#,
        )
        .unwrap();
        assert_eq!(registry.units().collect::<Vec<_>>(), vec!["亩", "斤"]);
        assert_eq!(registry.convert("亩", "1"), Some(Ok("666.7m²".to_string())));

        assert!(matches!(
            UnitRegistry::from_json("[1, 2]"),
            Err(RegistryError::Json(_))
        ));
        assert!(matches!(
            UnitRegistry::from_json(r#"{"": {"factor": 1.0, "label": "x"}}"#),
            Err(RegistryError::EmptyUnit)
        ));
    }
}
