// Copyright 2024 Numunit Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! # Numunit
//!
//! Rewrites quantities written in traditional Chinese units into metric values:
//! `买了3斤苹果` becomes `买了1.5kg苹果`, `二十三斤` becomes `11.5kg` and `3-5斤`
//! becomes `1.5kg-2.5kg`. Text around the quantities is left untouched.
//!
//! ## Modules
//!
//! - [`ordinal`](ordinal): parses traditional numerals such as `一百二十`.
//! - [`units`](units): unit symbols and the conversions applied to them.
//! - [`rewriter`](rewriter): finds quantities in text and rewrites them.
//! - [`config`](config): range selectors and units used by the rewriter.
//!
//! ## Error Handling
//!
//! [`parse_ordinal`] returns a [`ParseError`]. The rewriter never fails on input text:
//! quantities that cannot be converted are logged through the `log` facade and kept
//! verbatim. [`Rewriter::replacements`] exposes the reason for each skipped quantity.
//!
//! ### Example
//!
//! ```rust
//! use numunit::{Config, Rewriter, ScaleConversion, UnitRegistry};
//!
//! assert_eq!(numunit::rewrite("一斤到三斤"), "0.5kg到1.5kg");
//! assert_eq!(numunit::parse_ordinal("一百二十").unwrap(), 120);
//!
//! let mut units = UnitRegistry::chinese();
//! units.insert("亩", ScaleConversion::new(666.67, "m²").with_precision(0)).unwrap();
//! let rewriter = Rewriter::new(Config::new(units)).unwrap();
//! assert_eq!(rewriter.rewrite("3亩地"), "2000m²地");
//! ```

pub mod config;
pub use config::*;
pub mod ordinal;
pub use ordinal::{parse_ordinal, Ordinal, ParseError};
pub mod rewriter;
pub use rewriter::*;
pub mod units;
pub use units::*;
