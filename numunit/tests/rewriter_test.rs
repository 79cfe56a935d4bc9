// Copyright 2024 Numunit Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use anyhow::Result;
use numunit::{
    self, parse_ordinal, Config, ConversionError, Error, ParseError, Rewriter, ScaleConversion,
    UnitRegistry,
};

const UNIT_TABLE: &str = r#"{
    "斤": {"factor": 0.5, "label": "kg"},
    "尺": {"factor": 0.3333, "label": "m", "precision": 2},
    "亩": {"factor": 666.67, "label": "m²", "precision": 1}
}"#;

#[test]
fn test_parse_ordinal_values() {
    assert_eq!(parse_ordinal("二十三"), Ok(23));
    assert_eq!(parse_ordinal("一百二十"), Ok(120));
    assert!(parse_ordinal("三千零").is_err());
    assert_eq!(
        parse_ordinal("十十"),
        Err(ParseError::RepeatedLevel("十十".to_string()))
    );
}

#[test]
fn test_text_without_quantities_is_unchanged() {
    for text in ["", "今天天气很好", "3 apples", "一二三", "斤", "3.5", "- ~"] {
        assert_eq!(numunit::rewrite(text), text);
    }
}

#[test]
fn test_single_quantity() {
    assert!(numunit::rewrite("3斤").contains("1.5kg"));
    assert_eq!(numunit::rewrite("猪肉3斤，牛肉2斤"), "猪肉1.5kg，牛肉1.0kg");
}

#[test]
fn test_ordinal_quantities_around_other_text() {
    assert_eq!(numunit::rewrite("一斤到三斤"), "0.5kg到1.5kg");
    assert_eq!(numunit::rewrite("一百二十斤"), "60.0kg");
}

#[test]
fn test_optional_range_parts() {
    assert_eq!(numunit::rewrite("3-斤"), "1.5kg-");
    assert_eq!(numunit::rewrite("3二斤"), "1.5kg1.0kg");
    assert_eq!(numunit::rewrite("约3-5斤左右"), "约1.5kg-2.5kg左右");
}

#[test]
fn test_liang_prints_without_float_noise() {
    assert_eq!(numunit::rewrite("3两"), "0.15kg");
    assert_eq!(numunit::rewrite("七两"), "0.35kg");
}

#[test]
fn test_malformed_quantity_is_left_verbatim() {
    let text = "好的3斤，坏的十十斤。";
    assert_eq!(numunit::rewrite(text), "好的1.5kg，坏的十十斤。");
}

#[test]
fn test_out_of_range_quantity_is_left_verbatim() {
    let huge = format!("{}斤", "9".repeat(400));
    let text = format!("{huge}和3斤");
    assert_eq!(numunit::rewrite(&text), format!("{huge}和1.5kg"));
}

#[test]
fn test_replacements_report_every_quantity() -> Result<()> {
    let rewriter = Rewriter::new(Config::default())?;
    let text = "3-5斤, 十十斤, 2公里";
    let report: Vec<_> = rewriter
        .replacements(text, 0)
        .map(|r| (r.source, r.outcome.map_err(|e| e.to_string())))
        .collect();

    assert_eq!(report.len(), 3);
    assert_eq!(report[0], ("3-5斤", Ok("1.5kg-2.5kg".to_string())));
    assert_eq!(report[1].0, "十十斤");
    assert!(report[1].1.is_err());
    assert_eq!(report[2], ("2公里", Ok("2.0km".to_string())));
    Ok(())
}

#[test]
fn test_unit_table_from_json() -> Result<()> {
    let units = UnitRegistry::from_json(UNIT_TABLE)?;
    let rewriter = Rewriter::new(Config::new(units))?;
    assert_eq!(rewriter.rewrite("三尺"), "1.00m");
    assert_eq!(rewriter.rewrite("2亩"), "1333.3m²");
    // 公里 is not part of the table
    assert_eq!(rewriter.rewrite("2公里"), "2公里");
    Ok(())
}

#[test]
fn test_extended_registry() -> Result<()> {
    let mut units = UnitRegistry::chinese();
    units.extend(UnitRegistry::from_json(UNIT_TABLE)?);
    units.insert("寸", ScaleConversion::new(3.333, "cm").with_precision(1))?;
    let rewriter = Rewriter::new(Config::new(units))?;
    assert_eq!(rewriter.rewrite("2公里3寸"), "2.0km10.0cm");
    Ok(())
}

#[test]
fn test_failing_conversion_is_skipped() -> Result<()> {
    let mut units = UnitRegistry::new();
    units.insert("斤", |value: &str| -> Result<String, ConversionError> {
        if value == "4" {
            Err(ConversionError::OutOfRange(value.to_string()))
        } else {
            Ok(format!("{value}jin"))
        }
    })?;
    let rewriter = Rewriter::new(Config::new(units))?;
    assert_eq!(rewriter.rewrite("3斤 4斤 五斤"), "3jin 4斤 5jin");

    let skipped = rewriter
        .replacements("4斤", 0)
        .next()
        .map(|r| r.outcome);
    assert!(matches!(
        skipped,
        Some(Err(Error::Conversion(ConversionError::OutOfRange(_))))
    ));
    Ok(())
}

#[test]
fn test_rewriter_is_shared_across_threads() -> Result<()> {
    let rewriter = std::sync::Arc::new(Rewriter::new(Config::default())?);
    let handles: Vec<_> = (1..=4)
        .map(|i| {
            let rewriter = rewriter.clone();
            std::thread::spawn(move || rewriter.rewrite(&format!("{i}斤")))
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();
    assert_eq!(results, vec!["0.5kg", "1.0kg", "1.5kg", "2.0kg"]);
    Ok(())
}
