//! Amount parsing for locale-ambiguous monetary strings.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::record::CellValue;

/// Parse a raw cell into a monetary value.
///
/// Numbers pass through unchanged, text goes through [`parse_amount_str`],
/// absent cells stay absent.
pub fn parse_amount(value: &CellValue) -> Option<Decimal> {
    match value {
        CellValue::Absent => None,
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => parse_amount_str(s),
    }
}

/// Parse an amount written with either European ("1.234,56") or US
/// ("1,234.56") separators.
///
/// Everything except digits, separators and a minus sign in front of the
/// first digit is dropped. With both separators present the later one is the
/// decimal point; a lone comma is a decimal comma.
pub fn parse_amount_str(s: &str) -> Option<Decimal> {
    let mut cleaned = String::with_capacity(s.len());
    let mut negative = false;
    let mut seen_digit = false;

    for c in s.chars() {
        match c {
            '0'..='9' => {
                seen_digit = true;
                cleaned.push(c);
            }
            ',' | '.' => cleaned.push(c),
            '-' if !seen_digit => negative = true,
            _ => {}
        }
    }

    if !seen_digit {
        return None;
    }

    let mut normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }
    if normalized.ends_with('.') {
        normalized.push('0');
    }

    let amount = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -amount } else { amount })
}
