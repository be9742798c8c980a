//! Text canonicalization for column names and status phrases.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::models::record::CellValue;

/// Lowercase, collapse whitespace runs to a single space and trim.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// [`normalize_text`] applied to a cell; absent cells become `""`.
pub fn normalize_value(value: &CellValue) -> String {
    normalize_text(&value.as_text())
}

/// Reduce accented characters to their base letter ("sí" -> "si").
///
/// Characters without a canonical decomposition pass through unchanged.
pub fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Stricter normalization used before vocabulary matching.
pub fn normalize_status_text(s: &str) -> String {
    strip_diacritics(&normalize_text(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Total   Factura\t"), "total factura");
        assert_eq!(normalize_text("NO\n pagada"), "no pagada");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value(&CellValue::Absent), "");
        assert_eq!(normalize_value(&CellValue::Number(Decimal::ONE)), "1");
        assert_eq!(normalize_value(&CellValue::text(" Pagada ")), "pagada");
    }

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics("sí"), "si");
        assert_eq!(strip_diacritics("en trámite"), "en tramite");
        assert_eq!(strip_diacritics("situación"), "situacion");
        assert_eq!(strip_diacritics("€ 10"), "€ 10");
    }

    #[test]
    fn test_normalize_status_text() {
        assert_eq!(normalize_status_text("  SÍ "), "si");
        assert_eq!(normalize_status_text("No   Pagada"), "no pagada");
    }
}
