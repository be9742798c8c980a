//! Regex patterns for labelled fields in invoice documents.
//!
//! Every pattern captures the field value in group 1. Labels are matched
//! case-insensitively and values never span past the end of the line.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "Factura Nº: A-001", "FACTURA no. 17/2024", "Factura número F-9".
    // The number holds at least one digit.
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)\bfactura\b[ \t]*(?:n[º°]\.?|no\.|n[úu]m(?:ero|\.)?)?[ \t]*[:\-]?[ \t]*([A-Za-z][A-Za-z/_.\-]*\d[A-Za-z0-9/_.\-]*|\d[A-Za-z0-9/_.\-]*)"
    ).unwrap();

    // "Cliente: ACME S.L.", "Razón social - Beta"
    pub static ref CLIENT: Regex = Regex::new(
        r"(?i)\b(?:cliente|raz[oó]n[ \t]+social)[ \t]*[:\-][ \t]*(\S[^\r\n]*)"
    ).unwrap();

    // "Estado: No pagada", "Situación - pendiente", "Pago: realizado"
    pub static ref STATUS: Regex = Regex::new(
        r"(?i)\b(?:estado|situaci[oó]n|pago)[ \t]*[:\-][ \t]*(\S[^\r\n]*)"
    ).unwrap();

    // "Total: 1.234,56€", "Total a pagar: € 99", "Importe 1,234.56"
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"(?i)\b(?:total(?:[ \t]+a[ \t]+pagar)?|importe)[ \t]*[:\-]?[ \t]*(?:[€$£]|eur\b|usd\b)?[ \t]*(-?\d[\d.,]*)"
    ).unwrap();
}
