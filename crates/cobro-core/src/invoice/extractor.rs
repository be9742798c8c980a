//! Field extraction from unstructured invoice documents.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::rules::patterns::{CLIENT, INVOICE_NUMBER, STATUS, TOTAL_AMOUNT};
use super::rules::{parse_amount_str, StatusClassifier};
use crate::models::invoice::{ExtractedInvoice, PaymentStatus};

/// Field of an [`ExtractedInvoice`] recovered by pattern rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentField {
    InvoiceNumber,
    Client,
    Status,
    Amount,
}

impl DocumentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentField::InvoiceNumber => "invoice_number",
            DocumentField::Client => "client",
            DocumentField::Status => "status",
            DocumentField::Amount => "amount",
        }
    }
}

/// A pattern whose first capture group yields a value for `field`.
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pub field: DocumentField,
    pub pattern: Regex,
}

impl ExtractionRule {
    pub fn new(field: DocumentField, pattern: Regex) -> Self {
        Self { field, pattern }
    }
}

lazy_static! {
    /// Default rules, tried in order per field.
    pub static ref DOCUMENT_RULES: Vec<ExtractionRule> = vec![
        ExtractionRule::new(DocumentField::InvoiceNumber, INVOICE_NUMBER.clone()),
        ExtractionRule::new(DocumentField::Client, CLIENT.clone()),
        ExtractionRule::new(DocumentField::Status, STATUS.clone()),
        ExtractionRule::new(DocumentField::Amount, TOTAL_AMOUNT.clone()),
    ];
}

/// Extracts a single invoice from the text of one document.
///
/// Each field is looked up independently: the rules for a field are tried in
/// order and the first match in document order wins. A field that no rule
/// finds keeps its fallback value; extraction itself never fails.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    rules: Vec<ExtractionRule>,
    classifier: StatusClassifier,
}

impl DocumentExtractor {
    /// Create an extractor with the default rules and vocabulary.
    pub fn new() -> Self {
        Self {
            rules: DOCUMENT_RULES.clone(),
            classifier: StatusClassifier::default(),
        }
    }

    /// Use a different status vocabulary.
    pub fn with_classifier(mut self, classifier: StatusClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Append a rule; it is tried after the existing rules for its field.
    pub fn with_rule(mut self, rule: ExtractionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Extract from a document given as page texts. Unreadable pages are
    /// expected as empty strings.
    pub fn extract<S: AsRef<str>>(&self, pages: &[S]) -> ExtractedInvoice {
        let text = pages
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        self.extract_text(&text)
    }

    /// Extract from the full text of a document.
    pub fn extract_text(&self, text: &str) -> ExtractedInvoice {
        let mut invoice = ExtractedInvoice::default();

        if let Some(number) = self.capture(DocumentField::InvoiceNumber, text) {
            let number = number.trim_end_matches(['.', ',', ';', ':']);
            if !number.is_empty() {
                invoice.invoice_number = number.to_uppercase();
            }
        }

        if let Some(client) = self.capture(DocumentField::Client, text) {
            invoice.client = client.to_string();
        }

        invoice.status = self.extract_status(text);

        if let Some(raw) = self.capture(DocumentField::Amount, text) {
            match parse_amount_str(raw.trim_end_matches(['.', ','])) {
                Some(amount) => invoice.amount = amount,
                None => debug!("Unparsable document amount {:?}", raw),
            }
        }

        let missing = invoice.missing_fields();
        if !missing.is_empty() {
            debug!("Document fields not found: {}", missing.join(", "));
        }

        info!(
            "Extracted invoice {} for {} ({}, {})",
            invoice.invoice_number, invoice.client, invoice.status, invoice.amount
        );

        invoice
    }

    fn extract_status(&self, text: &str) -> String {
        match self.capture(DocumentField::Status, text) {
            Some(phrase) => self
                .classifier
                .infer(phrase)
                .map(|s| s.to_string())
                .unwrap_or_else(|| phrase.to_string()),
            None => self
                .classifier
                .infer(text)
                .unwrap_or(PaymentStatus::Undetermined)
                .to_string(),
        }
    }

    fn capture<'t>(&self, field: DocumentField, text: &'t str) -> Option<&'t str> {
        self.rules
            .iter()
            .filter(|rule| rule.field == field)
            .find_map(|rule| rule.pattern.captures(text).and_then(|caps| caps.get(1)))
            .map(|m| m.as_str().trim())
            .filter(|value| !value.is_empty())
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_extract_labelled_document() {
        let extractor = DocumentExtractor::new();
        let invoice = extractor
            .extract_text("Factura Nº: A-001\nCliente: ACME\nEstado: No pagada\nTotal: 1.234,56€");

        assert_eq!(invoice.invoice_number, "A-001");
        assert_eq!(invoice.client, "ACME");
        assert_eq!(invoice.status, "Unpaid");
        assert_eq!(invoice.amount, Decimal::from_str("1234.56").unwrap());
        assert_eq!(invoice.source, "document");
    }

    #[test]
    fn test_extract_joins_pages() {
        let extractor = DocumentExtractor::new();
        let pages = ["FACTURA n° f-17/2024\nRazón social: Beta SA", "", "Total a pagar: 99,90 €"];
        let invoice = extractor.extract(&pages);

        assert_eq!(invoice.invoice_number, "F-17/2024");
        assert_eq!(invoice.client, "Beta SA");
        assert_eq!(invoice.amount, Decimal::from_str("99.90").unwrap());
    }

    #[test]
    fn test_unrecognised_status_phrase_is_kept() {
        let extractor = DocumentExtractor::new();
        let invoice = extractor.extract_text("Forma de pago: transferencia\nTotal: 10");
        assert_eq!(invoice.status, "transferencia");
    }

    #[test]
    fn test_status_inferred_from_whole_text() {
        let extractor = DocumentExtractor::new();
        let invoice = extractor.extract_text("Factura 12\nEsta factura figura como PAGADA.");
        assert_eq!(invoice.status, "Paid");
    }

    #[test]
    fn test_invoice_number_skips_prose() {
        let extractor = DocumentExtractor::new();
        let invoice = extractor.extract_text("Esta factura figura como PAGADA.\nFactura 12");
        assert_eq!(invoice.invoice_number, "12");
    }

    #[test]
    fn test_fallbacks_when_nothing_matches() {
        let extractor = DocumentExtractor::new();
        let invoice = extractor.extract_text("lorem ipsum dolor sit amet");

        assert_eq!(invoice, ExtractedInvoice::default());
    }

    #[test]
    fn test_unparsable_amount_falls_back_to_zero() {
        let extractor = DocumentExtractor::new();
        let invoice = extractor.extract_text("Cliente: ACME\nTotal: 1.2.3");
        assert_eq!(invoice.client, "ACME");
        assert_eq!(invoice.amount, Decimal::ZERO);
    }

    #[test]
    fn test_custom_rule_extends_field() {
        let extractor = DocumentExtractor::new().with_rule(ExtractionRule::new(
            DocumentField::Client,
            Regex::new(r"(?i)customer:[ \t]*(\S[^\r\n]*)").unwrap(),
        ));
        let invoice = extractor.extract_text("Customer: Gamma Ltd");
        assert_eq!(invoice.client, "Gamma Ltd");
    }
}
