//! Invoice-level result types.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::record::RawRecord;

/// Placeholder for a field the document extractor could not find.
pub const UNKNOWN: &str = "UNKNOWN";

/// Source tag attached to records produced from unstructured documents.
pub const DOCUMENT_SOURCE: &str = "document";

/// Verdict of the status classifier for a free-text status phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Undetermined,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Undetermined => "Undetermined",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket a record ends up in after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentClass {
    /// Fully collected.
    Paid,
    /// Some amount collected, some outstanding.
    PartiallyPaid,
    /// Nothing collected.
    Unpaid,
    /// The active mode could not place the record.
    Undetermined,
}

impl fmt::Display for PaymentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentClass::Paid => "paid",
            PaymentClass::PartiallyPaid => "partially paid",
            PaymentClass::Unpaid => "unpaid",
            PaymentClass::Undetermined => "undetermined",
        })
    }
}

/// Single invoice recovered from an unstructured document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    /// Invoice number, uppercased, or `UNKNOWN`.
    pub invoice_number: String,

    /// Client name, or `UNKNOWN`.
    pub client: String,

    /// `Paid`/`Unpaid` when inferred, the raw status phrase when it could
    /// not be, `Undetermined` when no status was found at all.
    pub status: String,

    /// Total amount, 0 when not found.
    pub amount: Decimal,

    /// Always `document`.
    pub source: String,
}

impl Default for ExtractedInvoice {
    fn default() -> Self {
        Self {
            invoice_number: UNKNOWN.to_string(),
            client: UNKNOWN.to_string(),
            status: PaymentStatus::Undetermined.to_string(),
            amount: Decimal::ZERO,
            source: DOCUMENT_SOURCE.to_string(),
        }
    }
}

impl ExtractedInvoice {
    /// Convert into a raw record so it can join a tabular record set.
    pub fn to_record(&self) -> RawRecord {
        RawRecord::new()
            .with("invoice_number", self.invoice_number.as_str())
            .with("client", self.client.as_str())
            .with("status", self.status.as_str())
            .with("amount", self.amount)
            .with("source", self.source.as_str())
    }

    /// Names of the fields that fell back to their default value.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.invoice_number == UNKNOWN {
            missing.push("invoice_number");
        }
        if self.client == UNKNOWN {
            missing.push("client");
        }
        if self.status == PaymentStatus::Undetermined.as_str() {
            missing.push("status");
        }
        if self.amount.is_zero() {
            missing.push("amount");
        }
        missing
    }
}
