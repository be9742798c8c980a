//! Reconciliation of total, paid and outstanding amounts.

use rust_decimal::Decimal;
use tracing::warn;

use super::columns::ResolvedColumns;
use crate::invoice::rules::parse_amount;
use crate::models::invoice::PaymentClass;
use crate::models::record::RawRecord;

/// Per-record monetary triple. `None` marks an absent amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciledAmounts {
    pub total: Option<Decimal>,
    pub paid: Option<Decimal>,
    pub outstanding: Option<Decimal>,
}

impl ReconciledAmounts {
    pub fn new(total: Option<Decimal>, paid: Option<Decimal>, outstanding: Option<Decimal>) -> Self {
        Self {
            total,
            paid,
            outstanding,
        }
    }

    /// Parse the resolved amount columns of a record. Unresolved columns
    /// leave the corresponding amount absent.
    pub fn from_record(record: &RawRecord, columns: &ResolvedColumns) -> Self {
        let parse = |column: &Option<String>| {
            column
                .as_deref()
                .and_then(|c| parse_amount(record.value(c)))
        };

        Self::new(
            parse(&columns.total),
            parse(&columns.paid),
            parse(&columns.outstanding),
        )
    }

    /// Fill in paid or outstanding when it is the only absent field.
    ///
    /// The total is never derived, and a complete triple is trusted as is.
    /// A difference that overflows leaves the field absent.
    pub fn reconcile(self) -> Self {
        let mut out = self;
        if let (Some(total), None, Some(outstanding)) = (out.total, out.paid, out.outstanding) {
            out.paid = total.checked_sub(outstanding);
            if out.paid.is_none() {
                warn!("Paid amount overflows: {} - {}", total, outstanding);
            }
        }
        if let (Some(total), Some(paid), None) = (out.total, out.paid, out.outstanding) {
            out.outstanding = total.checked_sub(paid);
            if out.outstanding.is_none() {
                warn!("Outstanding amount overflows: {} - {}", total, paid);
            }
        }
        out
    }

    /// Bucket for these amounts given a rounding tolerance.
    ///
    /// Checked in order paid, partially paid, unpaid, so exactly one bucket
    /// applies. Without a total the record is undetermined.
    pub fn classify(&self, tolerance: Decimal) -> PaymentClass {
        let Some(total) = self.total else {
            return PaymentClass::Undetermined;
        };

        let threshold = total.checked_sub(tolerance).unwrap_or(Decimal::MIN);
        match self.paid {
            Some(paid) if paid >= threshold => PaymentClass::Paid,
            Some(paid) if paid > tolerance => PaymentClass::PartiallyPaid,
            _ => PaymentClass::Unpaid,
        }
    }
}
