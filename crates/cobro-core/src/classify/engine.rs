//! Classification engine: amount mode and status mode.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::columns::{ColumnResolver, ResolvedColumns};
use super::reconcile::ReconciledAmounts;
use crate::error::ClassificationError;
use crate::invoice::rules::StatusClassifier;
use crate::models::config::{CobroConfig, UndeterminedPolicy};
use crate::models::invoice::{PaymentClass, PaymentStatus};
use crate::models::record::{CellValue, RawRecord, RecordSet};

/// Derived column holding the parsed total.
pub const TOTAL_COLUMN: &str = "Total";
/// Derived column holding the reconciled paid amount.
pub const PAID_COLUMN: &str = "Paid";
/// Derived column holding the reconciled outstanding amount.
pub const PENDING_COLUMN: &str = "Pending";
/// Derived column holding the status verdict.
pub const STATUS_COLUMN: &str = "Status";

/// Strategy chosen for a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    /// Monetary columns: total, paid, outstanding.
    Amount,
    /// Free-text status column.
    Status,
}

impl fmt::Display for ClassificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationMode::Amount => write!(f, "amount"),
            ClassificationMode::Status => write!(f, "status"),
        }
    }
}

/// Number of records in each partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartitionCounts {
    pub paid: usize,
    pub partial: usize,
    pub unpaid: usize,
    pub unclassified: usize,
}

impl PartitionCounts {
    pub fn total(&self) -> usize {
        self.paid + self.partial + self.unpaid + self.unclassified
    }
}

/// Result of a classification run.
///
/// Every input record appears in exactly one partition, in input order,
/// with the derived columns of the chosen mode attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub mode: ClassificationMode,
    pub columns: ResolvedColumns,
    pub paid: RecordSet,
    pub partial: RecordSet,
    pub unpaid: RecordSet,
    pub unclassified: RecordSet,
}

impl Classification {
    fn empty(mode: ClassificationMode, columns: ResolvedColumns, schema: Vec<String>) -> Self {
        let set = RecordSet::with_columns(schema);
        Self {
            mode,
            columns,
            paid: set.clone(),
            partial: set.clone(),
            unpaid: set.clone(),
            unclassified: set,
        }
    }

    /// Partition holding records of the given class. Undetermined records
    /// live in the unclassified partition.
    pub fn partition(&self, class: PaymentClass) -> &RecordSet {
        match class {
            PaymentClass::Paid => &self.paid,
            PaymentClass::PartiallyPaid => &self.partial,
            PaymentClass::Unpaid => &self.unpaid,
            PaymentClass::Undetermined => &self.unclassified,
        }
    }

    fn partition_mut(&mut self, class: PaymentClass) -> &mut RecordSet {
        match class {
            PaymentClass::Paid => &mut self.paid,
            PaymentClass::PartiallyPaid => &mut self.partial,
            PaymentClass::Unpaid => &mut self.unpaid,
            PaymentClass::Undetermined => &mut self.unclassified,
        }
    }

    pub fn counts(&self) -> PartitionCounts {
        PartitionCounts {
            paid: self.paid.len(),
            partial: self.partial.len(),
            unpaid: self.unpaid.len(),
            unclassified: self.unclassified.len(),
        }
    }

    /// Partitions with their conventional export names.
    pub fn named_partitions(&self) -> [(&'static str, &RecordSet); 4] {
        [
            ("paid", &self.paid),
            ("partial", &self.partial),
            ("unpaid", &self.unpaid),
            ("unclassified", &self.unclassified),
        ]
    }
}

/// Classifies a record set into paid, partially paid and unpaid partitions.
///
/// Amount mode is used whenever a total column resolves; status mode
/// otherwise. The engine holds only immutable configuration and can be
/// shared between threads.
#[derive(Debug, Clone)]
pub struct ClassificationEngine {
    resolver: ColumnResolver,
    classifier: StatusClassifier,
    tolerance: Decimal,
    undetermined: UndeterminedPolicy,
    status_column: Option<String>,
}

impl ClassificationEngine {
    /// Create an engine with default candidates, vocabulary and tolerance.
    pub fn new() -> Self {
        Self {
            resolver: ColumnResolver::new(),
            classifier: StatusClassifier::default(),
            tolerance: Decimal::new(1, 2),
            undetermined: UndeterminedPolicy::default(),
            status_column: None,
        }
    }

    /// Create an engine from configuration.
    pub fn from_config(config: &CobroConfig) -> Self {
        Self {
            resolver: ColumnResolver::from_config(&config.columns),
            classifier: StatusClassifier::from_config(&config.vocabulary),
            tolerance: config.classification.tolerance.abs(),
            undetermined: config.classification.undetermined,
            status_column: config.classification.status_column.clone(),
        }
    }

    pub fn with_resolver(mut self, resolver: ColumnResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_classifier(mut self, classifier: StatusClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    pub fn with_undetermined_policy(mut self, policy: UndeterminedPolicy) -> Self {
        self.undetermined = policy;
        self
    }

    /// Use this column for status mode when it exists in the input.
    pub fn with_status_column(mut self, column: impl Into<String>) -> Self {
        self.status_column = Some(column.into());
        self
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    /// Resolve columns and pick the mode without classifying any record.
    pub fn plan(
        &self,
        records: &RecordSet,
    ) -> Result<(ClassificationMode, ResolvedColumns), ClassificationError> {
        let mut columns = self.resolver.resolve(records.columns());

        if let Some(column) = &self.status_column {
            if records.has_column(column) {
                columns.status = Some(column.clone());
            } else {
                warn!("Status column {:?} not found, using resolved column", column);
            }
        }

        debug!("Resolved columns: {:?}", columns);

        if columns.total.is_some() {
            Ok((ClassificationMode::Amount, columns))
        } else if columns.status.is_some() {
            Ok((ClassificationMode::Status, columns))
        } else {
            Err(ClassificationError::NoClassificationBasis {
                columns: records.columns().to_vec(),
            })
        }
    }

    /// Classify every record of the set.
    pub fn classify(&self, records: &RecordSet) -> Result<Classification, ClassificationError> {
        let (mode, columns) = self.plan(records)?;

        let result = match mode {
            ClassificationMode::Amount => self.classify_amounts(records, columns),
            ClassificationMode::Status => self.classify_statuses(records, columns),
        };

        let counts = result.counts();
        info!(
            "Classified {} records by {}: {} paid, {} partial, {} unpaid, {} unclassified",
            records.len(),
            mode,
            counts.paid,
            counts.partial,
            counts.unpaid,
            counts.unclassified
        );

        Ok(result)
    }

    fn classify_amounts(&self, records: &RecordSet, columns: ResolvedColumns) -> Classification {
        let schema = derived_schema(records, &[TOTAL_COLUMN, PAID_COLUMN, PENDING_COLUMN]);
        let mut result = Classification::empty(ClassificationMode::Amount, columns, schema);

        let mut absent_totals = 0;
        for (index, record) in records.iter().enumerate() {
            let amounts = ReconciledAmounts::from_record(record, &result.columns).reconcile();
            let class = amounts.classify(self.tolerance);
            trace!("Record {} classified as {} ({:?})", index, class, amounts);

            if class == PaymentClass::Undetermined {
                absent_totals += 1;
            }

            let row = record
                .clone()
                .with(TOTAL_COLUMN, amounts.total)
                .with(PAID_COLUMN, amounts.paid)
                .with(PENDING_COLUMN, amounts.outstanding);
            result.partition_mut(class).push(row);
        }

        if absent_totals > 0 {
            warn!(
                "{} records without a readable total left unclassified",
                absent_totals
            );
        }

        result
    }

    fn classify_statuses(&self, records: &RecordSet, columns: ResolvedColumns) -> Classification {
        let schema = derived_schema(records, &[STATUS_COLUMN]);
        let mut result = Classification::empty(ClassificationMode::Status, columns, schema);
        let status_column = result.columns.status.clone().unwrap_or_default();

        for (index, record) in records.iter().enumerate() {
            let status = self.classifier.classify_value(record.value(&status_column));
            let class = match status {
                PaymentStatus::Paid => PaymentClass::Paid,
                PaymentStatus::Unpaid => PaymentClass::Unpaid,
                PaymentStatus::Undetermined => match self.undetermined {
                    UndeterminedPolicy::Partial => PaymentClass::PartiallyPaid,
                    UndeterminedPolicy::Separate => PaymentClass::Undetermined,
                },
            };
            trace!("Record {} status {} placed as {}", index, status, class);

            let row: RawRecord = record
                .clone()
                .with(STATUS_COLUMN, CellValue::text(status.as_str()));
            result.partition_mut(class).push(row);
        }

        result
    }
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn derived_schema(records: &RecordSet, derived: &[&str]) -> Vec<String> {
    let mut schema = records.columns().to_vec();
    for column in derived {
        if !schema.iter().any(|c| c == column) {
            schema.push(column.to_string());
        }
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn invoices() -> RecordSet {
        RecordSet::from_records(vec![
            RawRecord::new().with("cliente", "A").with("total", 100i64).with("pagado", 100i64),
            RawRecord::new().with("cliente", "B").with("total", 100i64).with("pagado", 40i64),
            RawRecord::new().with("cliente", "C").with("total", 100i64).with("pagado", 0i64),
        ])
    }

    #[test]
    fn test_amount_mode_end_to_end() {
        let engine = ClassificationEngine::new();
        let result = engine.classify(&invoices()).unwrap();

        assert_eq!(result.mode, ClassificationMode::Amount);
        assert_eq!(result.counts(), PartitionCounts { paid: 1, partial: 1, unpaid: 1, unclassified: 0 });

        let pending = |set: &RecordSet| set.records()[0].value(PENDING_COLUMN).clone();
        assert_eq!(pending(&result.paid), CellValue::Number(dec("0")));
        assert_eq!(pending(&result.partial), CellValue::Number(dec("60")));
        assert_eq!(pending(&result.unpaid), CellValue::Number(dec("100")));

        assert_eq!(result.partial.records()[0].value("cliente"), &CellValue::text("B"));
        assert_eq!(
            result.paid.columns(),
            ["cliente", "pagado", "total", "Total", "Paid", "Pending"]
        );
    }

    #[test]
    fn test_amount_mode_parses_text_amounts() {
        let records = RecordSet::from_records(vec![
            RawRecord::new().with("importe", "1.234,56 €").with("pendiente", "234,56"),
        ]);
        let result = ClassificationEngine::new().classify(&records).unwrap();

        let row = &result.partial.records()[0];
        assert_eq!(row.value(PAID_COLUMN), &CellValue::Number(dec("1000.00")));
        assert_eq!(row.value(TOTAL_COLUMN), &CellValue::Number(dec("1234.56")));
    }

    #[test]
    fn test_absent_total_goes_to_unclassified() {
        let records = RecordSet::from_records(vec![
            RawRecord::new().with("total", "n/a").with("pagado", 10i64),
            RawRecord::new().with("total", 10i64).with("pagado", 10i64),
        ]);
        let result = ClassificationEngine::new().classify(&records).unwrap();

        assert_eq!(result.counts(), PartitionCounts { paid: 1, partial: 0, unpaid: 0, unclassified: 1 });
        assert!(result.partition(PaymentClass::Undetermined).records()[0]
            .value(TOTAL_COLUMN)
            .is_absent());
    }

    #[test]
    fn test_overflowing_amounts_do_not_abort_run() {
        let records = RecordSet::from_records(vec![
            RawRecord::new().with("total", "79228162514264337593543950335").with("pendiente", "-1"),
            RawRecord::new().with("total", 10i64).with("pendiente", 0i64),
        ]);
        let result = ClassificationEngine::new().classify(&records).unwrap();

        assert_eq!(result.counts(), PartitionCounts { paid: 1, partial: 0, unpaid: 1, unclassified: 0 });
        assert!(result.unpaid.records()[0].value(PAID_COLUMN).is_absent());
    }

    #[test]
    fn test_classification_is_idempotent() {
        let engine = ClassificationEngine::new();
        let records = invoices();

        let first = engine.classify(&records).unwrap();
        let second = engine.classify(&records).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_status_mode() {
        let records = RecordSet::from_records(vec![
            RawRecord::new().with("cliente", "A").with("estado", "Pagada"),
            RawRecord::new().with("cliente", "B").with("estado", "No pagada"),
            RawRecord::new().with("cliente", "C").with("estado", "en trámite"),
            RawRecord::new().with("cliente", "D"),
        ]);
        let result = ClassificationEngine::new().classify(&records).unwrap();

        assert_eq!(result.mode, ClassificationMode::Status);
        assert_eq!(result.columns.status.as_deref(), Some("estado"));
        assert_eq!(result.counts(), PartitionCounts { paid: 1, partial: 1, unpaid: 2, unclassified: 0 });
        assert_eq!(result.partial.records()[0].value(STATUS_COLUMN), &CellValue::text("Undetermined"));
        assert_eq!(result.unpaid.records()[1].value("cliente"), &CellValue::text("D"));
    }

    #[test]
    fn test_separate_undetermined_policy() {
        let records = RecordSet::from_records(vec![
            RawRecord::new().with("status", "processing"),
            RawRecord::new().with("status", "paid"),
        ]);
        let engine = ClassificationEngine::new().with_undetermined_policy(UndeterminedPolicy::Separate);
        let result = engine.classify(&records).unwrap();

        assert_eq!(result.counts(), PartitionCounts { paid: 1, partial: 0, unpaid: 0, unclassified: 1 });
    }

    #[test]
    fn test_status_column_override() {
        let records = RecordSet::from_records(vec![
            RawRecord::new().with("estado", "pagada").with("situacion", "impagada"),
        ]);
        let engine = ClassificationEngine::new().with_status_column("situacion");
        let result = engine.classify(&records).unwrap();

        assert_eq!(result.columns.status.as_deref(), Some("situacion"));
        assert_eq!(result.counts().unpaid, 1);
    }

    #[test]
    fn test_missing_override_falls_back_to_resolved_column() {
        let records = RecordSet::from_records(vec![RawRecord::new().with("estado", "pagada")]);
        let engine = ClassificationEngine::new().with_status_column("situacion");
        let result = engine.classify(&records).unwrap();

        assert_eq!(result.columns.status.as_deref(), Some("estado"));
        assert_eq!(result.counts().paid, 1);
    }

    #[test]
    fn test_amount_mode_takes_precedence() {
        let records = RecordSet::from_records(vec![
            RawRecord::new().with("estado", "pagada").with("total", 50i64),
        ]);
        let result = ClassificationEngine::new().classify(&records).unwrap();

        assert_eq!(result.mode, ClassificationMode::Amount);
        assert_eq!(result.counts().unpaid, 1);
    }

    #[test]
    fn test_no_classification_basis() {
        let records = RecordSet::from_records(vec![
            RawRecord::new().with("cliente", "A").with("fecha", "2024-01-01"),
        ]);
        let err = ClassificationEngine::new().classify(&records).unwrap_err();

        assert_eq!(
            err,
            ClassificationError::NoClassificationBasis {
                columns: vec!["cliente".to_string(), "fecha".to_string()],
            }
        );
    }

    #[test]
    fn test_empty_input_with_basis_is_empty_result() {
        let records = RecordSet::with_columns(["total"]);
        let result = ClassificationEngine::new().classify(&records).unwrap();
        assert_eq!(result.counts().total(), 0);
    }

    #[test]
    fn test_configured_tolerance() {
        let mut config = CobroConfig::default();
        config.classification.tolerance = dec("-5");
        let engine = ClassificationEngine::from_config(&config);

        assert_eq!(engine.tolerance(), dec("5"));
        let records = RecordSet::from_records(vec![RawRecord::new().with("total", 100i64).with("pagado", 96i64)]);
        assert_eq!(engine.classify(&records).unwrap().counts().paid, 1);
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClassificationEngine>();
    }
}
