//! Record classification: column resolution, amount reconciliation and the
//! engine that partitions a record set.

pub mod columns;
mod engine;
mod reconcile;

pub use columns::{ColumnResolver, ColumnRole, ResolvedColumns};
pub use engine::{
    Classification, ClassificationEngine, ClassificationMode, PartitionCounts, PAID_COLUMN,
    PENDING_COLUMN, STATUS_COLUMN, TOTAL_COLUMN,
};
pub use reconcile::ReconciledAmounts;
