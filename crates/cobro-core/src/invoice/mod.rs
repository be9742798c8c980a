//! Invoice-level extraction: status classification and document fields.

mod extractor;
pub mod rules;

pub use extractor::{DocumentExtractor, DocumentField, ExtractionRule, DOCUMENT_RULES};
pub use rules::StatusClassifier;
