//! Rule-based building blocks: amounts, text normalization, status
//! vocabulary and document field patterns.

pub mod amounts;
pub mod patterns;
pub mod status;
pub mod text;

pub use amounts::{parse_amount, parse_amount_str};
pub use status::{StatusClassifier, PAID_TERMS, UNPAID_TERMS};
pub use text::{normalize_status_text, normalize_text, normalize_value, strip_diacritics};
