//! Free-text payment status classification.

use tracing::trace;

use super::text::normalize_status_text;
use crate::models::config::VocabularyConfig;
use crate::models::invoice::PaymentStatus;
use crate::models::record::CellValue;

/// Terms indicating a paid invoice.
pub const PAID_TERMS: &[&str] = &[
    "pagada", "pagado", "cobrada", "cobrado", "paid", "si", "sí", "true", "1", "yes", "y",
];

/// Terms indicating an unpaid invoice. Checked before [`PAID_TERMS`].
pub const UNPAID_TERMS: &[&str] = &[
    "no pagada",
    "no pagado",
    "no cobrada",
    "no cobrado",
    "impaga",
    "impago",
    "pendiente",
    "vencida",
    "atrasada",
    "unpaid",
    "no",
    "false",
    "0",
    "n",
    "",
];

/// Terms shorter than this are cell codes ("si", "0", "") and must equal the
/// whole status text; longer terms match anywhere inside it.
const MIN_PHRASE_LEN: usize = 3;

#[derive(Debug, Clone, Default)]
struct Vocabulary {
    codes: Vec<String>,
    phrases: Vec<String>,
}

impl Vocabulary {
    fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self::default();
        for term in terms {
            let term = normalize_status_text(term.as_ref());
            let bucket = if term.chars().count() < MIN_PHRASE_LEN {
                &mut vocab.codes
            } else {
                &mut vocab.phrases
            };
            if !bucket.contains(&term) {
                bucket.push(term);
            }
        }
        vocab
    }

    fn matches(&self, text: &str) -> Option<&str> {
        self.codes
            .iter()
            .find(|code| code.as_str() == text)
            .or_else(|| self.phrases.iter().find(|p| text.contains(p.as_str())))
            .map(String::as_str)
    }
}

/// Classifies status phrases against a paid and an unpaid vocabulary.
///
/// Unpaid terms win over paid terms, so "no pagada" is unpaid even though it
/// contains "pagada".
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    paid: Vocabulary,
    unpaid: Vocabulary,
}

impl StatusClassifier {
    /// Create a classifier from explicit vocabularies.
    pub fn new<P, U, S>(paid: P, unpaid: U) -> Self
    where
        P: IntoIterator<Item = S>,
        U: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            paid: Vocabulary::new(paid),
            unpaid: Vocabulary::new(unpaid),
        }
    }

    /// Create a classifier from configuration.
    pub fn from_config(config: &VocabularyConfig) -> Self {
        Self::new(&config.paid, &config.unpaid)
    }

    /// Classify a raw status phrase.
    pub fn classify(&self, text: &str) -> PaymentStatus {
        let text = normalize_status_text(text);

        if let Some(term) = self.unpaid.matches(&text) {
            trace!("Status {:?} matched unpaid term {:?}", text, term);
            return PaymentStatus::Unpaid;
        }
        if let Some(term) = self.paid.matches(&text) {
            trace!("Status {:?} matched paid term {:?}", text, term);
            return PaymentStatus::Paid;
        }
        PaymentStatus::Undetermined
    }

    /// Classify a raw cell; absent cells read as the empty string.
    pub fn classify_value(&self, value: &CellValue) -> PaymentStatus {
        self.classify(&value.as_text())
    }

    /// Paid or unpaid when the text says so, `None` otherwise.
    pub fn infer(&self, text: &str) -> Option<PaymentStatus> {
        match self.classify(text) {
            PaymentStatus::Undetermined => None,
            status => Some(status),
        }
    }
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new(PAID_TERMS, UNPAID_TERMS)
    }
}
