//! Configuration structures for the classification pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classify::columns::{
    OUTSTANDING_CANDIDATES, PAID_CANDIDATES, STATUS_CANDIDATES, TOTAL_CANDIDATES,
};
use crate::invoice::rules::status::{PAID_TERMS, UNPAID_TERMS};

/// Main configuration for the cobro pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CobroConfig {
    /// Classification engine configuration.
    pub classification: ClassificationConfig,

    /// Candidate terms used to find columns by role.
    pub columns: ColumnConfig,

    /// Status vocabulary.
    pub vocabulary: VocabularyConfig,

    /// Tabular ingestion configuration.
    pub ingest: IngestConfig,
}

/// Where status-mode records with an undetermined status go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndeterminedPolicy {
    /// Fold them into the partially-paid partition.
    #[default]
    Partial,
    /// Keep them in the separate unclassified partition.
    Separate,
}

/// Classification engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Rounding margin in currency units when comparing paid with total.
    pub tolerance: Decimal,

    /// Routing of undetermined statuses.
    pub undetermined: UndeterminedPolicy,

    /// Status column to use in status mode instead of the resolved one.
    pub status_column: Option<String>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(1, 2),
            undetermined: UndeterminedPolicy::Partial,
            status_column: None,
        }
    }
}

/// Candidate substrings per column role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub total: Vec<String>,
    pub paid: Vec<String>,
    pub outstanding: Vec<String>,
    pub status: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            total: to_strings(TOTAL_CANDIDATES),
            paid: to_strings(PAID_CANDIDATES),
            outstanding: to_strings(OUTSTANDING_CANDIDATES),
            status: to_strings(STATUS_CANDIDATES),
        }
    }
}

/// Terms indicating a paid or an unpaid invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub paid: Vec<String>,
    pub unpaid: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            paid: to_strings(PAID_TERMS),
            unpaid: to_strings(UNPAID_TERMS),
        }
    }
}

/// Tabular ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// CSV delimiters tried in order; the first yielding more than one
    /// column wins.
    pub delimiters: Vec<char>,

    /// Lowercase column names and join words with underscores.
    pub normalize_column_names: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiters: vec![',', ';', '\t', '|'],
            normalize_column_names: true,
        }
    }
}

fn to_strings(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

impl CobroConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CobroConfig =
            serde_json::from_str(r#"{"classification": {"undetermined": "separate"}}"#).unwrap();

        assert_eq!(config.classification.undetermined, UndeterminedPolicy::Separate);
        assert_eq!(config.classification.tolerance, Decimal::new(1, 2));
        assert!(config.columns.total.contains(&"importe".to_string()));
        assert_eq!(config.ingest.delimiters, vec![',', ';', '\t', '|']);
    }

    #[test]
    fn test_config_round_trips_through_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = CobroConfig::default();
        config.classification.status_column = Some("situacion".to_string());
        config.save(&path).unwrap();

        let loaded = CobroConfig::from_file(&path).unwrap();
        assert_eq!(loaded.classification.status_column.as_deref(), Some("situacion"));
        assert_eq!(loaded.vocabulary.unpaid, config.vocabulary.unpaid);
    }
}
