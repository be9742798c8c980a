//! Column resolution by semantic role.

use serde::Serialize;
use tracing::debug;

use crate::invoice::rules::normalize_text;
use crate::models::config::ColumnConfig;

pub const TOTAL_CANDIDATES: &[&str] =
    &["total", "importe", "monto", "amount", "total_factura", "importe_total"];
pub const PAID_CANDIDATES: &[&str] =
    &["pagado", "abonado", "pago", "paid", "importe_pagado", "monto_pagado"];
pub const OUTSTANDING_CANDIDATES: &[&str] =
    &["pendiente", "restante", "saldo", "due", "por_cobrar"];
pub const STATUS_CANDIDATES: &[&str] = &["estado", "status", "pag", "cob"];

/// Semantic role a column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Total,
    Paid,
    Outstanding,
    Status,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 4] = [
        ColumnRole::Total,
        ColumnRole::Paid,
        ColumnRole::Outstanding,
        ColumnRole::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Total => "total",
            ColumnRole::Paid => "paid",
            ColumnRole::Outstanding => "outstanding",
            ColumnRole::Status => "status",
        }
    }
}

/// Column chosen for each role, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedColumns {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outstanding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ResolvedColumns {
    pub fn get(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Total => self.total.as_deref(),
            ColumnRole::Paid => self.paid.as_deref(),
            ColumnRole::Outstanding => self.outstanding.as_deref(),
            ColumnRole::Status => self.status.as_deref(),
        }
    }

    fn set(&mut self, role: ColumnRole, column: Option<String>) {
        match role {
            ColumnRole::Total => self.total = column,
            ColumnRole::Paid => self.paid = column,
            ColumnRole::Outstanding => self.outstanding = column,
            ColumnRole::Status => self.status = column,
        }
    }
}

/// Finds, per role, the first column whose normalized name contains one of
/// the role's candidate terms.
///
/// Schema order decides ties; the order of candidate terms does not.
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    candidates: Vec<(ColumnRole, Vec<String>)>,
}

impl ColumnResolver {
    /// Create a resolver with the default candidate terms.
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
        .with_candidates(ColumnRole::Total, TOTAL_CANDIDATES)
        .with_candidates(ColumnRole::Paid, PAID_CANDIDATES)
        .with_candidates(ColumnRole::Outstanding, OUTSTANDING_CANDIDATES)
        .with_candidates(ColumnRole::Status, STATUS_CANDIDATES)
    }

    /// Create a resolver from configuration.
    pub fn from_config(config: &ColumnConfig) -> Self {
        Self::new()
            .with_candidates(ColumnRole::Total, &config.total)
            .with_candidates(ColumnRole::Paid, &config.paid)
            .with_candidates(ColumnRole::Outstanding, &config.outstanding)
            .with_candidates(ColumnRole::Status, &config.status)
    }

    /// Replace the candidate terms for a role. Empty terms are ignored.
    pub fn with_candidates<I, S>(mut self, role: ColumnRole, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(|t| normalize_text(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();

        match self.candidates.iter_mut().find(|(r, _)| *r == role) {
            Some((_, existing)) => *existing = terms,
            None => self.candidates.push((role, terms)),
        }
        self
    }

    /// Candidate terms for a role, normalized.
    pub fn candidates(&self, role: ColumnRole) -> &[String] {
        self.candidates
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, terms)| terms.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a single role against the available columns.
    pub fn resolve_role(&self, role: ColumnRole, columns: &[String]) -> Option<String> {
        let terms = self.candidates(role);
        columns
            .iter()
            .find(|column| {
                let name = normalize_text(column);
                terms.iter().any(|term| name.contains(term.as_str()))
            })
            .cloned()
    }

    /// Resolve every role independently.
    pub fn resolve(&self, columns: &[String]) -> ResolvedColumns {
        let mut resolved = ResolvedColumns::default();
        for role in ColumnRole::ALL {
            let column = self.resolve_role(role, columns);
            debug!("Column for {}: {:?}", role.as_str(), column);
            resolved.set(role, column);
        }
        resolved
    }
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_spanish_schema() {
        let resolver = ColumnResolver::new();
        let resolved = resolver.resolve(&columns(&["cliente", "total_factura", "pagado", "saldo"]));

        assert_eq!(resolved.total.as_deref(), Some("total_factura"));
        assert_eq!(resolved.paid.as_deref(), Some("pagado"));
        assert_eq!(resolved.outstanding.as_deref(), Some("saldo"));
        // "pag" also matches the paid column.
        assert_eq!(resolved.status.as_deref(), Some("pagado"));
    }

    #[test]
    fn test_first_column_in_schema_order_wins() {
        let resolver = ColumnResolver::new();
        let cols = columns(&["importe_pagado", "total"]);
        assert_eq!(resolver.resolve_role(ColumnRole::Total, &cols).as_deref(), Some("importe_pagado"));
    }

    #[test]
    fn test_roles_resolve_independently() {
        let resolver = ColumnResolver::new();
        let resolved = resolver.resolve(&columns(&["Cliente", "Amount Due"]));

        assert_eq!(resolved.total.as_deref(), Some("Amount Due"));
        assert_eq!(resolved.outstanding.as_deref(), Some("Amount Due"));
        assert_eq!(resolved.paid, None);
        assert_eq!(resolved.status, None);
    }

    #[test]
    fn test_no_match() {
        let resolver = ColumnResolver::new();
        assert_eq!(resolver.resolve(&columns(&["cliente", "fecha"])), ResolvedColumns::default());
    }

    #[test]
    fn test_custom_candidates() {
        let resolver = ColumnResolver::new().with_candidates(ColumnRole::Status, ["situacion", ""]);
        let cols = columns(&["estado", "situacion"]);

        assert_eq!(resolver.candidates(ColumnRole::Status), ["situacion"]);
        assert_eq!(resolver.resolve_role(ColumnRole::Status, &cols).as_deref(), Some("situacion"));
    }
}
