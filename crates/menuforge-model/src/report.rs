use serde::{Deserialize, Serialize};

/// Severity of a validation finding.
///
/// Only blocking findings drive the retry path; warnings are surfaced but
/// never prevent the workflow from succeeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blocking,
    Warning,
}

/// A single validation finding, located within the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    /// File path (optionally `path:line`) the finding refers to.
    pub location: String,
    pub message: String,
}

impl Issue {
    #[must_use]
    pub fn blocking(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Blocking,
            location: location.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Outcome of one validator run over a [`crate::CodeArtifact`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    #[must_use]
    pub fn blocking_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Blocking)
            .count()
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.blocking_count()
    }

    /// True when the report carries no blocking findings. Warnings do not
    /// affect cleanliness.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.blocking_count() == 0
    }

    pub fn blocking_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Blocking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_make_a_report_dirty() {
        let report = ValidationReport::new(vec![
            Issue::warning("src/extra.css", "empty file"),
            Issue::warning("src/App.jsx", "route without matching category"),
        ]);
        assert!(report.is_clean());
        assert_eq!(report.warning_count(), 2);
    }

    #[test]
    fn blocking_issues_are_counted_separately() {
        let report = ValidationReport::new(vec![
            Issue::blocking("src/App.jsx", "missing route for category 'Mains'"),
            Issue::warning("src/extra.css", "empty file"),
        ]);
        assert!(!report.is_clean());
        assert_eq!(report.blocking_count(), 1);
        assert_eq!(report.blocking_issues().count(), 1);
    }
}
