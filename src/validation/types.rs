//! Report types shared by all rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::PanelId;

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Must be fixed before the design can be cut.
    Error,
    /// Advisory; may be intentional.
    Warning,
}

/// A single finding of one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Stable id of the rule that produced it.
    pub rule: String,
    pub severity: Severity,
    pub panel: Option<PanelId>,
    /// Second panel for pairwise findings.
    pub other: Option<PanelId>,
    pub message: String,
    /// Measured value (overlap depth, extension length, ...).
    pub value: Option<f64>,
    /// Threshold the value was compared against.
    pub tolerance: Option<f64>,
}

impl Violation {
    #[must_use]
    pub fn error(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            severity: Severity::Error,
            panel: None,
            other: None,
            message: message.into(),
            value: None,
            tolerance: None,
        }
    }

    #[must_use]
    pub fn warning(rule: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(rule, message)
        }
    }

    #[must_use]
    pub fn on(mut self, panel: PanelId) -> Self {
        self.panel = Some(panel);
        self
    }

    #[must_use]
    pub fn with(mut self, other: PanelId) -> Self {
        self.other = Some(other);
        self
    }

    #[must_use]
    pub fn measured(mut self, value: f64, tolerance: f64) -> Self {
        self.value = Some(value);
        self.tolerance = Some(tolerance);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
        };
        write!(f, "[{sev}] {}", self.rule)?;
        if let Some(p) = &self.panel {
            write!(f, " {p}")?;
        }
        if let Some(p) = &self.other {
            write!(f, " / {p}")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(v) = self.value {
            write!(f, " value={v:.3}")?;
        }
        if let Some(t) = self.tolerance {
            write!(f, " tol={t:.3}")?;
        }
        Ok(())
    }
}

/// Counts describing what a validation run covered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub rules_run: usize,
    pub panels: usize,
    pub panel_pairs: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Aggregate result of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// `true` when there are no errors (warnings allowed).
    pub valid: bool,
    pub errors: Vec<Violation>,
    pub warnings: Vec<Violation>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    /// Errors produced by one rule.
    #[must_use]
    pub fn errors_of(&self, rule: &str) -> Vec<&Violation> {
        self.errors.iter().filter(|v| v.rule == rule).collect()
    }

    /// Warnings produced by one rule.
    #[must_use]
    pub fn warnings_of(&self, rule: &str) -> Vec<&Violation> {
        self.warnings.iter().filter(|v| v.rule == rule).collect()
    }

    #[must_use]
    pub fn no_errors_of(&self, rule: &str) -> bool {
        !self.errors.iter().any(|v| v.rule == rule)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::format::format_report(self))
    }
}
