//! Rule-based validation of a snapshot.
//!
//! Each rule is a plain function from a snapshot to findings, registered
//! under a stable id. The registry runs them in order and folds the
//! findings into one [`ValidationReport`].

pub mod format;
pub mod rules;
pub mod types;

pub use format::format_report;
pub use types::{Severity, ValidationReport, ValidationSummary, Violation};

use tracing::{info, instrument};

use crate::config::KernelConfig;
use crate::engine::Snapshot;

/// Signature of a rule check.
pub type RuleCheck = fn(&Snapshot, &KernelConfig) -> Vec<Violation>;

/// A registered rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub description: &'static str,
    pub check: RuleCheck,
}

/// Ordered set of rules.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self {
            rules: rules::builtin(),
        }
    }
}

impl RuleRegistry {
    /// A registry without rules.
    #[must_use]
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule, replacing any rule with the same id.
    pub fn register(&mut self, rule: Rule) {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.id == rule.id) {
            *existing = rule;
        } else {
            self.rules.push(rule);
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.id)
    }

    /// Runs every rule.
    #[must_use]
    pub fn check(&self, snapshot: &Snapshot, config: &KernelConfig) -> ValidationReport {
        self.run(self.rules.iter(), snapshot, config)
    }

    /// Runs only the rules named in `ids`; unknown ids are ignored.
    #[must_use]
    pub fn check_only(&self, ids: &[&str], snapshot: &Snapshot, config: &KernelConfig) -> ValidationReport {
        self.run(self.rules.iter().filter(|r| ids.contains(&r.id)), snapshot, config)
    }

    #[instrument(skip_all, fields(revision = snapshot.revision))]
    fn run<'a>(
        &self,
        rules: impl Iterator<Item = &'a Rule>,
        snapshot: &Snapshot,
        config: &KernelConfig,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in rules {
            report.summary.rules_run += 1;
            for v in (rule.check)(snapshot, config) {
                match v.severity {
                    Severity::Error => report.errors.push(v),
                    Severity::Warning => report.warnings.push(v),
                }
            }
        }
        let n = snapshot.panels.len();
        report.summary.panels = n;
        report.summary.panel_pairs = n * n.saturating_sub(1) / 2;
        report.summary.errors = report.errors.len();
        report.summary.warnings = report.warnings.len();
        report.valid = report.errors.is_empty();
        info!(
            valid = report.valid,
            errors = report.summary.errors,
            warnings = report.summary.warnings,
            "validation complete"
        );
        report
    }
}

/// Runs all built-in rules.
#[must_use]
pub fn check(snapshot: &Snapshot, config: &KernelConfig) -> ValidationReport {
    RuleRegistry::default().check(snapshot, config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tree::{MaterialConfig, Scene};

    #[test]
    fn rule_ids_are_stable() {
        let ids: Vec<&str> = RuleRegistry::default().ids().collect();
        assert_eq!(
            ids,
            vec![
                "geometry.consistency",
                "geometry.overlap",
                "geometry.conflicting-extensions",
                "dimensions.bounds",
                "joints.gender",
                "joints.finger-match",
                "paths.validity",
                "extensions.eligibility",
                "extensions.full-width",
                "extensions.far-edge-open",
                "extensions.corner-ownership",
                "extensions.long-fingers",
                "safe-space.validity",
            ]
        );
    }

    #[test]
    fn register_replaces_by_id() {
        fn nothing(_: &Snapshot, _: &KernelConfig) -> Vec<Violation> {
            vec![Violation::warning("dimensions.bounds", "replaced")]
        }
        let mut reg = RuleRegistry::default();
        reg.register(Rule {
            id: rules::DIMENSIONS_BOUNDS,
            description: "stub",
            check: nothing,
        });
        assert_eq!(reg.ids().count(), 13);

        let mut s = Scene::new();
        s.create_assembly(100.0, 100.0, 100.0, MaterialConfig::default()).unwrap();
        let snap = Snapshot::build(&s, &KernelConfig::default()).unwrap();
        let report = reg.check_only(&[rules::DIMENSIONS_BOUNDS], &snap, &KernelConfig::default());
        assert!(report.valid);
        assert_eq!(report.summary.rules_run, 1);
        assert_eq!(report.warnings.len(), 1);
    }
}
