//! Aggregation and rendering of reconciliation results.
//!
//! A [`Report`] is a pure function of the result list: the same results
//! always produce the same counts, grouping and exit code. Categories
//! appear in order of first appearance and entries keep catalogue order
//! within their category.

pub mod human;
pub mod json;

use crate::reconcile::{FailureKind, Mode, Outcome, ReconcileResult};
use serde::Serialize;
use std::io::Write;

pub use human::HumanFormatter;
pub use json::JsonFormatter;

/// Exit code for an interrupted run (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Trait for rendering a report.
pub trait ReportFormatter {
    /// Write the report to the given writer.
    fn format<W: Write>(&self, report: &Report, writer: &mut W) -> std::io::Result<()>;
}

/// Number of entries per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub already_present: usize,
    pub installed: usize,
    pub failed: usize,
    pub skipped_no_backend: usize,
    pub missing: usize,
    pub interrupted: usize,
}

impl Counts {
    pub fn add(&mut self, outcome: Outcome) {
        *self.slot(outcome) += 1;
    }

    pub fn get(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::AlreadyPresent => self.already_present,
            Outcome::Installed => self.installed,
            Outcome::Failed => self.failed,
            Outcome::SkippedNoBackend => self.skipped_no_backend,
            Outcome::Missing => self.missing,
            Outcome::Interrupted => self.interrupted,
        }
    }

    pub fn total(&self) -> usize {
        Outcome::ALL.iter().map(|o| self.get(*o)).sum()
    }

    fn slot(&mut self, outcome: Outcome) -> &mut usize {
        match outcome {
            Outcome::AlreadyPresent => &mut self.already_present,
            Outcome::Installed => &mut self.installed,
            Outcome::Failed => &mut self.failed,
            Outcome::SkippedNoBackend => &mut self.skipped_no_backend,
            Outcome::Missing => &mut self.missing,
            Outcome::Interrupted => &mut self.interrupted,
        }
    }
}

/// Results of one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub name: String,
    pub counts: Counts,
    pub entries: Vec<ReconcileResult>,
}

/// Aggregated view of a run.
#[derive(Debug, Clone)]
pub struct Report {
    pub mode: Mode,
    /// Treat skipped entries as failures.
    pub strict: bool,
    pub counts: Counts,
    pub categories: Vec<CategoryReport>,
    /// Catalogue problems found while loading.
    pub catalogue_errors: Vec<String>,
}

impl Report {
    /// Aggregate results, preserving their order.
    pub fn build(mode: Mode, results: Vec<ReconcileResult>, strict: bool) -> Self {
        let mut counts = Counts::default();
        let mut categories: Vec<CategoryReport> = Vec::new();

        for result in results {
            counts.add(result.outcome);
            let idx = match categories.iter().position(|c| c.name == result.category) {
                Some(idx) => idx,
                None => {
                    categories.push(CategoryReport {
                        name: result.category.clone(),
                        counts: Counts::default(),
                        entries: Vec::new(),
                    });
                    categories.len() - 1
                }
            };
            categories[idx].counts.add(result.outcome);
            categories[idx].entries.push(result);
        }

        Self {
            mode,
            strict,
            counts,
            categories,
            catalogue_errors: Vec::new(),
        }
    }

    pub fn with_catalogue_errors(mut self, errors: Vec<String>) -> Self {
        self.catalogue_errors = errors;
        self
    }

    /// All results in order.
    pub fn results(&self) -> impl Iterator<Item = &ReconcileResult> {
        self.categories.iter().flat_map(|c| c.entries.iter())
    }

    /// Whether cancellation cut the run short.
    pub fn interrupted(&self) -> bool {
        self.counts.interrupted > 0
            || self
                .results()
                .any(|r| r.failure == Some(FailureKind::Cancelled))
    }

    /// Process exit code for this run.
    ///
    /// 130 when interrupted; 1 on failures, missing tools, or skips under
    /// strict mode; 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.interrupted() {
            EXIT_INTERRUPTED
        } else if self.counts.failed > 0
            || self.counts.missing > 0
            || (self.strict && self.counts.skipped_no_backend > 0)
        {
            1
        } else {
            0
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, category: &str, outcome: Outcome) -> ReconcileResult {
        ReconcileResult::new(name, category, outcome)
    }

    #[test]
    fn single_install_exits_zero() {
        let report = Report::build(
            Mode::Install,
            vec![result("foo", "build", Outcome::Installed)],
            false,
        );
        assert_eq!(report.counts.installed, 1);
        assert_eq!(report.counts.failed, 0);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn skip_is_ok_unless_strict() {
        let results = vec![result("foo", "build", Outcome::SkippedNoBackend)];
        assert_eq!(Report::build(Mode::Install, results.clone(), false).exit_code(), 0);
        assert_eq!(Report::build(Mode::Install, results, true).exit_code(), 1);
    }

    #[test]
    fn failure_exits_one() {
        let report = Report::build(
            Mode::Install,
            vec![
                result("a", "build", Outcome::Installed),
                ReconcileResult::failed("b", "build", FailureKind::InstallFailed),
            ],
            false,
        );
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn missing_exits_one() {
        let report = Report::build(
            Mode::Check,
            vec![result("a", "build", Outcome::Missing)],
            false,
        );
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn interruption_wins() {
        let report = Report::build(
            Mode::Install,
            vec![
                ReconcileResult::failed("a", "build", FailureKind::InstallFailed),
                result("b", "build", Outcome::Interrupted),
            ],
            false,
        );
        assert_eq!(report.exit_code(), EXIT_INTERRUPTED);

        let cancelled = Report::build(
            Mode::Install,
            vec![ReconcileResult::failed("a", "build", FailureKind::Cancelled)],
            false,
        );
        assert!(cancelled.interrupted());
    }

    #[test]
    fn groups_by_first_appearance_keeping_order() {
        let report = Report::build(
            Mode::Install,
            vec![
                result("git", "build", Outcome::AlreadyPresent),
                result("rustup", "rust", Outcome::AlreadyPresent),
                result("just", "build", Outcome::Installed),
                result("gdb", "debugging", Outcome::SkippedNoBackend),
                result("cargo-deny", "rust", Outcome::Installed),
            ],
            false,
        );

        let layout: Vec<(&str, Vec<&str>)> = report
            .categories
            .iter()
            .map(|c| {
                (
                    c.name.as_str(),
                    c.entries.iter().map(|e| e.name.as_str()).collect(),
                )
            })
            .collect();
        assert_eq!(
            layout,
            vec![
                ("build", vec!["git", "just"]),
                ("rust", vec!["rustup", "cargo-deny"]),
                ("debugging", vec!["gdb"]),
            ]
        );
        assert_eq!(report.categories[0].counts.installed, 1);
        assert_eq!(report.counts.total(), 5);
    }

    #[test]
    fn empty_run_succeeds() {
        let report = Report::build(Mode::Install, vec![], true);
        assert!(report.success());
        assert!(report.categories.is_empty());
    }
}
