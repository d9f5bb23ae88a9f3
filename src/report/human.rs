//! Human-readable report formatter.
//!
//! Groups results by category with one line per entry and ends with a
//! summary line.

use super::{Report, ReportFormatter};
use crate::reconcile::{Mode, Outcome, ReconcileResult};
use crate::ui::{format_duration, StatusKind, Theme};
use std::io::Write;

/// Detail lines shown under a failed entry.
const DETAIL_LINES: usize = 8;

/// Formats reports for terminal display.
pub struct HumanFormatter {
    theme: Theme,
    /// Show details for every entry, not only failures.
    pub verbose: bool,
}

impl HumanFormatter {
    pub fn new(use_color: bool) -> Self {
        Self {
            theme: Theme::for_color(use_color),
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Short description of what happened to an entry.
    fn status_text(&self, result: &ReconcileResult) -> String {
        let via = result
            .backend
            .map(|b| format!(" via {}", b))
            .unwrap_or_default();
        match result.outcome {
            Outcome::AlreadyPresent => String::new(),
            Outcome::Installed => format!("installed{}", via),
            Outcome::Failed => {
                let kind = result
                    .failure
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "failed".to_string());
                format!("{}{}", kind, via)
            }
            Outcome::SkippedNoBackend => "no backend available".to_string(),
            Outcome::Missing => format!("missing, would install{}", via),
            Outcome::Interrupted => "interrupted".to_string(),
        }
    }

    fn write_entry<W: Write>(
        &self,
        result: &ReconcileResult,
        width: usize,
        writer: &mut W,
    ) -> std::io::Result<()> {
        let kind = StatusKind::from(result.outcome);
        let mut line = format!(
            "  {} {:<width$}",
            kind.styled(&self.theme),
            result.name,
            width = width
        );

        let status = self.status_text(result);
        if !status.is_empty() {
            let styled = match result.outcome {
                Outcome::Failed => self.theme.error.apply_to(status).to_string(),
                Outcome::Missing | Outcome::Interrupted => {
                    self.theme.warning.apply_to(status).to_string()
                }
                _ => self.theme.dim.apply_to(status).to_string(),
            };
            line.push_str("  ");
            line.push_str(&styled);
        }

        if let Some(version) = result.version {
            line.push_str(&format!("  {}", self.theme.duration.apply_to(version)));
        }

        if result.outcome == Outcome::Installed || result.outcome == Outcome::Failed {
            line.push_str(&format!(
                "  {}",
                self.theme
                    .duration
                    .apply_to(format!("({})", format_duration(result.duration)))
            ));
        }

        writeln!(writer, "{}", line.trim_end())?;

        let show_detail = self.verbose
            || matches!(result.outcome, Outcome::Failed | Outcome::SkippedNoBackend);
        if let Some(detail) = result.detail.as_deref().filter(|_| show_detail) {
            let lines: Vec<&str> = detail.lines().collect();
            let skip = lines.len().saturating_sub(DETAIL_LINES);
            for text in &lines[skip..] {
                writeln!(writer, "      {}", self.theme.dim.apply_to(text))?;
            }
        }

        Ok(())
    }

    fn summary_line(&self, report: &Report) -> String {
        let counts = &report.counts;
        let mut parts = vec![format!(
            "{} tool{}",
            counts.total(),
            if counts.total() == 1 { "" } else { "s" }
        )];

        let labelled = [
            (Outcome::AlreadyPresent, "present"),
            (Outcome::Installed, "installed"),
            (Outcome::Failed, "failed"),
            (Outcome::SkippedNoBackend, "skipped"),
            (Outcome::Missing, "missing"),
            (Outcome::Interrupted, "interrupted"),
        ];
        for (outcome, label) in labelled {
            let n = counts.get(outcome);
            if n > 0 || outcome == Outcome::AlreadyPresent {
                parts.push(format!("{} {}", n, label));
            }
        }

        parts.join(&format!(" {} ", self.theme.dim.apply_to("·")))
    }
}

impl ReportFormatter for HumanFormatter {
    fn format<W: Write>(&self, report: &Report, writer: &mut W) -> std::io::Result<()> {
        let width = report
            .results()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(0);

        for category in &report.categories {
            writeln!(writer, "{}", self.theme.format_header(&category.name))?;
            for result in &category.entries {
                self.write_entry(result, width, writer)?;
            }
            writeln!(writer)?;
        }

        if !report.catalogue_errors.is_empty() {
            writeln!(
                writer,
                "{}",
                self.theme.format_warning(&format!(
                    "{} catalogue entr{} excluded:",
                    report.catalogue_errors.len(),
                    if report.catalogue_errors.len() == 1 { "y" } else { "ies" }
                ))
            )?;
            for error in &report.catalogue_errors {
                writeln!(writer, "    {}", error)?;
            }
            writeln!(writer)?;
        }

        writeln!(writer, "{}", self.summary_line(report))?;

        let verdict = match report.exit_code() {
            0 if report.mode == Mode::Check => self.theme.format_success("All tools present"),
            0 => self.theme.format_success("All tools in place"),
            super::EXIT_INTERRUPTED => self.theme.format_warning("Interrupted"),
            _ if report.strict && report.counts.failed == 0 && report.counts.missing == 0 => {
                self.theme.format_error("Skipped tools not allowed in strict mode")
            }
            _ if report.mode == Mode::Check => self.theme.format_error("Some tools are missing"),
            _ => self.theme.format_error("Some tools failed to install"),
        };
        writeln!(writer, "{}", verdict)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::detect::Version;
    use crate::reconcile::FailureKind;

    fn render(report: &Report) -> String {
        let mut out = Vec::new();
        HumanFormatter::new(false).format(report, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn groups_entries_under_category_headers() {
        let report = Report::build(
            Mode::Install,
            vec![
                ReconcileResult::new("git", "build", Outcome::AlreadyPresent)
                    .with_version(Some(Version::new(2, 43, 0))),
                ReconcileResult::new("rustup", "rust", Outcome::Installed)
                    .with_backend(Backend::CurlScript),
            ],
            false,
        );
        let out = render(&report);

        let build = out.find("build").unwrap();
        let git = out.find("✓ git").unwrap();
        let rust = out.find("rust\n").unwrap();
        assert!(build < git && git < rust);
        assert!(out.contains("2.43.0"));
        assert!(out.contains("installed via curl-script"));
        assert!(out.contains("All tools in place"));
    }

    #[test]
    fn failure_shows_detail_tail() {
        let detail = (1..=20)
            .map(|n| format!("line {}", n))
            .collect::<Vec<_>>()
            .join("\n");
        let report = Report::build(
            Mode::Install,
            vec![
                ReconcileResult::failed("meson", "build", FailureKind::InstallFailed)
                    .with_backend(Backend::Pipx)
                    .with_detail(detail),
            ],
            false,
        );
        let out = render(&report);
        assert!(out.contains("✗ meson"));
        assert!(out.contains("install failed via pipx"));
        assert!(out.contains("line 20"));
        assert!(!out.contains("line 12\n"));
        assert!(out.contains("Some tools failed to install"));
    }

    #[test]
    fn summary_counts_nonzero_outcomes() {
        let report = Report::build(
            Mode::Install,
            vec![
                ReconcileResult::new("a", "x", Outcome::AlreadyPresent),
                ReconcileResult::new("b", "x", Outcome::SkippedNoBackend),
            ],
            false,
        );
        let out = render(&report);
        assert!(out.contains("2 tools · 1 present · 1 skipped"));
        assert!(!out.contains("failed"));
    }

    #[test]
    fn check_mode_lists_missing_backend() {
        let report = Report::build(
            Mode::Check,
            vec![ReconcileResult::new("cmake", "build", Outcome::Missing).with_backend(Backend::Apt)],
            false,
        );
        let out = render(&report);
        assert!(out.contains("missing, would install via apt"));
        assert!(out.contains("Some tools are missing"));
    }

    #[test]
    fn strict_skip_verdict() {
        let report = Report::build(
            Mode::Install,
            vec![ReconcileResult::new("mold", "build", Outcome::SkippedNoBackend)],
            true,
        );
        assert!(render(&report).contains("strict mode"));
    }

    #[test]
    fn lists_catalogue_errors() {
        let report = Report::build(Mode::Install, vec![], false)
            .with_catalogue_errors(vec!["t.yml: 'x' declares no installers".into()]);
        let out = render(&report);
        assert!(out.contains("1 catalogue entry excluded"));
        assert!(out.contains("declares no installers"));
    }
}
