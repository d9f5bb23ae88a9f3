//! Lint command implementation.
//!
//! The `devtools lint` command loads catalogue files and reports every
//! entry the loader had to exclude. It exits 1 when any problem is found.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalogue::{CatalogueError, LoadedCatalogue};
use crate::cli::args::LintArgs;
use crate::error::Result;
use crate::report::OutputFormat;
use crate::ui::UserInterface;

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};

/// The lint command implementation.
pub struct LintCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: LintArgs,
}

#[derive(Debug, Serialize)]
struct LintProblem<'a> {
    entry: Option<&'a str>,
    message: String,
}

#[derive(Debug, Serialize)]
struct LintReport<'a> {
    entries: usize,
    valid: bool,
    problems: Vec<LintProblem<'a>>,
}

impl LintCommand {
    /// Create a new lint command.
    pub fn new(project_root: &Path, config: Option<&Path>, args: LintArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &LintArgs {
        &self.args
    }

    fn format_human(&self, loaded: &LoadedCatalogue, ui: &dyn UserInterface) -> String {
        let theme = ui.theme();
        let mut out = String::new();

        for error in &loaded.errors {
            out.push_str(&theme.format_error(&error.to_string()));
            out.push('\n');
        }

        let entries = loaded.catalogue.len();
        if loaded.errors.is_empty() {
            out.push_str(&theme.format_success(&format!("{} entries, no problems", entries)));
        } else {
            out.push_str(&format!(
                "\n{} entries, {} {}",
                entries,
                loaded.errors.len(),
                if loaded.errors.len() == 1 {
                    "problem"
                } else {
                    "problems"
                }
            ));
        }
        out.push('\n');
        out
    }

    fn format_json(&self, loaded: &LoadedCatalogue) -> Result<String> {
        let report = LintReport {
            entries: loaded.catalogue.len(),
            valid: loaded.errors.is_empty(),
            problems: loaded.errors.iter().map(problem).collect(),
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| anyhow::anyhow!("failed to serialize lint report: {}", e))?;
        Ok(format!("{}\n", json))
    }
}

fn problem(error: &CatalogueError) -> LintProblem<'_> {
    LintProblem {
        entry: error.entry_name(),
        message: error.to_string(),
    }
}

impl Command for LintCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = CommandContext::load(&self.project_root, self.config.as_deref())?;
        let loaded = ctx.load_catalogue(&self.args.catalogue)?;

        let output = match self.args.format {
            OutputFormat::Human => self.format_human(&loaded, ui),
            OutputFormat::Json => self.format_json(&loaded)?,
        };
        ui.emit(&output);

        if loaded.errors.is_empty() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn lint(content: &str, format: OutputFormat) -> (CommandResult, MockUI) {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("tools.yml");
        fs::write(&file, content).unwrap();
        let args = LintArgs {
            catalogue: vec![file],
            format,
        };
        let mut ui = MockUI::new();
        let result = LintCommand::new(temp.path(), None, args)
            .execute(&mut ui)
            .unwrap();
        (result, ui)
    }

    #[test]
    fn clean_catalogue_passes() {
        let (result, ui) = lint(
            "- name: just\n  category: build\n  installers:\n    cargo: just\n",
            OutputFormat::Human,
        );
        assert!(result.success);
        assert!(ui.emitted().contains("1 entries, no problems"));
    }

    #[test]
    fn problems_fail_with_exit_one() {
        let (result, ui) = lint(
            r#"
- name: just
  category: build
  installers:
    cargo: just
- name: just
  category: build
  installers:
    brew: just
- name: nothing
  category: build
"#,
            OutputFormat::Human,
        );
        assert_eq!(result.exit_code, 1);
        let out = ui.emitted();
        assert!(out.contains("declared 2 times"));
        assert!(out.contains("declares no installers"));
        assert!(out.contains("0 entries, 3 problems"));
    }

    #[test]
    fn json_lists_problems_by_entry() {
        let (result, ui) = lint(
            "- name: foo\n  category: build\n  installers:\n    snap: foo\n",
            OutputFormat::Json,
        );
        assert_eq!(result.exit_code, 1);
        let value: serde_json::Value = serde_json::from_str(ui.emitted()).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["entries"], 0);
        assert_eq!(value["problems"][0]["entry"], "foo");
    }

    #[test]
    fn unparseable_file_is_a_run_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("tools.yml");
        fs::write(&file, "tools: [unclosed").unwrap();
        let args = LintArgs {
            catalogue: vec![file],
            format: OutputFormat::Human,
        };
        assert!(LintCommand::new(temp.path(), None, args)
            .execute(&mut MockUI::new())
            .is_err());
    }

    #[test]
    fn builtin_catalogue_is_clean() {
        let temp = TempDir::new().unwrap();
        let result = LintCommand::new(temp.path(), None, LintArgs::default())
            .execute(&mut MockUI::new())
            .unwrap();
        assert!(result.success);
    }
}
