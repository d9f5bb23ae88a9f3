//! The `install` and `check` commands.
//!
//! Both load settings and the catalogue, detect backends and reconcile
//! every selected entry; `check` stops short of installing.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::backend::BackendDetector;
use crate::cli::args::{CheckArgs, InstallArgs, SelectionArgs};
use crate::config::validate;
use crate::error::Result;
use crate::host::{HostProbe, SystemHost};
use crate::reconcile::{
    reconcile_all, Mode, Outcome, ReconcileOptions, ReconcileProgress, Reconciler,
};
use crate::report::{HumanFormatter, JsonFormatter, OutputFormat, Report, ReportFormatter};
use crate::shell::{is_elevated, CancelToken};
use crate::ui::{LineProgress, OutputMode, ProgressHandle, StatusKind, UserInterface};

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};

/// The install/check command implementation.
pub struct ReconcileCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    mode: Mode,
    selection: SelectionArgs,
    format: OutputFormat,
    strict: bool,
    jobs: Option<usize>,
    timeout: Option<u64>,
    host: Option<Box<dyn HostProbe>>,
    cancel: Option<CancelToken>,
}

impl ReconcileCommand {
    /// Create an `install` command.
    pub fn install(project_root: &Path, config: Option<&Path>, args: InstallArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            mode: Mode::Install,
            selection: args.selection,
            format: args.format,
            strict: args.strict,
            jobs: args.jobs,
            timeout: args.timeout,
            host: None,
            cancel: None,
        }
    }

    /// Create a `check` command.
    pub fn check(project_root: &Path, config: Option<&Path>, args: CheckArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            mode: Mode::Check,
            selection: args.selection,
            format: args.format,
            strict: args.strict,
            jobs: None,
            timeout: None,
            host: None,
            cancel: None,
        }
    }

    /// Use this host instead of the real system.
    pub fn with_host(mut self, host: Box<dyn HostProbe>) -> Self {
        self.host = Some(host);
        self
    }

    /// Use this token instead of one wired to SIGINT/SIGTERM.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn render(&self, report: &Report, ui: &dyn UserInterface) -> Result<String> {
        let mut out = Vec::new();
        match self.format {
            OutputFormat::Human => HumanFormatter::new(ui.use_color())
                .verbose(ui.output_mode() == OutputMode::Verbose)
                .format(report, &mut out)?,
            OutputFormat::Json => JsonFormatter::new()
                .with_timestamp(Utc::now())
                .format(report, &mut out)?,
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

impl Command for ReconcileCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut ctx = CommandContext::load(&self.project_root, self.config.as_deref())?;
        if let Some(jobs) = self.jobs {
            ctx.settings.jobs = jobs;
        }
        if let Some(timeout) = self.timeout {
            ctx.settings.timeout_secs = timeout;
        }
        validate(&ctx.settings)?;
        let settings = &ctx.settings;

        let loaded = ctx.load_catalogue(&self.selection.catalogue)?;
        let catalogue = loaded.catalogue.filtered(&self.selection.filter());
        let human = self.format == OutputFormat::Human;

        if human {
            for error in &loaded.errors {
                ui.warning(&error.to_string());
            }
            if catalogue.is_empty() {
                ui.warning("No catalogue entries match the selection");
            }
        }

        let system;
        let host: &dyn HostProbe = match &self.host {
            Some(host) => host.as_ref(),
            None => {
                system = SystemHost::new(Some(self.project_root.clone()));
                &system
            }
        };

        let backends = BackendDetector::new(host).detect(&settings.disabled_backends);
        debug!(
            "available backends: {}",
            backends
                .iter()
                .map(|b| b.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let sudo = settings.sudo.applies(is_elevated());
        let options = ReconcileOptions {
            mode: self.mode,
            jobs: settings.jobs,
            timeout: Some(settings.timeout()),
            grace: settings.grace(),
            sudo,
        };
        let reconciler = Reconciler::new(host, &backends, &options);
        let cancel = self.cancel.clone().unwrap_or_else(CancelToken::with_signals);

        if human {
            let title = match self.mode {
                Mode::Install => "Installing tools",
                Mode::Check => "Checking tools",
            };
            ui.show_header(title);
        }

        let progress: Box<dyn ProgressHandle> = if human && self.mode == Mode::Install {
            ui.start_progress()
        } else {
            Box::new(LineProgress { quiet: true })
        };
        let show_commands = ui.output_mode().shows_commands();
        let theme = ui.theme();

        let on_progress = |event: ReconcileProgress<'_>| match event {
            ReconcileProgress::Surveyed { total, pending } => {
                debug!("{} entries surveyed, {} to install", total, pending);
                progress.set_length(pending as u64);
            }
            ReconcileProgress::Installing { name, backend } => {
                info!("installing {} via {}", name, backend);
                progress.set_message(&format!("{} via {}", name, backend));
                if show_commands {
                    let command = catalogue
                        .get(name)
                        .and_then(|e| e.installers.iter().find(|i| i.backend == backend))
                        .map(|i| i.command(sudo));
                    if let Some(command) = command {
                        progress.println(&format!("  $ {}", command));
                    }
                }
            }
            ReconcileProgress::Finished { result } => {
                if matches!(result.outcome, Outcome::Installed | Outcome::Failed) {
                    let line = StatusKind::from(result.outcome).format(&theme, &result.name);
                    progress.println(&format!("  {}", line));
                    progress.inc();
                }
            }
        };

        let results = reconcile_all(&reconciler, &catalogue, &cancel, &on_progress);
        progress.finish();

        let report = Report::build(self.mode, results, self.strict || settings.strict)
            .with_catalogue_errors(loaded.errors.iter().map(ToString::to_string).collect());
        let rendered = self.render(&report, ui)?;
        ui.emit(&rendered);

        if report.interrupted() && human {
            ui.warning("Interrupted; remaining tools were not installed");
        }

        let exit_code = report.exit_code();
        Ok(CommandResult {
            success: exit_code == 0,
            exit_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MockHost, MockInstall};
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    const CATALOGUE: &str = r#"
tools:
  - name: present
    category: build
    installers:
      apt: present
  - name: absent
    category: build
    installers:
      apt: absent
  - name: orphan
    category: extras
    installers:
      flatpak: org.example.Orphan
"#;

    fn project() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("tools.yml");
        fs::write(&file, CATALOGUE).unwrap();
        (temp, file)
    }

    fn host() -> MockHost {
        MockHost::new()
            .with_binary("apt-get", None)
            .with_binary("dpkg", None)
            .with_binary("present", None)
            .on_install("absent", MockInstall::provides_binary("absent", ""))
    }

    fn selection(file: &Path) -> SelectionArgs {
        SelectionArgs {
            catalogue: vec![file.to_path_buf()],
            ..Default::default()
        }
    }

    #[test]
    fn install_reports_every_entry() {
        let (temp, file) = project();
        let args = InstallArgs {
            selection: selection(&file),
            ..Default::default()
        };
        let cmd = ReconcileCommand::install(temp.path(), None, args)
            .with_host(Box::new(host()))
            .with_cancel(CancelToken::new());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, 0);
        let out = ui.emitted();
        assert!(out.contains("present"));
        assert!(out.contains("installed via apt"));
        assert!(out.contains("no backend available"));
        assert!(ui.headers().contains(&"Installing tools".to_string()));
    }

    #[test]
    fn strict_flag_fails_on_skips() {
        let (temp, file) = project();
        let args = InstallArgs {
            selection: selection(&file),
            strict: true,
            ..Default::default()
        };
        let cmd = ReconcileCommand::install(temp.path(), None, args)
            .with_host(Box::new(host()))
            .with_cancel(CancelToken::new());

        let result = cmd.execute(&mut MockUI::new()).unwrap();
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn strict_setting_fails_on_skips() {
        let (temp, file) = project();
        fs::create_dir_all(temp.path().join(".devtools")).unwrap();
        fs::write(temp.path().join(".devtools/config.yml"), "strict: true").unwrap();
        let args = InstallArgs {
            selection: selection(&file),
            ..Default::default()
        };
        let cmd = ReconcileCommand::install(temp.path(), None, args)
            .with_host(Box::new(host()))
            .with_cancel(CancelToken::new());

        assert_eq!(cmd.execute(&mut MockUI::new()).unwrap().exit_code, 1);
    }

    #[test]
    fn check_reports_missing_without_installing() {
        let (temp, file) = project();
        let args = CheckArgs {
            selection: selection(&file),
            ..Default::default()
        };
        let cmd = ReconcileCommand::check(temp.path(), None, args)
            .with_host(Box::new(host()))
            .with_cancel(CancelToken::new());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.emitted().contains("missing, would install via apt"));
        assert!(ui.progress_lines().is_empty());
    }

    #[test]
    fn category_filter_limits_entries() {
        let (temp, file) = project();
        let args = InstallArgs {
            selection: SelectionArgs {
                category: vec!["EXTRAS".to_string()],
                ..selection(&file)
            },
            strict: true,
            ..Default::default()
        };
        let cmd = ReconcileCommand::install(temp.path(), None, args)
            .with_host(Box::new(host()))
            .with_cancel(CancelToken::new());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.emitted().contains("orphan"));
        assert!(!ui.emitted().contains("absent"));
    }

    #[test]
    fn json_format_emits_json_only() {
        let (temp, file) = project();
        let args = InstallArgs {
            selection: selection(&file),
            format: OutputFormat::Json,
            ..Default::default()
        };
        let cmd = ReconcileCommand::install(temp.path(), None, args)
            .with_host(Box::new(host()))
            .with_cancel(CancelToken::new());
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let value: serde_json::Value = serde_json::from_str(&ui.emitted()).unwrap();
        assert_eq!(value["mode"], "install");
        assert_eq!(value["exit_code"], 0);
        assert_eq!(value["summary"]["installed"], 1);
        assert!(ui.headers().is_empty());
    }

    #[test]
    fn zero_jobs_is_rejected() {
        let (temp, file) = project();
        let args = InstallArgs {
            selection: selection(&file),
            jobs: Some(0),
            ..Default::default()
        };
        let cmd = ReconcileCommand::install(temp.path(), None, args)
            .with_host(Box::new(host()))
            .with_cancel(CancelToken::new());

        assert!(cmd.execute(&mut MockUI::new()).is_err());
    }

    #[test]
    fn cancelled_run_exits_130() {
        let (temp, file) = project();
        let cancel = CancelToken::new();
        cancel.cancel();
        let args = InstallArgs {
            selection: selection(&file),
            ..Default::default()
        };
        let cmd = ReconcileCommand::install(temp.path(), None, args)
            .with_host(Box::new(host()))
            .with_cancel(cancel);
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 130);
        assert!(ui.has_warning("Interrupted"));
    }

    #[test]
    fn verbose_mode_echoes_install_commands() {
        let (temp, file) = project();
        let args = InstallArgs {
            selection: selection(&file),
            ..Default::default()
        };
        let cmd = ReconcileCommand::install(temp.path(), None, args)
            .with_host(Box::new(host()))
            .with_cancel(CancelToken::new());
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        cmd.execute(&mut ui).unwrap();

        assert!(ui
            .progress_lines()
            .iter()
            .any(|l| l.contains("apt-get install -y absent")));
    }

    #[test]
    fn catalogue_errors_are_warned_and_reported() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("tools.yml");
        fs::write(
            &file,
            "- name: broken\n  category: build\n  installers:\n    snap: broken\n",
        )
        .unwrap();
        let args = CheckArgs {
            selection: selection(&file),
            ..Default::default()
        };
        let cmd = ReconcileCommand::check(temp.path(), None, args)
            .with_host(Box::new(MockHost::new()))
            .with_cancel(CancelToken::new());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 0);
        assert!(ui.has_warning("unknown backend 'snap'"));
        assert!(ui.has_warning("No catalogue entries"));
    }
}
