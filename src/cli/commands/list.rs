//! List command implementation.
//!
//! The `devtools list` command shows catalogue entries grouped by category,
//! with their detect check and installers. The backend that `install`
//! would pick on this host is highlighted.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::backend::{Backend, BackendDetector, BackendSet};
use crate::catalogue::{Catalogue, ToolEntry};
use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::host::{HostProbe, SystemHost};
use crate::report::OutputFormat;
use crate::ui::{OutputMode, UserInterface};

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: ListArgs,
    host: Option<Box<dyn HostProbe>>,
}

/// One entry as listed.
#[derive(Debug, Serialize)]
struct ListedEntry<'a> {
    name: &'a str,
    category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    detect: String,
    backends: Vec<Backend>,
    selected: Option<Backend>,
}

impl<'a> ListedEntry<'a> {
    fn new(entry: &'a ToolEntry, available: &BackendSet) -> Self {
        Self {
            name: &entry.name,
            category: &entry.category,
            description: entry.description.as_deref(),
            detect: entry.detect.describe(),
            backends: entry.backends().collect(),
            selected: entry
                .select_installer(|b| available.contains(b))
                .map(|i| i.backend),
        }
    }
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(project_root: &Path, config: Option<&Path>, args: ListArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
            host: None,
        }
    }

    /// Use this host instead of the real system.
    pub fn with_host(mut self, host: Box<dyn HostProbe>) -> Self {
        self.host = Some(host);
        self
    }

    fn print_human(
        &self,
        catalogue: &Catalogue,
        available: &BackendSet,
        ui: &mut dyn UserInterface,
    ) {
        let theme = ui.theme();
        let width = catalogue
            .entries()
            .iter()
            .map(|e| e.name.len())
            .max()
            .unwrap_or(0);
        let mut out = String::new();

        for category in catalogue.categories() {
            out.push_str(&format!("{}\n", theme.header.apply_to(category)));
            for entry in catalogue.entries().iter().filter(|e| e.category == category) {
                let listed = ListedEntry::new(entry, available);
                let backends = listed
                    .backends
                    .iter()
                    .map(|b| {
                        if Some(*b) == listed.selected {
                            theme.highlight.apply_to(b.as_str()).to_string()
                        } else {
                            theme.dim.apply_to(b.as_str()).to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                out.push_str(&format!(
                    "  {:<width$}  {}\n",
                    entry.name,
                    backends,
                    width = width
                ));
                if let Some(desc) = listed.description {
                    out.push_str(&format!(
                        "  {:<width$}  {}\n",
                        "",
                        theme.dim.apply_to(desc),
                        width = width
                    ));
                }
                if ui.output_mode() == OutputMode::Verbose {
                    out.push_str(&format!(
                        "  {:<width$}  {}\n",
                        "",
                        theme.dim.apply_to(format!("detect: {}", listed.detect)),
                        width = width
                    ));
                }
            }
            out.push('\n');
        }

        out.push_str(&format!("{} tools\n", catalogue.len()));
        ui.emit(&out);
    }

    fn print_json(
        &self,
        catalogue: &Catalogue,
        available: &BackendSet,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        let entries: Vec<_> = catalogue
            .entries()
            .iter()
            .map(|e| ListedEntry::new(e, available))
            .collect();
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| anyhow::anyhow!("failed to serialize listing: {}", e))?;
        ui.emit(&format!("{}\n", json));
        Ok(())
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = CommandContext::load(&self.project_root, self.config.as_deref())?;
        let loaded = ctx.load_catalogue(&self.args.selection.catalogue)?;
        let catalogue = loaded.catalogue.filtered(&self.args.selection.filter());

        let system;
        let host: &dyn HostProbe = match &self.host {
            Some(host) => host.as_ref(),
            None => {
                system = SystemHost::new(Some(self.project_root.clone()));
                &system
            }
        };
        let available = BackendDetector::new(host).detect(&ctx.settings.disabled_backends);

        match self.args.format {
            OutputFormat::Human => {
                for error in &loaded.errors {
                    ui.warning(&error.to_string());
                }
                self.print_human(&catalogue, &available, ui);
            }
            OutputFormat::Json => self.print_json(&catalogue, &available, ui)?,
        }

        Ok(CommandResult::success())
    }
}
