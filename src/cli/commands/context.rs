//! Shared setup for commands that read settings and the catalogue.

use std::path::{Path, PathBuf};

use crate::catalogue::{builtin, load_sources, CatalogueSource, LoadedCatalogue};
use crate::config::{load_config, Settings};
use crate::error::Result;

/// Project root, settings and explicit catalogue files of one invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_root: PathBuf,
    pub settings: Settings,
}

impl CommandContext {
    /// Load settings for the project, with an optional `--config` layer.
    pub fn load(project_root: &Path, config: Option<&Path>) -> Result<Self> {
        let settings = load_config(project_root, config)?;
        tracing::debug!("settings: {:?}", settings);
        Ok(Self {
            project_root: project_root.to_path_buf(),
            settings,
        })
    }

    /// Catalogue sources for this run.
    ///
    /// Explicit files replace everything; otherwise the built-in catalogue
    /// is followed by the files listed in settings.
    pub fn catalogue_sources(&self, explicit: &[PathBuf]) -> Result<Vec<CatalogueSource>> {
        if !explicit.is_empty() {
            return explicit
                .iter()
                .map(|p| CatalogueSource::from_file(&self.resolve(p)))
                .collect();
        }

        let mut sources = builtin::sources();
        for path in self.settings.catalogue_paths(&self.project_root) {
            sources.push(CatalogueSource::from_file(&path)?);
        }
        Ok(sources)
    }

    /// Load and validate the catalogue.
    pub fn load_catalogue(&self, explicit: &[PathBuf]) -> Result<LoadedCatalogue> {
        load_sources(&self.catalogue_sources(explicit)?)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| self.project_root.join(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DevtoolsError;
    use std::fs;
    use tempfile::TempDir;

    const EXTRA: &str = r#"
- name: extra-tool
  category: local
  detect: extra-tool
  installers:
    cargo: extra-tool
"#;

    #[test]
    fn builtin_and_configured_catalogues_combine() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".devtools")).unwrap();
        fs::write(temp.path().join("extra.yml"), EXTRA).unwrap();
        fs::write(
            temp.path().join(".devtools/config.yml"),
            "catalogues: [extra.yml]",
        )
        .unwrap();

        let ctx = CommandContext::load(temp.path(), None).unwrap();
        let loaded = ctx.load_catalogue(&[]).unwrap();
        assert!(loaded.catalogue.get("extra-tool").is_some());
        assert!(loaded.catalogue.get("just").is_some());
    }

    #[test]
    fn explicit_catalogue_replaces_builtin() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("only.yml");
        fs::write(&file, EXTRA).unwrap();

        let ctx = CommandContext::load(temp.path(), None).unwrap();
        let loaded = ctx.load_catalogue(&[file]).unwrap();
        assert_eq!(loaded.catalogue.len(), 1);
        assert!(loaded.catalogue.get("just").is_none());
    }

    #[test]
    fn missing_configured_catalogue_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".devtools")).unwrap();
        fs::write(
            temp.path().join(".devtools/config.yml"),
            "catalogues: [nowhere.yml]",
        )
        .unwrap();

        let ctx = CommandContext::load(temp.path(), None).unwrap();
        assert!(matches!(
            ctx.load_catalogue(&[]),
            Err(DevtoolsError::CatalogueLoad { .. })
        ));
    }
}
