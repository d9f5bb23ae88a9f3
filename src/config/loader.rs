//! Configuration file discovery and loading.
//!
//! This module handles finding and loading configuration files from
//! various locations in the correct priority order. No file is required;
//! a project without any config runs on defaults.

use crate::config::merger::merge_configs;
use crate::config::schema::Settings;
use crate::config::validator::validate;
use crate::error::{DevtoolsError, Result};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding project and user configuration.
pub const CONFIG_DIR: &str = ".devtools";

/// Paths to configuration files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. User global config (`~/.devtools/config.yml`)
/// 2. Project config (`.devtools/config.yml`)
/// 3. Local overrides (`.devtools/config.local.yml`)
/// 4. An explicit `--config` file
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// User's global config: ~/.devtools/config.yml
    pub user_global: Option<PathBuf>,

    /// Project config: .devtools/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .devtools/config.local.yml
    pub project_local: Option<PathBuf>,

    /// File passed with `--config`. Must exist.
    pub explicit: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path, explicit: Option<&Path>) -> Self {
        Self::discover_with_home(project_root, dirs::home_dir().as_deref(), explicit)
    }

    /// Discover with an explicit home directory (for tests).
    pub fn discover_with_home(
        project_root: &Path,
        home: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Self {
        Self {
            user_global: home.and_then(|h| existing(h.join(CONFIG_DIR).join("config.yml"))),
            project: existing(project_root.join(CONFIG_DIR).join("config.yml")),
            project_local: existing(project_root.join(CONFIG_DIR).join("config.local.yml")),
            explicit: explicit.map(Path::to_path_buf),
        }
    }

    /// Returns all config paths in merge order.
    pub fn all(&self) -> Vec<&PathBuf> {
        [
            &self.user_global,
            &self.project,
            &self.project_local,
            &self.explicit,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Find the project root by walking up from `start`.
///
/// Looks for a `.devtools` directory first, then `.git`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_DIR).is_dir() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a config file as raw YAML for merging.
///
/// An empty file is an empty mapping.
pub fn load_config_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DevtoolsError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DevtoolsError::Io(e)
        }
    })?;

    let value: Value =
        serde_yaml::from_str(&content).map_err(|e| DevtoolsError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    match value {
        Value::Null => Ok(Value::Mapping(Default::default())),
        Value::Mapping(_) => Ok(value),
        _ => Err(DevtoolsError::ConfigParseError {
            path: path.to_path_buf(),
            message: "expected a mapping of settings".to_string(),
        }),
    }
}

/// Load, merge and validate every config layer.
pub fn load_settings(paths: &ConfigPaths) -> Result<Settings> {
    let mut layers = Vec::new();
    for path in paths.all() {
        tracing::debug!("loading config {}", path.display());
        layers.push(load_config_value(path)?);
    }

    let merged = merge_configs(&layers);
    let origin = paths
        .all()
        .last()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIR));

    let settings: Settings =
        serde_yaml::from_value(merged).map_err(|e| DevtoolsError::ConfigParseError {
            path: origin,
            message: format!("failed to parse merged config: {}", e),
        })?;

    validate(&settings)?;
    Ok(settings)
}

/// Discover and load the settings for a project.
pub fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<Settings> {
    load_settings(&ConfigPaths::discover(project_root, explicit))
}
