//! Layered run settings.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use devtools::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::create_dir_all(temp.path().join(".devtools")).unwrap();
//! fs::write(temp.path().join(".devtools/config.yml"), "jobs: 2").unwrap();
//!
//! let settings = load_config(temp.path(), None).unwrap();
//! assert_eq!(settings.jobs, 2);
//! ```
//!
//! # Configuration File Locations
//!
//! Settings are merged in this order, later winning:
//! 1. User global config (`~/.devtools/config.yml`)
//! 2. Project config (`.devtools/config.yml`)
//! 3. Local overrides (`.devtools/config.local.yml`)
//! 4. `--config <FILE>`
//!
//! Command-line flags and `DEVTOOLS_*` environment variables override all
//! of them.

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use loader::{find_project_root, load_config, load_config_value, load_settings, ConfigPaths};
pub use merger::{deep_merge, merge_configs};
pub use schema::{Settings, SudoPolicy};
pub use validator::validate;
