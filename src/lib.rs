//! devtools - Install and check the tools a workspace needs.
//!
//! A declarative catalogue lists every tool with a presence check and the
//! package managers that can install it. devtools detects which package
//! managers the host has, installs whatever is missing through the first
//! usable one, and reports the result per category.
//!
//! # Modules
//!
//! - [`backend`] - Package manager backends and their detection
//! - [`catalogue`] - Tool catalogue types and YAML loading
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Layered settings
//! - [`detect`] - Presence checks and version parsing
//! - [`error`] - Error types and result aliases
//! - [`host`] - Host access, real and mocked
//! - [`reconcile`] - Per-entry reconciliation and the concurrent scheduler
//! - [`report`] - Aggregation and rendering of results
//! - [`shell`] - Shell command execution and cancellation
//! - [`ui`] - Terminal output, progress and themes
//!
//! # Example
//!
//! ```
//! use devtools::backend::{Backend, BackendSet};
//! use devtools::catalogue::load_str;
//! use devtools::host::{MockHost, MockInstall};
//! use devtools::reconcile::{Outcome, ReconcileOptions, Reconciler};
//! use devtools::shell::CancelToken;
//!
//! let loaded = load_str("inline", r#"
//! - name: just
//!   category: build
//!   installers:
//!     cargo: just
//! "#).unwrap();
//! let entry = loaded.catalogue.get("just").unwrap();
//!
//! let host = MockHost::new()
//!     .on_install("just", MockInstall::provides_binary("just", "just 1.36.0"));
//! let backends: BackendSet = [Backend::Cargo].into_iter().collect();
//! let options = ReconcileOptions::default();
//! let reconciler = Reconciler::new(&host, &backends, &options);
//!
//! let result = reconciler.reconcile(entry, &CancelToken::new());
//! assert_eq!(result.outcome, Outcome::Installed);
//! ```

pub mod backend;
pub mod catalogue;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod host;
pub mod reconcile;
pub mod report;
pub mod shell;
pub mod ui;

pub use error::{DevtoolsError, Result};
