//! Bringing the host in line with the catalogue.
//!
//! # Modules
//!
//! - [`reconciler`] - Detect, select and install for one entry
//! - [`scheduler`] - Parallel detection and lane-based install scheduling
//! - [`result`] - Outcomes and per-entry results

pub mod reconciler;
pub mod result;
pub mod scheduler;

pub use reconciler::{Mode, ReconcileOptions, Reconciler, Survey};
pub use result::{FailureKind, Outcome, ReconcileResult};
pub use scheduler::{reconcile_all, ReconcileProgress};
