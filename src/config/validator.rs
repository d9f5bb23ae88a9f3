//! Configuration validation rules.

use crate::config::schema::Settings;
use crate::error::{DevtoolsError, Result};

/// Check settings for values serde accepts but the run cannot use.
pub fn validate(settings: &Settings) -> Result<()> {
    let mut problems = Vec::new();

    if settings.jobs == 0 {
        problems.push("jobs must be at least 1".to_string());
    }
    if settings.timeout_secs == 0 {
        problems.push("timeout_secs must be at least 1".to_string());
    }
    if settings
        .catalogues
        .iter()
        .any(|p| p.as_os_str().is_empty())
    {
        problems.push("catalogues contains an empty path".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DevtoolsError::ConfigValidationError {
            message: problems.join("; "),
        })
    }
}
