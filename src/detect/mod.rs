//! Presence detection.
//!
//! [`evaluate`] runs a [`Detect`] check against a [`HostProbe`] and reports
//! whether the tool is present at an acceptable version. A check that
//! runs and fails means "absent"; a check that cannot run at all is a
//! [`DetectionError`], which callers treat as absent after logging it.
//!
//! Version commands only run for binaries that declare `min_version` or an
//! explicit `version_command`. Plenty of tools on the catalogue do not
//! understand `--version` and would start up instead.

pub mod version;

pub use version::Version;

use crate::catalogue::Detect;
use crate::host::HostProbe;
use crate::shell::platform::expand_home;
use thiserror::Error;

/// Result of a detect check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Present at an acceptable version.
    pub present: bool,
    /// Version found, when one was read.
    pub version: Option<Version>,
    /// Why the check did not pass.
    pub reason: Option<String>,
}

impl Detection {
    pub fn present(version: Option<Version>) -> Self {
        Self {
            present: true,
            version,
            reason: None,
        }
    }

    pub fn absent(reason: impl Into<String>) -> Self {
        Self {
            present: false,
            version: None,
            reason: Some(reason.into()),
        }
    }
}

/// A detect check that could not be run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetectionError {
    #[error("check `{command}` could not run: {message}")]
    CheckCrashed { command: String, message: String },
}

/// Evaluate a detect check.
pub fn evaluate(detect: &Detect, host: &dyn HostProbe) -> Result<Detection, DetectionError> {
    match detect {
        Detect::Binary {
            name,
            min_version,
            version_command,
        } => {
            if host.find_binary(name).is_none() {
                return Ok(Detection::absent(format!("{} not found on PATH", name)));
            }
            if min_version.is_none() && version_command.is_none() {
                return Ok(Detection::present(None));
            }

            let command = version_command
                .clone()
                .unwrap_or_else(|| format!("{} --version", name));
            let output = run(host, &command)?;
            // Some tools print their version and then exit non-zero.
            let version = Version::extract(&output.output);

            let Some(minimum) = min_version else {
                return Ok(Detection::present(version));
            };

            match version {
                None => Ok(Detection::absent(format!(
                    "could not read a version from `{}`",
                    command
                ))),
                Some(found) if !found.at_least(minimum) => Ok(Detection {
                    present: false,
                    version: Some(found),
                    reason: Some(format!("{} {} is older than {}", name, found, minimum)),
                }),
                Some(found) => Ok(Detection::present(Some(found))),
            }
        }

        Detect::Command(command) => {
            if run(host, command)?.success {
                Ok(Detection::present(None))
            } else {
                Ok(Detection::absent(format!("`{}` failed", command)))
            }
        }

        Detect::File(path) => {
            if host.path_exists(&expand_home(path)) {
                Ok(Detection::present(None))
            } else {
                Ok(Detection::absent(format!("{} does not exist", path)))
            }
        }

        Detect::Any(checks) => {
            let mut reasons = Vec::new();
            let mut first_error = None;
            let mut crashed = 0;

            for check in checks {
                match evaluate(check, host) {
                    Ok(detection) if detection.present => return Ok(detection),
                    Ok(detection) => reasons.extend(detection.reason),
                    Err(e) => {
                        tracing::debug!("sub-check of `{}` crashed: {}", detect.describe(), e);
                        crashed += 1;
                        first_error.get_or_insert(e);
                    }
                }
            }

            match first_error {
                Some(e) if crashed == checks.len() => Err(e),
                _ => Ok(Detection::absent(reasons.join("; "))),
            }
        }
    }
}

fn run(host: &dyn HostProbe, command: &str) -> Result<crate::host::CheckOutput, DetectionError> {
    host.run_check(command)
        .map_err(|e| DetectionError::CheckCrashed {
            command: command.to_string(),
            message: e.to_string(),
        })
}
