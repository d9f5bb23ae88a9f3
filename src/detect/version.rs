//! Version extraction and comparison.
//!
//! Tools print versions in many shapes (`just 1.25.2`, `go version
//! go1.22.1 linux/amd64`, `rustc 1.79.0 (129f3b996 2024-06-10)`). We take
//! the first dotted numeric token and compare numerically, padding missing
//! components with zero so `1.2` equals `1.2.0`.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// First dotted version token, e.g. `1.22.1` in `go1.22.1`.
static DOTTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("DOTTED must compile")
});

/// Bare integer version as a fallback (`ninja 1`, `meson 2`).
static BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\b").expect("BARE must compile"));

/// A parsed `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    parts: [u64; 3],
}

impl Version {
    /// Build a version from components.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            parts: [major, minor, patch],
        }
    }

    /// Extract the first version-looking token from command output.
    pub fn extract(output: &str) -> Option<Self> {
        if let Some(caps) = DOTTED.captures(output) {
            let part = |i: usize| {
                caps.get(i)
                    .and_then(|m| m.as_str().parse::<u64>().ok())
                    .unwrap_or(0)
            };
            return Some(Self::new(part(1), part(2), part(3)));
        }

        BARE.captures(output)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .map(|major| Self::new(major, 0, 0))
    }

    /// Whether this version satisfies a minimum.
    pub fn at_least(&self, minimum: &Version) -> bool {
        self >= minimum
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('v');
        if trimmed.is_empty() {
            return Err("empty version".to_string());
        }

        let mut parts = [0u64; 3];
        for (i, piece) in trimmed.split('.').enumerate() {
            if i >= 3 {
                return Err(format!("too many components in version: {}", s));
            }
            parts[i] = piece
                .parse()
                .map_err(|_| format!("invalid version: {}", s))?;
        }

        Ok(Self { parts })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.parts[0], self.parts[1], self.parts[2])
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
