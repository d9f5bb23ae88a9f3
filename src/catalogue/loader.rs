//! Catalogue parsing and validation.
//!
//! A catalogue source is a YAML document holding a list of entries, either
//! at the top level or under a `tools:` key. Each entry is converted on its
//! own: a malformed entry becomes a [`CatalogueError`] and is dropped, and
//! the rest of the catalogue still loads. Only a source that is not a
//! catalogue at all (invalid YAML, wrong top-level shape) fails the load.
//!
//! ```yaml
//! tools:
//!   - name: just
//!     category: build
//!     detect:
//!       binary: just
//!       min_version: "1.13"
//!     installers:
//!       apt: just
//!       cargo: just
//! ```

use crate::backend::Backend;
use crate::catalogue::entry::{Detect, InstallAction, Installer, ToolEntry};
use crate::catalogue::Catalogue;
use crate::detect::version::Version;
use crate::error::{DevtoolsError, Result};
use serde::de::{Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde::Deserialize;
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// A problem with a single catalogue entry.
///
/// These are collected rather than propagated: the entry is excluded and
/// reconciliation continues with everything else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    /// Entry has no usable name.
    #[error("{origin}: entry #{index} has no name")]
    MissingName { origin: String, index: usize },

    /// Entry has no category.
    #[error("{origin}: '{name}' has no category")]
    MissingCategory { origin: String, name: String },

    /// Entry declares no installers.
    #[error("{origin}: '{name}' declares no installers")]
    NoInstallers { origin: String, name: String },

    /// Installer keyed by something that isn't a backend.
    #[error("{origin}: '{name}' uses unknown backend '{backend}'")]
    UnknownBackend {
        origin: String,
        name: String,
        backend: String,
    },

    /// Installer value doesn't fit its backend.
    #[error("{origin}: '{name}' has an invalid {backend} installer: {message}")]
    InvalidInstaller {
        origin: String,
        name: String,
        backend: Backend,
        message: String,
    },

    /// Detect block is unusable.
    #[error("{origin}: '{name}' has an invalid detect: {message}")]
    InvalidDetect {
        origin: String,
        name: String,
        message: String,
    },

    /// Same name declared more than once; every declaration is rejected.
    #[error("{origin}: '{name}' is declared {count} times; all declarations ignored")]
    DuplicateName {
        origin: String,
        name: String,
        count: usize,
    },

    /// Entry isn't even a mapping of known fields.
    #[error("{origin}: entry #{index} is malformed: {message}")]
    Malformed {
        origin: String,
        index: usize,
        message: String,
    },
}

impl CatalogueError {
    /// Name of the offending entry, when it has one.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            CatalogueError::MissingName { .. } | CatalogueError::Malformed { .. } => None,
            CatalogueError::MissingCategory { name, .. }
            | CatalogueError::NoInstallers { name, .. }
            | CatalogueError::UnknownBackend { name, .. }
            | CatalogueError::InvalidInstaller { name, .. }
            | CatalogueError::InvalidDetect { name, .. }
            | CatalogueError::DuplicateName { name, .. } => Some(name),
        }
    }
}

/// Raw catalogue text and where it came from.
#[derive(Debug, Clone)]
pub struct CatalogueSource {
    /// Label used in error messages (file path or `builtin:<file>`).
    pub origin: String,
    /// YAML content.
    pub content: String,
}

impl CatalogueSource {
    /// Wrap in-memory YAML.
    pub fn new(origin: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            content: content.into(),
        }
    }

    /// Read a catalogue file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DevtoolsError::CatalogueLoad {
            source_name: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(path.display().to_string(), content))
    }
}

/// The outcome of loading catalogue sources.
#[derive(Debug, Clone, Default)]
pub struct LoadedCatalogue {
    /// Valid entries in declaration order.
    pub catalogue: Catalogue,
    /// Entries that were excluded, and why.
    pub errors: Vec<CatalogueError>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    name: Option<String>,
    category: Option<String>,
    description: Option<String>,
    detect: Option<RawDetect>,
    #[serde(default)]
    installers: serde_yaml::Mapping,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDetect {
    Binary(String),
    Spec(RawDetectSpec),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDetectSpec {
    binary: Option<String>,
    min_version: Option<Value>,
    version_command: Option<String>,
    command: Option<String>,
    file: Option<String>,
    any: Option<Vec<RawDetect>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAction {
    One(String),
    Many(Vec<String>),
    Command { command: String },
}

/// Load entries from several sources, in order.
///
/// Duplicate detection spans all sources: a tool declared in the built-in
/// catalogue and again in a project file is rejected in both places.
pub fn load_sources(sources: &[CatalogueSource]) -> Result<LoadedCatalogue> {
    let mut parsed: Vec<(String, ToolEntry)> = Vec::new();
    let mut errors = Vec::new();

    for source in sources {
        let items = top_level_items(source)?;
        tracing::debug!("{}: {} catalogue entries", source.origin, items.len());

        for (index, item) in items.into_iter().enumerate() {
            match convert_entry(&source.origin, index, item) {
                Ok(entry) => parsed.push((source.origin.clone(), entry)),
                Err(e) => errors.push(e),
            }
        }
    }

    // Names are matched case-insensitively by selection filters, so
    // `Just` and `just` count as the same tool.
    let mut counts: HashMap<String, usize> = HashMap::new();
    for (_, entry) in &parsed {
        *counts.entry(entry.name.to_lowercase()).or_default() += 1;
    }

    let mut entries = Vec::new();
    for (origin, entry) in &parsed {
        let count = counts.get(&entry.name.to_lowercase()).copied().unwrap_or(1);
        if count > 1 {
            errors.push(CatalogueError::DuplicateName {
                origin: origin.clone(),
                name: entry.name.clone(),
                count,
            });
        } else {
            entries.push(entry.clone());
        }
    }

    for error in &errors {
        tracing::warn!("{}", error);
    }

    Ok(LoadedCatalogue {
        catalogue: Catalogue::new(entries),
        errors,
    })
}

/// Load a single YAML string (convenience for tests and tooling).
pub fn load_str(origin: &str, content: &str) -> Result<LoadedCatalogue> {
    load_sources(&[CatalogueSource::new(origin, content)])
}

fn top_level_items(source: &CatalogueSource) -> Result<Vec<RawNode>> {
    let load_error = |message: String| DevtoolsError::CatalogueLoad {
        source_name: source.origin.clone(),
        message,
    };

    let doc: RawNode =
        serde_yaml::from_str(&source.content).map_err(|e| load_error(e.to_string()))?;

    match doc {
        RawNode::Scalar(Value::Null) => Ok(Vec::new()),
        RawNode::Seq(items) => Ok(items),
        RawNode::Map(pairs) => {
            let mut lists = pairs
                .into_iter()
                .filter(|(key, _)| key.is_str("tools"))
                .map(|(_, value)| value);
            let tools = lists.next();
            if lists.next().is_some() {
                return Err(load_error("'tools' is declared more than once".to_string()));
            }
            match tools {
                Some(RawNode::Seq(items)) => Ok(items),
                Some(RawNode::Scalar(Value::Null)) | None => Ok(Vec::new()),
                Some(_) => Err(load_error("'tools' must be a list".to_string())),
            }
        }
        _ => Err(load_error(
            "expected a list of tools or a mapping with a 'tools' list".to_string(),
        )),
    }
}

/// A YAML tree that keeps duplicate mapping keys.
///
/// `serde_yaml::Value` rejects a duplicate key while parsing, which would
/// fail the whole source. Parsing into this first lets the duplicate be
/// charged to the one entry that contains it.
#[derive(Debug)]
enum RawNode {
    Scalar(Value),
    Tagged(String, Box<RawNode>),
    Seq(Vec<RawNode>),
    Map(Vec<(RawNode, RawNode)>),
}

impl RawNode {
    fn is_str(&self, text: &str) -> bool {
        matches!(self, RawNode::Scalar(Value::String(s)) if s == text)
    }

    /// Convert to a `Value`, failing on the first duplicate key.
    fn into_value(self, path: &str) -> std::result::Result<Value, String> {
        match self {
            RawNode::Scalar(value) => Ok(value),
            RawNode::Tagged(tag, inner) => Ok(Value::Tagged(Box::new(TaggedValue {
                tag: Tag::new(tag),
                value: inner.into_value(path)?,
            }))),
            RawNode::Seq(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| item.into_value(&format!("{path}[{i}]")))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Sequence),
            RawNode::Map(pairs) => {
                let mut map = Mapping::new();
                for (key, value) in pairs {
                    let key = key.into_value(path)?;
                    let label = match &key {
                        Value::String(s) => s.clone(),
                        other => format!("{:?}", other),
                    };
                    let child = if path.is_empty() {
                        label.clone()
                    } else {
                        format!("{path}.{label}")
                    };
                    let value = value.into_value(&child)?;
                    if map.insert(key, value).is_some() {
                        return Err(if path.is_empty() {
                            format!("duplicate key '{label}'")
                        } else {
                            format!("duplicate key '{label}' in {path}")
                        });
                    }
                }
                Ok(Value::Mapping(map))
            }
        }
    }
}

impl<'de> Deserialize<'de> for RawNode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NodeVisitor;

        impl<'de> Visitor<'de> for NodeVisitor {
            type Value = RawNode;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("any YAML value")
            }

            fn visit_bool<E: serde::de::Error>(self, v: bool) -> std::result::Result<RawNode, E> {
                Ok(RawNode::Scalar(Value::Bool(v)))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<RawNode, E> {
                Ok(RawNode::Scalar(Value::Number(v.into())))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<RawNode, E> {
                Ok(RawNode::Scalar(Value::Number(v.into())))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> std::result::Result<RawNode, E> {
                Ok(RawNode::Scalar(Value::Number(v.into())))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<RawNode, E> {
                Ok(RawNode::Scalar(Value::String(v.to_owned())))
            }

            fn visit_string<E: serde::de::Error>(
                self,
                v: String,
            ) -> std::result::Result<RawNode, E> {
                Ok(RawNode::Scalar(Value::String(v)))
            }

            fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<RawNode, E> {
                Ok(RawNode::Scalar(Value::Null))
            }

            fn visit_none<E: serde::de::Error>(self) -> std::result::Result<RawNode, E> {
                Ok(RawNode::Scalar(Value::Null))
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<RawNode, D::Error>
            where
                D: Deserializer<'de>,
            {
                RawNode::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<RawNode, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(RawNode::Seq(items))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<RawNode, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::new();
                while let Some(pair) = map.next_entry()? {
                    pairs.push(pair);
                }
                Ok(RawNode::Map(pairs))
            }

            fn visit_enum<A>(self, data: A) -> std::result::Result<RawNode, A::Error>
            where
                A: EnumAccess<'de>,
            {
                let (tag, contents): (String, _) = data.variant()?;
                let value = contents.newtype_variant()?;
                Ok(RawNode::Tagged(tag, Box::new(value)))
            }
        }

        deserializer.deserialize_any(NodeVisitor)
    }
}

fn convert_entry(
    origin: &str,
    index: usize,
    item: RawNode,
) -> std::result::Result<ToolEntry, CatalogueError> {
    let malformed = |message: String| CatalogueError::Malformed {
        origin: origin.to_string(),
        index,
        message,
    };
    let value = item.into_value("").map_err(malformed)?;
    let raw: RawEntry = serde_yaml::from_value(value).map_err(|e| malformed(e.to_string()))?;

    let name = raw
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| CatalogueError::MissingName {
            origin: origin.to_string(),
            index,
        })?;

    let category = raw
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| CatalogueError::MissingCategory {
            origin: origin.to_string(),
            name: name.clone(),
        })?;

    let detect = match raw.detect {
        Some(raw_detect) => {
            convert_detect(raw_detect).map_err(|message| CatalogueError::InvalidDetect {
                origin: origin.to_string(),
                name: name.clone(),
                message,
            })?
        }
        None => Detect::binary(name.clone()),
    };

    let mut installers = Vec::new();
    for (key, value) in raw.installers {
        let key = match key {
            Value::String(s) => s,
            other => format!("{:?}", other),
        };
        let backend: Backend = key.parse().map_err(|_| CatalogueError::UnknownBackend {
            origin: origin.to_string(),
            name: name.clone(),
            backend: key.clone(),
        })?;
        let action = convert_action(backend, value).map_err(|message| {
            CatalogueError::InvalidInstaller {
                origin: origin.to_string(),
                name: name.clone(),
                backend,
                message,
            }
        })?;
        installers.push(Installer { backend, action });
    }

    if installers.is_empty() {
        return Err(CatalogueError::NoInstallers {
            origin: origin.to_string(),
            name,
        });
    }

    Ok(ToolEntry {
        name,
        category,
        description: raw.description,
        detect,
        installers,
    })
}

fn convert_detect(raw: RawDetect) -> std::result::Result<Detect, String> {
    let spec = match raw {
        RawDetect::Binary(name) if name.trim().is_empty() => {
            return Err("binary name is empty".to_string())
        }
        RawDetect::Binary(name) => return Ok(Detect::binary(name.trim())),
        RawDetect::Spec(spec) => spec,
    };

    let kinds = [
        spec.binary.is_some(),
        spec.command.is_some(),
        spec.file.is_some(),
        spec.any.is_some(),
    ]
    .iter()
    .filter(|set| **set)
    .count();

    if kinds != 1 {
        return Err("exactly one of 'binary', 'command', 'file' or 'any' is required".to_string());
    }

    if spec.binary.is_none() && (spec.min_version.is_some() || spec.version_command.is_some()) {
        return Err("'min_version' and 'version_command' only apply to 'binary'".to_string());
    }

    if let Some(name) = spec.binary {
        let min_version = match spec.min_version {
            None => None,
            Some(value) => Some(parse_min_version(&value)?),
        };
        return Ok(Detect::Binary {
            name,
            min_version,
            version_command: spec.version_command,
        });
    }

    if let Some(command) = spec.command {
        return Ok(Detect::Command(command));
    }

    if let Some(file) = spec.file {
        return Ok(Detect::File(file));
    }

    let any = spec.any.unwrap_or_default();
    if any.is_empty() {
        return Err("'any' needs at least one check".to_string());
    }
    any.into_iter()
        .map(convert_detect)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Detect::Any)
}

/// YAML reads `1.13` as a float, so accept numbers too. A float drops
/// trailing zeros (`1.10` becomes `1.1`), so catalogues quote such versions.
fn parse_min_version(value: &Value) -> std::result::Result<Version, String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => return Err(format!("min_version must be a version string, got {:?}", other)),
    };
    text.parse()
}

fn convert_action(backend: Backend, value: Value) -> std::result::Result<InstallAction, String> {
    let raw: RawAction = serde_yaml::from_value(value).map_err(|_| {
        "expected a package name, a list of packages, or { command: ... }".to_string()
    })?;

    match raw {
        RawAction::Command { command } if command.trim().is_empty() => {
            Err("command is empty".to_string())
        }
        RawAction::Command { command } => Ok(InstallAction::Command(command)),
        RawAction::One(value) if value.trim().is_empty() => Err("value is empty".to_string()),
        RawAction::One(command) if backend.takes_script() => Ok(InstallAction::Command(command)),
        RawAction::One(package) => Ok(InstallAction::Packages(vec![package])),
        RawAction::Many(_) if backend.takes_script() => {
            Err("script backends take a single command string".to_string())
        }
        RawAction::Many(packages) if packages.is_empty() => {
            Err("package list is empty".to_string())
        }
        RawAction::Many(packages) => Ok(InstallAction::Packages(packages)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(loaded: &LoadedCatalogue) -> Vec<&str> {
        loaded
            .catalogue
            .entries()
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    }

    #[test]
    fn loads_entries_in_declaration_order() {
        let yaml = r#"
tools:
  - name: just
    category: build
    installers:
      apt: just
  - name: meson
    category: build
    installers:
      pip: meson
"#;
        let loaded = load_str("test.yml", yaml).unwrap();
        assert!(loaded.errors.is_empty());
        assert_eq!(names(&loaded), vec!["just", "meson"]);
    }

    #[test]
    fn accepts_top_level_list() {
        let yaml = r#"
- name: just
  category: build
  installers: { apt: just }
"#;
        let loaded = load_str("list.yml", yaml).unwrap();
        assert_eq!(names(&loaded), vec!["just"]);
    }

    #[test]
    fn detect_defaults_to_binary_named_after_entry() {
        let yaml = "- { name: just, category: build, installers: { apt: just } }";
        let loaded = load_str("t.yml", yaml).unwrap();
        assert_eq!(loaded.catalogue.entries()[0].detect, Detect::binary("just"));
    }

    #[test]
    fn installer_order_is_preserved() {
        let yaml = r#"
- name: just
  category: build
  installers:
    pacman: just
    cargo: just
    apt: just
"#;
        let loaded = load_str("t.yml", yaml).unwrap();
        let backends: Vec<_> = loaded.catalogue.entries()[0].backends().collect();
        assert_eq!(backends, vec![Backend::Pacman, Backend::Cargo, Backend::Apt]);
    }

    #[test]
    fn parses_every_detect_shape() {
        let yaml = r#"
- name: a
  category: c
  detect: { binary: a, min_version: 1.13, version_command: "a -V" }
  installers: { apt: a }
- name: b
  category: c
  detect: { command: "pkg-config --exists b" }
  installers: { apt: libb-dev }
- name: c
  category: c
  detect: { file: "~/.local/share/c" }
  installers: { script: "echo c" }
- name: d
  category: c
  detect:
    any:
      - d
      - { file: /opt/d/bin/d }
  installers: { apt: d }
"#;
        let loaded = load_str("t.yml", yaml).unwrap();
        assert!(loaded.errors.is_empty(), "{:?}", loaded.errors);
        let entries = loaded.catalogue.entries();
        assert_eq!(
            entries[0].detect,
            Detect::Binary {
                name: "a".into(),
                min_version: Some(Version::new(1, 13, 0)),
                version_command: Some("a -V".into()),
            }
        );
        assert_eq!(entries[1].detect, Detect::Command("pkg-config --exists b".into()));
        assert_eq!(entries[2].detect, Detect::File("~/.local/share/c".into()));
        assert_eq!(
            entries[3].detect,
            Detect::Any(vec![
                Detect::binary("d"),
                Detect::File("/opt/d/bin/d".into())
            ])
        );
    }

    #[test]
    fn parses_every_install_action_shape() {
        let yaml = r#"
- name: wayland
  category: libs
  installers:
    apt: [libwayland-dev, wayland-protocols]
    pacman: wayland
    dnf: { command: "sudo dnf builddep -y wayland" }
    curl-script: "curl -fsSL https://example.invalid/install.sh | sh"
"#;
        let loaded = load_str("t.yml", yaml).unwrap();
        let installers = &loaded.catalogue.entries()[0].installers;
        assert_eq!(
            installers[0].action,
            InstallAction::Packages(vec!["libwayland-dev".into(), "wayland-protocols".into()])
        );
        assert_eq!(
            installers[1].action,
            InstallAction::Packages(vec!["wayland".into()])
        );
        assert_eq!(
            installers[2].action,
            InstallAction::Command("sudo dnf builddep -y wayland".into())
        );
        assert_eq!(
            installers[3].action,
            InstallAction::Command("curl -fsSL https://example.invalid/install.sh | sh".into())
        );
    }

    #[test]
    fn malformed_entry_is_excluded_not_fatal() {
        let yaml = r#"
- name: good
  category: build
  installers: { apt: good }
- category: build
  installers: { apt: nameless }
- name: lonely
  category: build
- name: strange
  category: build
  installers: { yum: strange }
"#;
        let loaded = load_str("t.yml", yaml).unwrap();
        assert_eq!(names(&loaded), vec!["good"]);
        assert_eq!(loaded.errors.len(), 3);
        assert!(matches!(
            loaded.errors[0],
            CatalogueError::MissingName { index: 1, .. }
        ));
        assert!(matches!(loaded.errors[1], CatalogueError::NoInstallers { .. }));
        assert!(matches!(
            &loaded.errors[2],
            CatalogueError::UnknownBackend { backend, .. } if backend == "yum"
        ));
    }

    #[test]
    fn duplicate_names_reject_the_whole_pair() {
        let yaml = r#"
- { name: just, category: build, installers: { apt: just } }
- { name: meson, category: build, installers: { apt: meson } }
- { name: just, category: rust, installers: { cargo: just } }
"#;
        let loaded = load_str("t.yml", yaml).unwrap();
        assert_eq!(names(&loaded), vec!["meson"]);
        assert_eq!(loaded.errors.len(), 2);
        for error in &loaded.errors {
            assert!(matches!(
                error,
                CatalogueError::DuplicateName { name, count: 2, .. } if name == "just"
            ));
        }
    }

    #[test]
    fn duplicates_are_detected_across_sources() {
        let sources = vec![
            CatalogueSource::new("a.yml", "- { name: just, category: b, installers: { apt: just } }"),
            CatalogueSource::new("b.yml", "- { name: just, category: b, installers: { cargo: just } }"),
        ];
        let loaded = load_sources(&sources).unwrap();
        assert!(loaded.catalogue.is_empty());
        let origins: Vec<_> = loaded
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect();
        assert!(origins[0].starts_with("a.yml"));
        assert!(origins[1].starts_with("b.yml"));
    }

    #[test]
    fn script_backend_rejects_package_lists() {
        let yaml = "- { name: x, category: c, installers: { script: [a, b] } }";
        let loaded = load_str("t.yml", yaml).unwrap();
        assert!(loaded.catalogue.is_empty());
        assert!(matches!(
            loaded.errors[0],
            CatalogueError::InvalidInstaller {
                backend: Backend::Script,
                ..
            }
        ));
    }

    #[test]
    fn detect_with_two_kinds_is_invalid() {
        let yaml = r#"
- name: x
  category: c
  detect: { binary: x, file: /x }
  installers: { apt: x }
"#;
        let loaded = load_str("t.yml", yaml).unwrap();
        assert!(matches!(loaded.errors[0], CatalogueError::InvalidDetect { .. }));
    }

    #[test]
    fn bad_min_version_is_invalid_detect() {
        let yaml = r#"
- name: x
  category: c
  detect: { binary: x, min_version: latest }
  installers: { apt: x }
"#;
        let loaded = load_str("t.yml", yaml).unwrap();
        assert!(matches!(loaded.errors[0], CatalogueError::InvalidDetect { .. }));
    }

    #[test]
    fn unknown_field_is_malformed() {
        let yaml = "- { name: x, category: c, instalers: { apt: x } }";
        let loaded = load_str("t.yml", yaml).unwrap();
        assert!(matches!(loaded.errors[0], CatalogueError::Malformed { .. }));
    }

    #[test]
    fn duplicate_key_only_rejects_its_entry() {
        let yaml = r#"
- name: good
  category: a
  installers: { apt: good }
- name: bad
  category: b
  installers:
    apt: x
    apt: y
- name: after
  category: a
  installers: { cargo: after }
"#;
        let loaded = load_str("t.yml", yaml).unwrap();
        assert_eq!(names(&loaded), vec!["good", "after"]);
        assert_eq!(loaded.errors.len(), 1);
        match &loaded.errors[0] {
            CatalogueError::Malformed { index, message, .. } => {
                assert_eq!(*index, 1);
                assert!(message.contains("duplicate key 'apt' in installers"));
            }
            other => panic!("expected malformed entry, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_top_level_field_is_malformed() {
        let yaml = "- { name: a, name: b, category: c, installers: { apt: a } }";
        let loaded = load_str("t.yml", yaml).unwrap();
        assert!(loaded.catalogue.is_empty());
        assert!(matches!(
            &loaded.errors[0],
            CatalogueError::Malformed { message, .. } if message.contains("duplicate key 'name'")
        ));
    }

    #[test]
    fn duplicate_names_ignore_case() {
        let yaml = r#"
- { name: Just, category: build, installers: { apt: just } }
- { name: just, category: build, installers: { cargo: just } }
- { name: meson, category: build, installers: { pip: meson } }
"#;
        let loaded = load_str("t.yml", yaml).unwrap();
        assert_eq!(names(&loaded), vec!["meson"]);
        assert_eq!(loaded.errors.len(), 2);
        assert!(loaded
            .errors
            .iter()
            .all(|e| matches!(e, CatalogueError::DuplicateName { count: 2, .. })));
    }

    #[test]
    fn tagged_scalars_still_load() {
        let yaml = "- { name: !!str 7zip, category: archive, installers: { apt: p7zip-full } }";
        let loaded = load_str("t.yml", yaml).unwrap();
        assert!(loaded.errors.is_empty(), "{:?}", loaded.errors);
        assert_eq!(names(&loaded), vec!["7zip"]);
    }

    #[test]
    fn invalid_yaml_fails_the_source() {
        let err = load_str("broken.yml", "tools: [ {").unwrap_err();
        assert!(matches!(err, DevtoolsError::CatalogueLoad { .. }));
        assert!(err.to_string().contains("broken.yml"));
    }

    #[test]
    fn scalar_document_fails_the_source() {
        let err = load_str("odd.yml", "just").unwrap_err();
        assert!(matches!(err, DevtoolsError::CatalogueLoad { .. }));
    }

    #[test]
    fn empty_document_is_an_empty_catalogue() {
        let loaded = load_str("empty.yml", "").unwrap();
        assert!(loaded.catalogue.is_empty());
        assert!(loaded.errors.is_empty());
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = CatalogueSource::from_file(Path::new("/nonexistent/catalogue.yml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalogue.yml"));
    }

    #[test]
    fn entry_name_is_exposed_for_named_errors() {
        let err = CatalogueError::NoInstallers {
            origin: "t.yml".into(),
            name: "just".into(),
        };
        assert_eq!(err.entry_name(), Some("just"));
        let err = CatalogueError::MissingName {
            origin: "t.yml".into(),
            index: 0,
        };
        assert_eq!(err.entry_name(), None);
    }
}
