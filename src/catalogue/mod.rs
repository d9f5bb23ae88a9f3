//! The declarative tool catalogue.
//!
//! # Modules
//!
//! - [`entry`] - Tool entries, detect checks and installers
//! - [`loader`] - YAML parsing with per-entry error isolation
//! - [`builtin`] - The catalogue embedded in the binary

pub mod builtin;
pub mod entry;
pub mod loader;

pub use entry::{Detect, InstallAction, Installer, ToolEntry};
pub use loader::{load_sources, load_str, CatalogueError, CatalogueSource, LoadedCatalogue};

/// An immutable, ordered set of valid tool entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    entries: Vec<ToolEntry>,
}

impl Catalogue {
    /// Build a catalogue from entries already known to be valid.
    pub fn new(entries: Vec<ToolEntry>) -> Self {
        Self { entries }
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[ToolEntry] {
        &self.entries
    }

    /// Look up an entry by exact name.
    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Categories in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.category.as_str()) {
                seen.push(&entry.category);
            }
        }
        seen
    }

    /// Keep only entries matching the filter.
    pub fn filtered(&self, filter: &EntryFilter) -> Catalogue {
        Catalogue::new(
            self.entries
                .iter()
                .filter(|e| filter.matches(e))
                .cloned()
                .collect(),
        )
    }
}

/// Selection by category and name substring.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Exact categories (case-insensitive). Empty matches all.
    pub categories: Vec<String>,
    /// Case-insensitive substring of the entry name.
    pub name: Option<String>,
}

impl EntryFilter {
    /// Whether an entry is selected.
    pub fn matches(&self, entry: &ToolEntry) -> bool {
        let category_ok = self.categories.is_empty()
            || self
                .categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&entry.category));

        let name_ok = self
            .name
            .as_ref()
            .is_none_or(|n| entry.name.to_lowercase().contains(&n.to_lowercase()));

        category_ok && name_ok
    }
}
