//! Built-in catalogue embedded at compile time.
//!
//! Every `*.yml` file under `catalogue/` in the crate root becomes one
//! source, loaded in file-name order so the result is deterministic.

use crate::catalogue::loader::CatalogueSource;
use include_dir::{include_dir, Dir};

/// Embedded catalogue directory.
static CATALOGUE_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/catalogue");

/// All built-in catalogue sources.
pub fn sources() -> Vec<CatalogueSource> {
    let mut files: Vec<_> = CATALOGUE_DIR
        .files()
        .filter(|f| {
            f.path()
                .extension()
                .is_some_and(|ext| ext == "yml" || ext == "yaml")
        })
        .collect();
    files.sort_by(|a, b| a.path().cmp(b.path()));

    files
        .into_iter()
        .filter_map(|file| {
            let origin = format!("builtin:{}", file.path().display());
            match file.contents_utf8() {
                Some(content) => Some(CatalogueSource::new(origin, content)),
                None => {
                    tracing::warn!("{} is not valid UTF-8; skipped", origin);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::load_sources;

    #[test]
    fn builtin_sources_exist() {
        assert!(!sources().is_empty());
    }

    #[test]
    fn builtin_catalogue_loads_cleanly() {
        let loaded = load_sources(&sources()).unwrap();
        assert!(
            loaded.errors.is_empty(),
            "built-in catalogue has errors: {:?}",
            loaded.errors
        );
        assert!(loaded.catalogue.len() >= 20);
    }

    #[test]
    fn builtin_catalogue_has_core_tools() {
        let catalogue = load_sources(&sources()).unwrap().catalogue;
        for name in ["just", "rustup", "meson", "libwayland-dev", "podman"] {
            assert!(catalogue.get(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn builtin_sources_are_sorted() {
        let origins: Vec<_> = sources().into_iter().map(|s| s.origin).collect();
        let mut sorted = origins.clone();
        sorted.sort();
        assert_eq!(origins, sorted);
    }
}
