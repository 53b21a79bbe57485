//! Broken-reference diagnostics.
//!
//! Walks the raw tree of a document, attempts to resolve every indirection
//! node it finds, and reports the coordinates whose targets are absent or
//! fail to resolve. `check_tree` extends the sweep to every document
//! discovered under a base directory.

use std::path::Path;

use itertools::Itertools;
use walkdir::WalkDir;

use crate::config::Settings;
use crate::errors::ResolveError;
use crate::loader::FsLoader;
use crate::registry::{FragmentRegistry, Reference, Value};

/// One broken reference: the coordinate of the indirection node, the raw
/// reference string it carried (absent when the document itself failed to
/// load), and the failure.
#[derive(Debug)]
pub struct Diagnostic {
    pub reference: Reference,
    pub target: Option<String>,
    pub error: ResolveError,
}

/// Result of sweeping a directory tree.
#[derive(Debug)]
pub struct TreeReport {
    pub documents_checked: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl TreeReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Checks every indirection node reachable in the raw tree of `path`.
///
/// A document that cannot be loaded at all yields a single diagnostic at
/// its root coordinate.
pub fn check_document(registry: &FragmentRegistry, path: &str) -> Vec<Diagnostic> {
    let root_reference = Reference::root(path);
    let root = match registry.load_document(path) {
        Ok(value) => value,
        Err(error) => {
            return vec![Diagnostic {
                reference: root_reference,
                target: None,
                error,
            }]
        }
    };

    let mut diagnostics = Vec::new();
    collect(registry, &root_reference, &root, &mut diagnostics);
    diagnostics
}

fn collect(
    registry: &FragmentRegistry,
    reference: &Reference,
    value: &Value,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        Value::Map(map) => {
            if let Some(Value::String(target)) = map.get(registry.settings().ref_key.as_str()) {
                // An indirection node; siblings are suppressed, so there is
                // nothing else to descend into.
                match registry.get_opt(reference) {
                    Ok(Some(_)) => {}
                    Ok(None) => diagnostics.push(Diagnostic {
                        reference: reference.clone(),
                        target: Some(target.clone()),
                        error: ResolveError::NotFound {
                            reference: reference.resolve(target),
                        },
                    }),
                    Err(error) => diagnostics.push(Diagnostic {
                        reference: reference.clone(),
                        target: Some(target.clone()),
                        error,
                    }),
                }
                return;
            }
            for (key, child) in map {
                collect(registry, &reference.child([key.as_str()]), child, diagnostics);
            }
        }
        Value::List(items) => {
            for (index, child) in items.iter().enumerate() {
                collect(
                    registry,
                    &reference.child([index.to_string()]),
                    child,
                    diagnostics,
                );
            }
        }
        _ => {}
    }
}

/// Discovers every `.json`/`.yaml`/`.yml` document under `base_dir`
/// (hidden directories skipped) and checks each one through a shared
/// registry, so cross-document references load their targets only once.
pub fn check_tree(base_dir: &Path, settings: &Settings) -> TreeReport {
    let document_paths = WalkDir::new(base_dir)
        .into_iter()
        .filter_entry(|e| {
            !e.file_name()
                .to_str()
                .map(|s| s.starts_with('.'))
                .unwrap_or(false)
        })
        .flatten()
        .filter(|e| {
            matches!(
                e.path().extension().and_then(|ext| ext.to_str()),
                Some("json") | Some("yaml") | Some("yml")
            )
        })
        .flat_map(|e| document_key(base_dir, e.path()))
        .collect_vec();

    let registry =
        FragmentRegistry::with_settings(FsLoader::new(base_dir), settings.clone());

    let mut diagnostics = Vec::new();
    for path in &document_paths {
        diagnostics.extend(check_document(&registry, path));
    }

    TreeReport {
        documents_checked: document_paths.len(),
        diagnostics,
    }
}

/// Base-relative, `/`-separated document key for a discovered file — the
/// same normalization the registry uses for cache lookups and relative
/// resolution.
fn document_key(base_dir: &Path, path: &Path) -> Option<String> {
    let diff = pathdiff::diff_paths(path, base_dir)?;
    let key = diff
        .components()
        .flat_map(|c| c.as_os_str().to_str())
        .join("/");
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_docs_dir, mem_registry};
    use std::fs;

    #[test]
    fn test_clean_document_has_no_diagnostics() {
        let registry = mem_registry(&[("dto.yaml", "type: object\nproperties:\n  id: {}\n")]);
        let diagnostics = check_document(&registry, "dto.yaml");
        assert!(diagnostics.is_empty(), "got {diagnostics:?}");
    }

    #[test]
    fn test_broken_reference_is_reported_with_its_coordinate() {
        let registry = mem_registry(&[(
            "a.yaml",
            "good:\n  $ref: \"#/target\"\nbad:\n  $ref: \"#/missing\"\ntarget: 42\n",
        )]);
        let diagnostics = check_document(&registry, "a.yaml");
        assert_eq!(diagnostics.len(), 1, "got {diagnostics:?}");
        assert_eq!(diagnostics[0].reference.segments(), &["bad"]);
        assert_eq!(diagnostics[0].target.as_deref(), Some("#/missing"));
    }

    #[test]
    fn test_unloadable_document_yields_a_root_diagnostic() {
        let registry = mem_registry(&[]);
        let diagnostics = check_document(&registry, "ghost.yaml");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].reference.segments().is_empty());
        assert!(diagnostics[0].target.is_none());
    }

    #[test]
    fn test_circular_chain_is_reported_not_overflowed() {
        let registry = mem_registry(&[(
            "a.yaml",
            "x:\n  $ref: \"#/y\"\ny:\n  $ref: \"#/x\"\n",
        )]);
        let diagnostics = check_document(&registry, "a.yaml");
        assert_eq!(diagnostics.len(), 2, "got {diagnostics:?}");
        assert!(diagnostics
            .iter()
            .all(|d| matches!(d.error, ResolveError::CircularReference { .. })));
    }

    #[test]
    fn test_references_inside_lists_are_checked() {
        let registry = mem_registry(&[(
            "a.yaml",
            "items:\n  - $ref: \"#/missing\"\n",
        )]);
        let diagnostics = check_document(&registry, "a.yaml");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].reference.segments(), &["items", "0"]);
    }

    #[test]
    fn test_check_tree_discovers_and_checks_documents() {
        let (_temp_dir, docs_dir) = create_test_docs_dir();
        fs::write(docs_dir.join("ok.yaml"), "x: 1\n").unwrap();
        fs::write(
            docs_dir.join("broken.yaml"),
            "y:\n  $ref: \"missing.yaml#/z\"\n",
        )
        .unwrap();
        fs::write(docs_dir.join("notes.txt"), "not a document").unwrap();

        let report = check_tree(&docs_dir, &Settings::default());
        assert_eq!(report.documents_checked, 2);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.diagnostics[0].reference.document(), "broken.yaml");
    }

    #[test]
    fn test_check_tree_resolves_cross_document_references() {
        let (_temp_dir, docs_dir) = create_test_docs_dir();
        fs::create_dir(docs_dir.join("a")).unwrap();
        fs::write(
            docs_dir.join("a/b.yaml"),
            "value:\n  $ref: \"../c.yaml#/x\"\n",
        )
        .unwrap();
        fs::write(docs_dir.join("c.yaml"), "x: 1\n").unwrap();

        let report = check_tree(&docs_dir, &Settings::default());
        assert_eq!(report.documents_checked, 2);
        assert!(report.is_clean(), "got {:?}", report.diagnostics);
    }
}
