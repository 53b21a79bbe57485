//! The `Reference` coordinate system.
//!
//! A `Reference` names a location inside the document graph: the owning
//! document plus an ordered sequence of path segments. It is the identity
//! used everywhere downstream — two references are the same entity exactly
//! when both fields match, regardless of the value currently living there.

use std::fmt;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// An immutable coordinate inside the document graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    document: String,
    segments: Vec<String>,
}

impl Reference {
    /// The root coordinate of a document.
    pub fn root(document: impl Into<String>) -> Reference {
        Reference {
            document: document.into(),
            segments: Vec::new(),
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Appends segments, yielding a new coordinate.
    pub fn child<I, S>(&self, segments: I) -> Reference
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut extended = self.segments.clone();
        extended.extend(segments.into_iter().map(Into::into));
        Reference {
            document: self.document.clone(),
            segments: extended,
        }
    }

    /// Drops the last segment. The document root has no parent.
    pub fn parent(&self) -> Option<Reference> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Reference {
            document: self.document.clone(),
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Resolves a `<path>#<pointer>` reference string against this
    /// coordinate.
    ///
    /// Both parts are optional: an empty path keeps the current document,
    /// a missing pointer targets the document root. The path is resolved
    /// relative to the current document (supporting `../`, `./` and
    /// absolute `/` forms); pointer segments are split on `/`, empty
    /// segments dropped, and each segment percent-decoded.
    pub fn resolve(&self, reference: &str) -> Reference {
        static REF_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^(?<path>[^#]*)(?:#(?<pointer>(?s:.)*))?$").unwrap());

        let (path, pointer) = match REF_RE.captures(reference) {
            Some(captures) => (
                captures
                    .name("path")
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                captures.name("pointer").map(|m| m.as_str().to_string()),
            ),
            None => (reference.to_string(), None),
        };

        let document = if path.is_empty() {
            self.document.clone()
        } else {
            resolve_relative(&self.document, &path)
        };

        let segments = pointer
            .as_deref()
            .unwrap_or("")
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(percent_decode)
            .collect();

        Reference { document, segments }
    }

    /// True when `other` lies strictly below this coordinate in the same
    /// document.
    pub fn is_ancestor_of(&self, other: &Reference) -> bool {
        self.document == other.document
            && other.segments.len() > self.segments.len()
            && other.segments.starts_with(&self.segments)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document, self.segments.iter().join("/"))
    }
}

/// Percent-decodes a pointer segment, falling back to the raw text when the
/// encoding is malformed.
pub(crate) fn percent_decode(segment: &str) -> String {
    urlencoding::decode(segment).map_or_else(|_| segment.to_string(), |d| d.to_string())
}

/// Resolves `path` against the directory of `base_document`, collapsing
/// `.` and `..` segments. A leading `/` anchors at the document base root.
fn resolve_relative(base_document: &str, path: &str) -> String {
    let mut resolved: Vec<&str> = if path.starts_with('/') {
        Vec::new()
    } else {
        let mut dir: Vec<&str> = base_document.split('/').collect();
        dir.pop();
        dir
    };

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }

    resolved.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_no_segments() {
        let reference = Reference::root("dto.yaml");
        assert_eq!(reference.document(), "dto.yaml");
        assert!(reference.segments().is_empty());
    }

    #[test]
    fn test_child_extends_without_mutating() {
        let root = Reference::root("dto.yaml");
        let child = root.child(["properties", "name"]);
        assert_eq!(child.segments(), &["properties", "name"]);
        assert!(root.segments().is_empty());
    }

    #[test]
    fn test_parent_drops_last_segment() {
        let child = Reference::root("dto.yaml").child(["a", "b"]);
        let parent = child.parent().unwrap();
        assert_eq!(parent.segments(), &["a"]);
        assert!(Reference::root("dto.yaml").parent().is_none());
    }

    #[test]
    fn test_resolve_same_document_pointer() {
        let reference = Reference::root("a.yaml").resolve("#/bar");
        assert_eq!(reference.document(), "a.yaml");
        assert_eq!(reference.segments(), &["bar"]);
    }

    #[test]
    fn test_resolve_relative_cross_file() {
        let reference = Reference::root("a/b.yaml").resolve("../c.yaml#/x/0");
        assert_eq!(reference.document(), "c.yaml");
        assert_eq!(reference.segments(), &["x", "0"]);
    }

    #[test]
    fn test_resolve_same_directory_form() {
        let reference = Reference::root("a/b.yaml").resolve("./d.yaml#/y");
        assert_eq!(reference.document(), "a/d.yaml");
        assert_eq!(reference.segments(), &["y"]);
    }

    #[test]
    fn test_resolve_absolute_form() {
        let reference = Reference::root("a/b.yaml").resolve("/lib/common.yaml#/z");
        assert_eq!(reference.document(), "lib/common.yaml");
        assert_eq!(reference.segments(), &["z"]);
    }

    #[test]
    fn test_resolve_defaults_to_document_root() {
        let reference = Reference::root("a.yaml").resolve("b.yaml");
        assert_eq!(reference.document(), "b.yaml");
        assert!(reference.segments().is_empty());

        let reference = Reference::root("a.yaml").resolve("b.yaml#");
        assert!(reference.segments().is_empty());
    }

    #[test]
    fn test_resolve_is_computed_from_the_source_document() {
        // The same reference string lands on different documents depending
        // on where it appears.
        let from_nested = Reference::root("api/v1/spec.yaml").resolve("types.yaml#/id");
        assert_eq!(from_nested.document(), "api/v1/types.yaml");

        let from_root = Reference::root("spec.yaml").resolve("types.yaml#/id");
        assert_eq!(from_root.document(), "types.yaml");
    }

    #[test]
    fn test_pointer_segments_are_percent_decoded() {
        let reference = Reference::root("a.yaml").resolve("#/%2Fslash/plain");
        assert_eq!(reference.segments(), &["/slash", "plain"]);
    }

    #[test]
    fn test_empty_pointer_segments_are_dropped() {
        let reference = Reference::root("a.yaml").resolve("#//foo//bar/");
        assert_eq!(reference.segments(), &["foo", "bar"]);
    }

    #[test]
    fn test_is_ancestor_of() {
        let root = Reference::root("a.yaml");
        let child = root.child(["x"]);
        let grandchild = child.child(["y"]);

        assert!(root.is_ancestor_of(&child));
        assert!(root.is_ancestor_of(&grandchild));
        assert!(child.is_ancestor_of(&grandchild));
        assert!(!child.is_ancestor_of(&root));
        assert!(!child.is_ancestor_of(&child));
        assert!(!root.is_ancestor_of(&Reference::root("b.yaml").child(["x"])));
    }

    #[test]
    fn test_display_form() {
        let reference = Reference::root("a/b.yaml").child(["x", "0"]);
        assert_eq!(reference.to_string(), "a/b.yaml#x/0");
        assert_eq!(Reference::root("a.yaml").to_string(), "a.yaml#");
    }

    #[test]
    fn test_structural_equality_and_hash() {
        use std::collections::HashSet;

        let a = Reference::root("a.yaml").child(["x"]);
        let b = Reference::root("a.yaml").child(["x"]);
        let c = Reference::root("a.yaml").child(["y"]);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        set.insert(c);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_parent_escape_is_clamped_at_base_root() {
        let reference = Reference::root("a.yaml").resolve("../../c.yaml#/x");
        assert_eq!(reference.document(), "c.yaml");
    }
}
