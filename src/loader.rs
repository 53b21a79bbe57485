//! Document loading boundary.
//!
//! A `ContentLoader` turns a document path into a raw structural [`Value`].
//! The parser is chosen by filename extension alone; there is no content
//! sniffing. Loaders never cache — read-through caching belongs to the
//! registry that owns them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::{ResolveError, Result};
use crate::registry::{percent_decode, Value};

/// Loads a root document by path.
pub trait ContentLoader {
    /// Returns the parsed top-level value of the document at `path`.
    ///
    /// Fails when the path is unreadable, unparsable, or carries an
    /// unsupported extension.
    fn load_map(&self, path: &str) -> Result<Value>;
}

/// Parses `text` as the format indicated by the extension of `path`.
pub fn parse_document(path: &str, text: &str) -> Result<Value> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => {
            let parsed: serde_json::Value =
                serde_json::from_str(text).map_err(|err| ResolveError::Load {
                    path: path.to_string(),
                    message: err.to_string(),
                })?;
            Ok(Value::from(parsed))
        }
        Some("yaml") | Some("yml") => {
            let parsed: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|err| ResolveError::Load {
                    path: path.to_string(),
                    message: err.to_string(),
                })?;
            Ok(Value::from(parsed))
        }
        _ => Err(ResolveError::UnsupportedExtension {
            path: path.to_string(),
        }),
    }
}

/// Filesystem-backed loader anchored at a base directory.
///
/// Document paths are percent-decoded before being joined onto the base,
/// so references to files with spaces or other encoded characters open
/// correctly.
pub struct FsLoader {
    base_dir: PathBuf,
}

impl FsLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> FsLoader {
        FsLoader {
            base_dir: base_dir.into(),
        }
    }
}

impl ContentLoader for FsLoader {
    fn load_map(&self, path: &str) -> Result<Value> {
        let decoded = percent_decode(path);
        let full_path = self.base_dir.join(&decoded);
        let text = std::fs::read_to_string(&full_path).map_err(|err| ResolveError::Load {
            path: path.to_string(),
            message: format!("{}: {}", full_path.display(), err),
        })?;
        parse_document(&decoded, &text)
    }
}

/// In-memory loader over a preloaded `path -> text` mapping. No I/O.
pub struct MemLoader {
    documents: HashMap<String, String>,
}

impl MemLoader {
    pub fn new() -> MemLoader {
        MemLoader {
            documents: HashMap::new(),
        }
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(path.into(), text.into());
    }
}

impl Default for MemLoader {
    fn default() -> Self {
        MemLoader::new()
    }
}

impl<P: Into<String>, T: Into<String>> FromIterator<(P, T)> for MemLoader {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        MemLoader {
            documents: iter
                .into_iter()
                .map(|(path, text)| (path.into(), text.into()))
                .collect(),
        }
    }
}

impl ContentLoader for MemLoader {
    fn load_map(&self, path: &str) -> Result<Value> {
        let text = self
            .documents
            .get(path)
            .ok_or_else(|| ResolveError::Load {
                path: path.to_string(),
                message: "no such document".to_string(),
            })?;
        parse_document(path, text)
    }
}
