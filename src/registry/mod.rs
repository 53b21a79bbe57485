//! The reference-resolution core.
//!
//! A [`FragmentRegistry`] owns a cache of loaded root documents and answers
//! one question: what value lives at a given [`Reference`]? When the raw
//! value at a coordinate turns out to be an indirection node (a mapping
//! whose reserved key holds a reference string), the registry silently
//! chases the chain to its terminal value, so callers never see a raw
//! indirection node. The final coordinate/value pair is handed back as a
//! [`Fragment`], which navigates further through the same registry.

mod fragment;
mod reference;
mod value;


pub use fragment::Fragment;
pub use reference::Reference;
pub(crate) use reference::percent_decode;
pub use value::{Value, ValueKind};

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::config::Settings;
use crate::errors::{ResolveError, Result};
use crate::loader::ContentLoader;

/// Loads, caches and dereferences documents.
///
/// The document cache is per-instance and append-only: each document path
/// is loaded at most once and treated as immutable for the registry's
/// lifetime. Resolution is synchronous and single-threaded; two registries
/// never share state.
pub struct FragmentRegistry {
    loader: Box<dyn ContentLoader>,
    settings: Settings,
    cache: RefCell<HashMap<String, Value>>,
}

impl FragmentRegistry {
    pub fn new(loader: impl ContentLoader + 'static) -> FragmentRegistry {
        FragmentRegistry::with_settings(loader, Settings::default())
    }

    pub fn with_settings(
        loader: impl ContentLoader + 'static,
        settings: Settings,
    ) -> FragmentRegistry {
        FragmentRegistry {
            loader: Box::new(loader),
            settings,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the root value of a document, loading it on first access.
    pub fn load_document(&self, path: &str) -> Result<Value> {
        if let Some(value) = self.cache.borrow().get(path) {
            return Ok(value.clone());
        }
        debug!(path = %path, "loading document");
        let value = self.loader.load_map(path)?;
        self.cache.borrow_mut().insert(path.to_string(), value.clone());
        Ok(value)
    }

    /// Walks the reference's segments through its document.
    ///
    /// Returns `Ok(None)` when a key or index is legitimately absent — that
    /// is not an error, unlike descending into a scalar or indexing a list
    /// with a non-numeric segment. An empty segment stays at the current
    /// value, which keeps pointer forms with spurious empty segments
    /// working.
    pub fn raw_value_at(&self, reference: &Reference) -> Result<Option<Value>> {
        let mut current = self.load_document(reference.document())?;

        for segment in reference.segments() {
            if segment.is_empty() {
                continue;
            }
            current = match current {
                Value::Map(map) => match map.get(segment.as_str()) {
                    Some(value) => value.clone(),
                    None => return Ok(None),
                },
                Value::List(items) => {
                    let index: usize =
                        segment.parse().map_err(|_| ResolveError::Navigation {
                            reference: reference.clone(),
                            message: format!(
                                "list index '{}' is not a non-negative integer",
                                segment
                            ),
                        })?;
                    match items.get(index) {
                        Some(value) => value.clone(),
                        None => return Ok(None),
                    }
                }
                scalar => {
                    return Err(ResolveError::Navigation {
                        reference: reference.clone(),
                        message: format!(
                            "cannot descend into {} at segment '{}'",
                            scalar.kind(),
                            segment
                        ),
                    })
                }
            };
        }

        Ok(Some(current))
    }

    /// Resolves a coordinate to its terminal, dereferenced value.
    ///
    /// Indirection nodes are substituted transitively; the returned
    /// reference names the final target, never an intermediate node.
    pub fn resolve(&self, reference: &Reference) -> Result<Option<(Reference, Value)>> {
        let mut visited = HashSet::new();
        self.resolve_chain(reference.clone(), &mut visited)
    }

    fn resolve_chain(
        &self,
        reference: Reference,
        visited: &mut HashSet<Reference>,
    ) -> Result<Option<(Reference, Value)>> {
        if !visited.insert(reference.clone()) {
            return Err(ResolveError::CircularReference { reference });
        }
        if visited.len() > self.settings.max_resolution_depth {
            return Err(ResolveError::DepthExceeded {
                reference,
                limit: self.settings.max_resolution_depth,
            });
        }

        let Some(value) = self.raw_value_at(&reference)? else {
            return Ok(None);
        };

        if let Some(target) = indirection_target(&value, &self.settings.ref_key) {
            trace!(from = %reference, target = %target, "following indirection");
            let next = reference.resolve(target);
            return self.resolve_chain(next, visited);
        }

        Ok(Some((reference, value)))
    }

    /// Resolves a coordinate into a [`Fragment`], failing when it is
    /// absent.
    pub fn get(&self, reference: &Reference) -> Result<Fragment<'_>> {
        self.get_opt(reference)?
            .ok_or_else(|| ResolveError::NotFound {
                reference: reference.clone(),
            })
    }

    /// Non-failing counterpart of [`FragmentRegistry::get`].
    pub fn get_opt(&self, reference: &Reference) -> Result<Option<Fragment<'_>>> {
        Ok(self
            .resolve(reference)?
            .map(|(reference, value)| Fragment::new(reference, value, self)))
    }
}

/// An indirection node is a mapping whose reserved key holds a string.
/// Any sibling keys are deliberately ignored once the reserved key is
/// present.
fn indirection_target<'v>(value: &'v Value, ref_key: &str) -> Option<&'v str> {
    match value {
        Value::Map(map) => match map.get(ref_key) {
            Some(Value::String(target)) => Some(target),
            _ => None,
        },
        _ => None,
    }
}
