//! Typed projection and navigation over resolved values.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use super::{FragmentRegistry, Reference, Value, ValueKind};
use crate::errors::{ResolveError, Result};

/// A resolved value together with the [`Reference`] that names its
/// location and the registry that produced it.
///
/// The stored reference is always the fully dereferenced target — never an
/// intermediate indirection node. Fragments are created on demand and not
/// cached, so two resolutions of the same coordinate yield distinct
/// instances that still compare equal: equality and hashing delegate to
/// the reference alone. Deduplication structures keyed by `Fragment`
/// therefore key on location, not on structural value equality.
pub struct Fragment<'a> {
    reference: Reference,
    value: Value,
    registry: &'a FragmentRegistry,
}

impl<'a> Fragment<'a> {
    pub(super) fn new(
        reference: Reference,
        value: Value,
        registry: &'a FragmentRegistry,
    ) -> Fragment<'a> {
        Fragment {
            reference,
            value,
            registry,
        }
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    fn mismatch(&self, expected: ValueKind) -> ResolveError {
        ResolveError::TypeMismatch {
            reference: self.reference.clone(),
            expected,
            actual: self.value.kind(),
        }
    }

    pub fn as_map(&self) -> Result<&IndexMap<String, Value>> {
        self.value
            .as_map()
            .ok_or_else(|| self.mismatch(ValueKind::Map))
    }

    pub fn as_list(&self) -> Result<&[Value]> {
        self.value
            .as_list()
            .ok_or_else(|| self.mismatch(ValueKind::List))
    }

    pub fn as_str(&self) -> Result<&str> {
        self.value
            .as_str()
            .ok_or_else(|| self.mismatch(ValueKind::String))
    }

    /// Boolean projection. A string value holding a boolean literal is
    /// accepted too, which accommodates loosely-typed YAML scalars.
    pub fn as_bool(&self) -> Result<bool> {
        match &self.value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => s.parse().map_err(|_| self.mismatch(ValueKind::Bool)),
            _ => Err(self.mismatch(ValueKind::Bool)),
        }
    }

    /// Resolves the child coordinate at `segments` through the owning
    /// registry, so navigation transparently re-resolves indirection.
    /// Fails when the coordinate is absent.
    pub fn get<I, S>(&self, segments: I) -> Result<Fragment<'a>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.get(&self.reference.child(segments))
    }

    /// Non-failing counterpart of [`Fragment::get`].
    pub fn get_opt<I, S>(&self, segments: I) -> Result<Option<Fragment<'a>>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.get_opt(&self.reference.child(segments))
    }

    /// Single numeric child access.
    pub fn get_index(&self, index: usize) -> Result<Fragment<'a>> {
        self.get([index.to_string()])
    }

    /// Navigates to the parent coordinate within the same document (not
    /// back through any indirection that produced this fragment). The
    /// document root has no parent.
    pub fn parent(&self) -> Result<Option<Fragment<'a>>> {
        match self.reference.parent() {
            Some(parent) => self.registry.get(&parent).map(Some),
            None => Ok(None),
        }
    }

    /// Child fragments keyed by this mapping's keys, in insertion order.
    pub fn entries(&self) -> Result<Vec<(String, Fragment<'a>)>> {
        self.as_map()?
            .keys()
            .map(|key| Ok((key.clone(), self.get([key.as_str()])?)))
            .collect()
    }

    /// Child fragments of this sequence, in ascending index order.
    pub fn items(&self) -> Result<Vec<Fragment<'a>>> {
        (0..self.as_list()?.len())
            .map(|index| self.get_index(index))
            .collect()
    }

    /// Child fragments of a mapping (by key, insertion order) or a
    /// sequence (by index, ascending). Any other receiver kind fails.
    pub fn children(&self) -> Result<Vec<Fragment<'a>>> {
        match &self.value {
            Value::Map(_) => Ok(self
                .entries()?
                .into_iter()
                .map(|(_, fragment)| fragment)
                .collect()),
            Value::List(_) => self.items(),
            _ => Err(self.mismatch(ValueKind::Map)),
        }
    }

    /// Maps `f` over [`Fragment::children`].
    pub fn try_map<T>(&self, mut f: impl FnMut(Fragment<'a>) -> Result<T>) -> Result<Vec<T>> {
        self.children()?.into_iter().map(&mut f).collect()
    }

    /// Maps `f` over [`Fragment::children`] together with each child's
    /// position.
    pub fn try_map_indexed<T>(
        &self,
        mut f: impl FnMut(usize, Fragment<'a>) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.children()?
            .into_iter()
            .enumerate()
            .map(|(index, fragment)| f(index, fragment))
            .collect()
    }
}

impl fmt::Debug for Fragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("reference", &self.reference)
            .field("value", &self.value)
            .finish()
    }
}

impl PartialEq for Fragment<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for Fragment<'_> {}

impl Hash for Fragment<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}
