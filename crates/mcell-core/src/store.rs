//! Registries for species and release sites.
//!
//! - [`KeyedStore`] maps a unique name to a value and remembers the
//!   registration order, which the engine uses as its traversal order.
//! - [`SequentialStore`] is an append-only sequence with no uniqueness
//!   constraint.
//!
//! Neither store supports removal: everything registered during
//! configuration stays alive for the whole run.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::error::StoreError;

/// Name-to-value registry with registration-order iteration.
///
/// Lookups of missing keys return `None`; only inserting a key that is
/// already present is an error.
#[derive(Clone, Debug)]
pub struct KeyedStore<T> {
    entries: IndexMap<String, T>,
}

impl<T> KeyedStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Insert `value` under `name`, returning its registration index.
    ///
    /// Fails with [`StoreError::DuplicateKey`] if `name` is already
    /// present; the existing entry is not modified.
    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Result<usize, StoreError> {
        match self.entries.entry(name.into()) {
            Entry::Occupied(e) => Err(StoreError::DuplicateKey {
                key: e.key().clone(),
            }),
            Entry::Vacant(e) => {
                let index = e.index();
                e.insert(value);
                Ok(index)
            }
        }
    }

    /// Look up the value registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    /// Mutable variant of [`lookup`](Self::lookup).
    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries.get_mut(name)
    }

    /// Registration index of `name`, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.get_index_of(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entry at registration index `index`.
    pub fn get_index(&self, index: usize) -> Option<(&str, &T)> {
        self.entries
            .get_index(index)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Mutable value at registration index `index`.
    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_index_mut(index).map(|(_, v)| v)
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate values in registration order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.values()
    }

    /// Iterate values mutably in registration order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.entries.values_mut()
    }
}

impl<T> Default for KeyedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Append-ordered sequence of values.
///
/// Iteration always yields elements in insertion order and can be
/// restarted any number of times.
#[derive(Clone, Debug)]
pub struct SequentialStore<T> {
    items: Vec<T>,
}

impl<T> SequentialStore<T> {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append `value`, returning its position. Amortized O(1).
    pub fn append(&mut self, value: T) -> usize {
        self.items.push(value);
        self.items.len() - 1
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lazy forward iterator in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Visit every element in insertion order.
    pub fn for_each(&self, f: impl FnMut(&T)) {
        self.items.iter().for_each(f);
    }
}

impl<T> Default for SequentialStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a SequentialStore<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for SequentialStore<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
