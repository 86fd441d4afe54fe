//! Ordered string metadata tags.

use std::fmt;

/// An ordered key/value tag store.
///
/// Insertion order is preserved; setting an existing key updates it in
/// place. Filter graphs attach per-frame dictionaries that replace the
/// bridge's tag store wholesale, so replacement is a first-class
/// operation here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    entries: Vec<(String, String)>,
}

impl Tags {
    /// Create an empty tag store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a tag, replacing any existing value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Look up a tag value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the entire contents with another store's entries.
    pub fn replace_with(&mut self, other: &Tags) {
        self.entries.clear();
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Remove all tags.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        Ok(())
    }
}
