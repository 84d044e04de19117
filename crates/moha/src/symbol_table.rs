//! Ordered insertion-preserving name → index map.
//!
//! `add` returns the existing index or appends and returns a new one; `get`
//! returns the index or a sentinel. The same abstraction backs function
//! locals, referenced globals, and the key-index tables behind a compiled
//! `Code` object.

use indexmap::IndexMap;

/// An ordered insertion-preserving map from name to dense integer index.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    index: IndexMap<String, u32>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing index for `name`, or appends it and returns a fresh one.
    pub fn add(&mut self, name: &str) -> u32 {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = u32::try_from(self.index.len()).expect("symbol table exceeds u32 capacity");
        self.index.insert(name.to_owned(), idx);
        idx
    }

    /// Returns the index for `name`, or `None` if it has never been added.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.index.len()
    }

    /// Returns the name originally inserted at `index`.
    #[must_use]
    pub fn key_at(&self, index: u32) -> Option<&str> {
        self.index.get_index(index as usize).map(|(k, _)| k.as_str())
    }

    /// Iterates names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent_and_ordered() {
        let mut table = SymbolTable::new();
        assert_eq!(table.add("a"), 0);
        assert_eq!(table.add("b"), 1);
        assert_eq!(table.add("a"), 0);
        assert_eq!(table.size(), 2);
        assert_eq!(table.key_at(0), Some("a"));
        assert_eq!(table.key_at(1), Some("b"));
    }

    #[test]
    fn get_returns_none_for_unknown_name() {
        let mut table = SymbolTable::new();
        table.add("x");
        assert_eq!(table.get("x"), Some(0));
        assert_eq!(table.get("y"), None);
    }
}
