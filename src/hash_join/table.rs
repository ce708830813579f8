//! Build table
//!
//! Key → values multimap filled from the build side of a hash join.

use std::collections::HashMap;

/// In-memory multimap for the build side
///
/// Values under one key keep their insertion order.
#[derive(Debug, Default)]
pub struct BuildTable {
    entries: HashMap<String, Vec<String>>,
    /// Total number of values across all keys
    value_count: usize,
}

impl BuildTable {
    /// Create a new empty BuildTable
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the list stored under `key`
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.get_mut(key) {
            Some(values) => values.push(value.to_string()),
            None => {
                self.entries.insert(key.to_string(), vec![value.to_string()]);
            }
        }
        self.value_count += 1;
    }

    /// Values stored under `key`, in insertion order
    pub fn get(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct keys
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of stored values
    pub fn value_count(&self) -> usize {
        self.value_count
    }

    pub fn is_empty(&self) -> bool {
        self.value_count == 0
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.value_count = 0;
    }
}
