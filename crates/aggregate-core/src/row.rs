// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Flat rows.
//!
//! A [`FlatRow`] is the single-level shape an aggregate takes in storage:
//! logical column names mapped to [`Value`]s, in column order. It never
//! nests.

use std::ops::Index;

use indexmap::{IndexMap, map};

use crate::value::Value;

/// Ordered mapping from logical column name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRow {
    columns: IndexMap<String, Value>
}

impl FlatRow {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty row with room for `capacity` columns.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: IndexMap::with_capacity(capacity)
        }
    }

    /// Set a column, returning the previous value.
    ///
    /// A new column is appended; an existing one keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.columns.insert(name.into(), value.into())
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value of a column.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }

    /// Remove a column and return its value.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.columns.swap_remove(name)
    }

    /// Check if a column is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Columns in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Index<&str> for FlatRow {
    type Output = Value;

    fn index(&self, name: &str) -> &Self::Output {
        &self.columns[name]
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FlatRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect()
        }
    }
}

impl IntoIterator for FlatRow {
    type Item = (String, Value);
    type IntoIter = map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl<'a> IntoIterator for &'a FlatRow {
    type Item = (&'a String, &'a Value);
    type IntoIter = map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
