// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-aggregate mapping configuration.
//!
//! [`AggregateConfig`] collects the declarations the extractor cannot infer
//! from the member list: storage names, keys, identity and default-constrained
//! columns, ignored members and column overrides. Members are named by their
//! logical path (`Address_Street`); naming a value object applies the
//! declaration to every column below it.
//!
//! Two sources feed it:
//!
//! ```text
//! #[aggregate(...)] attributes ──► Mapped::configure ─┐
//!                                                     ├──► merged ──► extractor
//! Mapper::configure::<T>(|c| ...) ───────────────────┘
//!                                  (applied last, wins)
//! ```
//!
//! # Example
//!
//! ```rust
//! use aggregate_core::AggregateConfig;
//!
//! let mut config = AggregateConfig::default();
//! config
//!     .table("customers")
//!     .schema("sales")
//!     .identity("Id")
//!     .default_constraint("CreatedAt")
//!     .column("Address_Street", "street");
//!
//! assert_eq!(config.table_name(), Some("customers"));
//! assert_eq!(config.keys(), ["Id"]);
//! ```

/// Mapping declarations of one aggregate or value object type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateConfig {
    table:      Option<String>,
    view:       Option<String>,
    schema:     Option<String>,
    keys:       Vec<String>,
    identities: Vec<String>,
    defaults:   Vec<String>,
    ignored:    Vec<String>,
    columns:    Vec<(String, String)>
}

impl AggregateConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table written to and, without a view, read from.
    pub fn table(&mut self, name: impl Into<String>) -> &mut Self {
        self.table = Some(name.into());
        self
    }

    /// Set a view that selects read from instead of the table.
    pub fn view(&mut self, name: impl Into<String>) -> &mut Self {
        self.view = Some(name.into());
        self
    }

    /// Set the schema qualifying table and view.
    pub fn schema(&mut self, name: impl Into<String>) -> &mut Self {
        self.schema = Some(name.into());
        self
    }

    /// Declare a primary key member.
    pub fn key(&mut self, path: impl Into<String>) -> &mut Self {
        push_unique(&mut self.keys, path.into());
        self
    }

    /// Declare a store-generated identity member. Implies [`key`](Self::key).
    pub fn identity(&mut self, path: impl Into<String>) -> &mut Self {
        let path = path.into();
        push_unique(&mut self.keys, path.clone());
        push_unique(&mut self.identities, path);
        self
    }

    /// Declare a member whose column has a store default.
    ///
    /// The column is still selected but never written.
    pub fn default_constraint(&mut self, path: impl Into<String>) -> &mut Self {
        push_unique(&mut self.defaults, path.into());
        self
    }

    /// Exclude a member from the mapping.
    pub fn ignore(&mut self, path: impl Into<String>) -> &mut Self {
        push_unique(&mut self.ignored, path.into());
        self
    }

    /// Store a single-column member under a different column name.
    ///
    /// The last override for a path wins.
    pub fn column(&mut self, path: impl Into<String>, column: impl Into<String>) -> &mut Self {
        let path = path.into();
        self.columns.retain(|(existing, _)| *existing != path);
        self.columns.push((path, column.into()));
        self
    }

    /// Configured table name.
    #[must_use]
    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Configured view name.
    #[must_use]
    pub fn view_name(&self) -> Option<&str> {
        self.view.as_deref()
    }

    /// Configured schema name.
    #[must_use]
    pub fn schema_name(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Key paths, identities included.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Identity paths.
    #[must_use]
    pub fn identities(&self) -> &[String] {
        &self.identities
    }

    /// Default-constrained paths.
    #[must_use]
    pub fn default_constraints(&self) -> &[String] {
        &self.defaults
    }

    /// Ignored paths.
    #[must_use]
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Column overrides as `(path, column)` pairs.
    #[must_use]
    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }

    /// Column override for `path`.
    #[must_use]
    pub fn column_for(&self, path: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == path)
            .map(|(_, column)| column.as_str())
    }

    /// Apply `other` on top of `self`.
    ///
    /// Names set in `other` replace those in `self`; member declarations
    /// accumulate.
    pub fn merge(&mut self, other: Self) {
        if other.table.is_some() {
            self.table = other.table;
        }
        if other.view.is_some() {
            self.view = other.view;
        }
        if other.schema.is_some() {
            self.schema = other.schema;
        }
        for key in other.keys {
            push_unique(&mut self.keys, key);
        }
        for identity in other.identities {
            push_unique(&mut self.identities, identity);
        }
        for default in other.defaults {
            push_unique(&mut self.defaults, default);
        }
        for ignored in other.ignored {
            push_unique(&mut self.ignored, ignored);
        }
        for (path, column) in other.columns {
            self.column(path, column);
        }
    }

    /// Declarations of a value object re-rooted under `prefix`.
    ///
    /// Storage names are dropped, they only mean something on the aggregate
    /// root. Column overrides get the prefix too so two members of the same
    /// value object type never collide.
    #[must_use]
    pub fn prefixed(&self, prefix: &str) -> Self {
        let prefix_all = |paths: &[String]| -> Vec<String> {
            paths.iter().map(|path| format!("{prefix}{path}")).collect()
        };
        Self {
            table:      None,
            view:       None,
            schema:     None,
            keys:       prefix_all(&self.keys),
            identities: prefix_all(&self.identities),
            defaults:   prefix_all(&self.defaults),
            ignored:    prefix_all(&self.ignored),
            columns:    self
                .columns
                .iter()
                .map(|(path, column)| (format!("{prefix}{path}"), format!("{prefix}{column}")))
                .collect()
        }
    }

    /// Every member path the configuration refers to.
    pub(crate) fn declared_paths(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .chain(&self.identities)
            .chain(&self.defaults)
            .chain(&self.ignored)
            .chain(self.columns.iter().map(|(path, _)| path))
            .map(String::as_str)
    }
}

fn push_unique(paths: &mut Vec<String>, path: String) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}
