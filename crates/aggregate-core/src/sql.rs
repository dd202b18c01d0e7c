// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Dialect-specific SQL generation from aggregate metadata.
//!
//! [`QueryGenerator`] turns an [`AggregateMetadata`] into statement text. It
//! never inspects values: placeholders name logical columns, and
//! [`SqlStatement::bind`] later pulls the matching values out of a flattened
//! row.
//!
//! # Module Structure
//!
//! ```text
//! sql/
//! ├── dialect.rs   — Dialect, ParameterStyle, DialectOptions
//! ├── statement.rs — SqlStatement and placeholder numbering
//! ├── crud.rs      — column list, SELECT, INSERT, UPDATE, DELETE
//! └── upsert.rs    — native and fallback upserts
//! ```
//!
//! # Column Roles
//!
//! | Statement | Columns written | Predicate |
//! |-----------|-----------------|-----------|
//! | `SELECT` | all, renamed ones aliased | keys |
//! | `INSERT` | not identity, not default-constrained | none |
//! | `UPDATE` | insertable and not a key | keys |
//! | `DELETE` | none | keys |
//! | `UPSERT` | insertable on insert, updatable on update | keys |
//!
//! # Example
//!
//! ```rust,ignore
//! let metadata = mapper.metadata::<Order>()?;
//! let options = DialectOptions::new(Dialect::Postgres);
//! let update = QueryGenerator::new(&metadata, &options).update()?;
//!
//! assert_eq!(
//!     update.text(),
//!     r#"UPDATE "Orders" SET "Total" = $1, "Note" = $2 WHERE "Id" = $3"#
//! );
//! ```

mod crud;
mod dialect;
mod statement;
mod upsert;

use std::fmt;

pub use dialect::{Dialect, DialectOptions, ParameterStyle, Returning, UpsertStrategy};
pub use statement::SqlStatement;
use statement::Parameters;

use crate::{
    error::{ConfigurationError, MappingError},
    metadata::{AggregateMetadata, PropertyDescriptor}
};

/// Statement kinds the generator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Comma-separated select list.
    ColumnList,
    /// Select one aggregate by key.
    Select,
    /// Select every aggregate.
    SelectAll,
    /// Insert one aggregate.
    Insert,
    /// Update one aggregate by key.
    Update,
    /// Delete one aggregate by key.
    Delete,
    /// Insert, or update when the key exists.
    Upsert
}

impl Operation {
    /// Every operation in generation order.
    pub const ALL: [Self; 7] = [
        Self::ColumnList,
        Self::Select,
        Self::SelectAll,
        Self::Insert,
        Self::Update,
        Self::Delete,
        Self::Upsert
    ];

    /// Check if the operation filters on keys.
    #[must_use]
    pub const fn is_keyed(&self) -> bool {
        matches!(self, Self::Select | Self::Update | Self::Delete | Self::Upsert)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ColumnList => "COLUMN LIST",
            Self::Select => "SELECT",
            Self::SelectAll => "SELECT ALL",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Upsert => "UPSERT"
        })
    }
}

/// SQL text builder for one aggregate and one dialect.
#[derive(Debug, Clone, Copy)]
pub struct QueryGenerator<'a> {
    metadata: &'a AggregateMetadata,
    options:  &'a DialectOptions
}

impl<'a> QueryGenerator<'a> {
    /// Generator over `metadata` with `options`.
    #[must_use]
    pub const fn new(metadata: &'a AggregateMetadata, options: &'a DialectOptions) -> Self {
        Self {
            metadata,
            options
        }
    }

    /// Statement for `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Configuration`] when the aggregate cannot
    /// support the statement: a keyed operation without keys, or a write
    /// with no columns to write.
    pub fn generate(&self, operation: Operation) -> Result<SqlStatement, MappingError> {
        match operation {
            Operation::ColumnList => Ok(self.column_list()),
            Operation::Select => self.select(),
            Operation::SelectAll => Ok(self.select_all()),
            Operation::Insert => Ok(self.insert()),
            Operation::Update => self.update(),
            Operation::Delete => self.delete(),
            Operation::Upsert => self.upsert()
        }
    }

    /// Target dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.options.dialect
    }

    fn quote(&self, ident: &str) -> String {
        self.dialect().quote(ident)
    }

    /// Metadata schema first, then the options schema.
    fn schema(&self) -> Option<&str> {
        self.metadata.schema().or(self.options.schema.as_deref())
    }

    fn qualified(&self, name: &str) -> String {
        match self.schema() {
            Some(schema) => format!("{}.{}", self.quote(schema), self.quote(name)),
            None => self.quote(name)
        }
    }

    /// Table writes target.
    fn table(&self) -> String {
        self.qualified(self.metadata.entity_name())
    }

    /// Relation selects read from.
    fn read_source(&self) -> String {
        self.qualified(self.metadata.read_source())
    }

    fn parameters(&self) -> Parameters {
        Parameters::new(self.options.parameter_style())
    }

    /// Quoted column, aliased back to its logical name when renamed.
    fn selected(&self, property: &PropertyDescriptor) -> String {
        let column = self.quote(property.column());
        if property.is_renamed() {
            format!("{column} AS {}", self.quote(property.name()))
        } else {
            column
        }
    }

    fn select_list(&self) -> String {
        join(self.metadata.properties().iter().map(|p| self.selected(p)))
    }

    /// `"k1" = $1 AND "k2" = $2`.
    fn key_predicate(&self, keys: &[&PropertyDescriptor], params: &mut Parameters) -> String {
        keys.iter()
            .map(|key| {
                let placeholder = params.placeholder(key.name());
                format!("{} = {placeholder}", self.quote(key.column()))
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn keys(&self, operation: Operation) -> Result<Vec<&'a PropertyDescriptor>, MappingError> {
        let keys: Vec<_> = self.metadata.keys().collect();
        if keys.is_empty() {
            return Err(self.error(ConfigurationError::NoKeys {
                operation
            }));
        }
        Ok(keys)
    }

    fn error(&self, source: ConfigurationError) -> MappingError {
        MappingError::configuration(self.metadata.aggregate_type().name(), source)
    }

    fn statement(&self, text: String, params: Parameters) -> SqlStatement {
        SqlStatement::new(
            text,
            params.into_names(),
            self.metadata.aggregate_type().name()
        )
    }
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(", ")
}
