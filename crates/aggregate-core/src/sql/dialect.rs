// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! SQL dialects and generation options.
//!
//! # Dialect Conventions
//!
//! | Dialect | Quoting | Parameters | Returning | Upsert |
//! |---------|---------|------------|-----------|--------|
//! | `Postgres` | `"name"` | `$1` | `RETURNING` | `ON CONFLICT` |
//! | `Sqlite` | `"name"` | `?1` | `RETURNING` | `ON CONFLICT` |
//! | `SqlServer` | `[name]` | `@Name` | `OUTPUT INSERTED.` | `MERGE` |
//! | `MySql` | `` `name` `` | `?` | none | `ON DUPLICATE KEY` |
//! | `Generic` | `"name"` | `:Name` | none | update, then insert if missing |
//!
//! Options are deserializable so an outer configuration layer can load them:
//!
//! ```rust
//! use aggregate_core::{Dialect, DialectOptions, ParameterStyle};
//!
//! let options: DialectOptions = serde_json::from_str(
//!     r#"{ "dialect": "mssql", "schema": "sales" }"#
//! ).expect("valid options");
//!
//! assert_eq!(options.dialect, Dialect::SqlServer);
//! assert_eq!(options.parameter_style(), ParameterStyle::Named { prefix: '@' });
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// SQL text conventions of a backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// PostgreSQL.
    #[default]
    #[serde(alias = "postgresql")]
    Postgres,
    /// Microsoft SQL Server.
    #[serde(rename = "sqlserver", alias = "mssql")]
    SqlServer,
    /// MySQL and MariaDB.
    #[serde(rename = "mysql", alias = "mariadb")]
    MySql,
    /// SQLite.
    Sqlite,
    /// ANSI SQL without vendor extensions.
    Generic
}

/// How values generated by the store are handed back on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returning {
    /// Trailing `RETURNING ...` clause.
    Clause,
    /// `OUTPUT INSERTED....` before `VALUES`.
    Output,
    /// Not supported.
    Unsupported
}

/// Statement shape used for upserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStrategy {
    /// `INSERT ... ON CONFLICT (keys) DO UPDATE SET ...`.
    OnConflict,
    /// `INSERT ... ON DUPLICATE KEY UPDATE ...`.
    OnDuplicateKey,
    /// `MERGE INTO ... USING ...`.
    Merge,
    /// Update by key, then `INSERT ... WHERE NOT EXISTS (...)`.
    ///
    /// PostgreSQL runs both in one statement through a data-modifying `WITH`;
    /// other dialects get two commands.
    UpdateThenInsert
}

impl Dialect {
    /// Lowercase dialect name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::SqlServer => "sqlserver",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
            Self::Generic => "generic"
        }
    }

    /// Opening and closing identifier quote.
    #[must_use]
    pub const fn quote_chars(&self) -> (char, char) {
        match self {
            Self::SqlServer => ('[', ']'),
            Self::MySql => ('`', '`'),
            Self::Postgres | Self::Sqlite | Self::Generic => ('"', '"')
        }
    }

    /// Quote an identifier, doubling embedded closing quotes.
    ///
    /// ```rust
    /// use aggregate_core::Dialect;
    ///
    /// assert_eq!(Dialect::Postgres.quote("Order"), "\"Order\"");
    /// assert_eq!(Dialect::SqlServer.quote("a]b"), "[a]]b]");
    /// ```
    #[must_use]
    pub fn quote(&self, ident: &str) -> String {
        let (open, close) = self.quote_chars();
        let mut quoted = String::with_capacity(ident.len() + 2);
        quoted.push(open);
        for ch in ident.chars() {
            if ch == close {
                quoted.push(close);
            }
            quoted.push(ch);
        }
        quoted.push(close);
        quoted
    }

    /// Placeholder convention used when options do not set one.
    #[must_use]
    pub const fn default_parameter_style(&self) -> ParameterStyle {
        match self {
            Self::Postgres => ParameterStyle::Numbered {
                prefix: '$'
            },
            Self::Sqlite => ParameterStyle::Numbered {
                prefix: '?'
            },
            Self::SqlServer => ParameterStyle::Named {
                prefix: '@'
            },
            Self::MySql => ParameterStyle::Positional,
            Self::Generic => ParameterStyle::Named {
                prefix: ':'
            }
        }
    }

    /// Insert returning support.
    #[must_use]
    pub const fn returning(&self) -> Returning {
        match self {
            Self::Postgres | Self::Sqlite => Returning::Clause,
            Self::SqlServer => Returning::Output,
            Self::MySql | Self::Generic => Returning::Unsupported
        }
    }

    /// Native upsert construct.
    #[must_use]
    pub const fn upsert_strategy(&self) -> UpsertStrategy {
        match self {
            Self::Postgres | Self::Sqlite => UpsertStrategy::OnConflict,
            Self::MySql => UpsertStrategy::OnDuplicateKey,
            Self::SqlServer => UpsertStrategy::Merge,
            Self::Generic => UpsertStrategy::UpdateThenInsert
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Placeholder convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "style")]
pub enum ParameterStyle {
    /// `<prefix><LogicalName>`, one placeholder per distinct name.
    Named {
        /// Leading character, e.g. `@` or `:`.
        prefix: char
    },
    /// `<prefix><n>`, numbered from 1 by first use.
    Numbered {
        /// Leading character, e.g. `$` or `?`.
        prefix: char
    },
    /// `?` for every occurrence.
    Positional
}

/// Options of one SQL generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectOptions {
    /// Target dialect.
    pub dialect:         Dialect,
    /// Schema used when the aggregate metadata names none.
    pub schema:          Option<String>,
    /// Placeholder convention, the dialect's default when unset.
    pub parameter_style: Option<ParameterStyle>
}

impl DialectOptions {
    /// Options for `dialect` with its default conventions.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            schema: None,
            parameter_style: None
        }
    }

    /// Set the fallback schema.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Override the placeholder convention.
    #[must_use]
    pub const fn with_parameter_style(mut self, style: ParameterStyle) -> Self {
        self.parameter_style = Some(style);
        self
    }

    /// Effective placeholder convention.
    #[must_use]
    pub const fn parameter_style(&self) -> ParameterStyle {
        match self.parameter_style {
            Some(style) => style,
            None => self.dialect.default_parameter_style()
        }
    }
}

impl From<Dialect> for DialectOptions {
    fn from(dialect: Dialect) -> Self {
        Self::new(dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_per_dialect() {
        assert_eq!(Dialect::Postgres.quote("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(Dialect::MySql.quote("a`b"), "`a``b`");
        assert_eq!(Dialect::SqlServer.quote("Id"), "[Id]");
        assert_eq!(Dialect::Generic.quote("Id"), "\"Id\"");
    }

    #[test]
    fn default_styles() {
        assert_eq!(
            DialectOptions::new(Dialect::Postgres).parameter_style(),
            ParameterStyle::Numbered {
                prefix: '$'
            }
        );
        assert_eq!(
            DialectOptions::new(Dialect::MySql).parameter_style(),
            ParameterStyle::Positional
        );
        let overridden = DialectOptions::new(Dialect::Postgres).with_parameter_style(
            ParameterStyle::Named {
                prefix: ':'
            }
        );
        assert_eq!(
            overridden.parameter_style(),
            ParameterStyle::Named {
                prefix: ':'
            }
        );
    }

    #[test]
    fn strategies() {
        assert_eq!(Dialect::Sqlite.upsert_strategy(), UpsertStrategy::OnConflict);
        assert_eq!(Dialect::SqlServer.upsert_strategy(), UpsertStrategy::Merge);
        assert_eq!(Dialect::Generic.returning(), Returning::Unsupported);
    }

    #[test]
    fn options_deserialize() {
        let options: DialectOptions = serde_json::from_str(
            r#"{ "dialect": "mysql", "parameter_style": { "style": "named", "prefix": ":" } }"#
        )
        .expect("valid options");
        assert_eq!(options.dialect, Dialect::MySql);
        assert_eq!(options.schema, None);
        assert_eq!(
            options.parameter_style(),
            ParameterStyle::Named {
                prefix: ':'
            }
        );

        let defaults: DialectOptions = serde_json::from_str("{}").expect("empty options");
        assert_eq!(defaults, DialectOptions::default());
        assert_eq!(defaults.dialect, Dialect::Postgres);
    }
}
