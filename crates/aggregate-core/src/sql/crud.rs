// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Column list, SELECT, INSERT, UPDATE and DELETE.
//!
//! # Generated SQL (PostgreSQL)
//!
//! ```text
//! column_list  "Id", "Name", "Address_Street", "Address_City"
//! select       SELECT <columns> FROM "Customers" WHERE "Id" = $1
//! select_all   SELECT <columns> FROM "Customers"
//! insert       INSERT INTO "Orders" ("Total", "Note") VALUES ($1, $2) RETURNING "Id", "CreatedAt"
//! update       UPDATE "Orders" SET "Total" = $1, "Note" = $2 WHERE "Id" = $3
//! delete       DELETE FROM "Orders" WHERE "Id" = $1
//! ```

use super::{Dialect, Operation, QueryGenerator, Returning, SqlStatement, join};
use crate::error::{ConfigurationError, MappingError};

impl QueryGenerator<'_> {
    /// Select list in descriptor order.
    #[must_use]
    pub fn column_list(&self) -> SqlStatement {
        self.statement(self.select_list(), self.parameters())
    }

    /// Select one aggregate by key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoKeys`] when no key is declared.
    pub fn select(&self) -> Result<SqlStatement, MappingError> {
        let keys = self.keys(Operation::Select)?;
        let mut params = self.parameters();
        let predicate = self.key_predicate(&keys, &mut params);
        let text = format!(
            "SELECT {} FROM {} WHERE {predicate}",
            self.select_list(),
            self.read_source()
        );
        Ok(self.statement(text, params))
    }

    /// Select every aggregate.
    #[must_use]
    pub fn select_all(&self) -> SqlStatement {
        let text = format!("SELECT {} FROM {}", self.select_list(), self.read_source());
        self.statement(text, self.parameters())
    }

    /// Insert one aggregate.
    ///
    /// Identity and default-constrained columns are left to the store and
    /// handed back where the dialect supports it.
    #[must_use]
    pub fn insert(&self) -> SqlStatement {
        let mut params = self.parameters();
        let columns: Vec<_> = self.metadata.insertable().collect();
        let output = self.output_clause();
        let returning = self.returning_clause();

        let mut text = format!("INSERT INTO {}", self.table());
        if columns.is_empty() {
            if let Some(output) = output {
                text.push(' ');
                text.push_str(&output);
            }
            text.push_str(match self.dialect() {
                Dialect::MySql => " () VALUES ()",
                _ => " DEFAULT VALUES"
            });
        } else {
            let names = join(columns.iter().map(|p| self.quote(p.column())));
            let values = join(columns.iter().map(|p| params.placeholder(p.name())));
            text.push_str(&format!(" ({names})"));
            if let Some(output) = output {
                text.push(' ');
                text.push_str(&output);
            }
            text.push_str(&format!(" VALUES ({values})"));
        }
        if let Some(returning) = returning {
            text.push(' ');
            text.push_str(&returning);
        }
        self.statement(text, params)
    }

    /// Update one aggregate by key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoKeys`] when no key is declared and
    /// [`ConfigurationError::NothingToWrite`] when every column is a key or
    /// store-assigned.
    pub fn update(&self) -> Result<SqlStatement, MappingError> {
        let keys = self.keys(Operation::Update)?;
        let mut params = self.parameters();
        let assignments = self.assignments(&mut params);
        if assignments.is_empty() {
            return Err(self.error(ConfigurationError::NothingToWrite {
                operation: Operation::Update
            }));
        }
        let predicate = self.key_predicate(&keys, &mut params);
        let text = format!(
            "UPDATE {} SET {assignments} WHERE {predicate}",
            self.table()
        );
        Ok(self.statement(text, params))
    }

    /// Delete one aggregate by key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoKeys`] when no key is declared.
    pub fn delete(&self) -> Result<SqlStatement, MappingError> {
        let keys = self.keys(Operation::Delete)?;
        let mut params = self.parameters();
        let predicate = self.key_predicate(&keys, &mut params);
        let text = format!("DELETE FROM {} WHERE {predicate}", self.table());
        Ok(self.statement(text, params))
    }

    /// `"a" = $1, "b" = $2` over the updatable columns, empty when none.
    pub(super) fn assignments(&self, params: &mut super::Parameters) -> String {
        join(self.metadata.updatable().map(|p| {
            let placeholder = params.placeholder(p.name());
            format!("{} = {placeholder}", self.quote(p.column()))
        }))
    }

    /// Trailing `RETURNING` of store-assigned columns.
    fn returning_clause(&self) -> Option<String> {
        if self.dialect().returning() != Returning::Clause {
            return None;
        }
        let generated: Vec<_> = self.metadata.generated().collect();
        if generated.is_empty() {
            return None;
        }
        Some(format!(
            "RETURNING {}",
            join(generated.into_iter().map(|p| self.selected(p)))
        ))
    }

    /// `OUTPUT INSERTED.` of store-assigned columns, placed before `VALUES`.
    fn output_clause(&self) -> Option<String> {
        if self.dialect().returning() != Returning::Output {
            return None;
        }
        let generated: Vec<_> = self.metadata.generated().collect();
        if generated.is_empty() {
            return None;
        }
        Some(format!(
            "OUTPUT {}",
            join(generated.into_iter().map(|p| format!("INSERTED.{}", self.selected(p))))
        ))
    }
}
