// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Insert-or-update statements.
//!
//! # Strategy Selection
//!
//! ```text
//! dialect.upsert_strategy()
//!   │
//!   ├── Merge ────────────────────────────► MERGE INTO ... USING (SELECT ...)
//!   │
//!   ├── OnConflict / OnDuplicateKey
//!   │     ├── every key insertable ───────► INSERT ... ON CONFLICT / ON DUPLICATE KEY
//!   │     └── store-assigned key ─────────► update, then insert if missing
//!   │
//!   └── UpdateThenInsert ─────────────────► update, then insert if missing
//! ```
//!
//! The native insert forms need the key in the insert list to detect the
//! conflict, so a store-assigned key falls back to update-then-insert.
//!
//! # Update, Then Insert
//!
//! ```text
//! PostgreSQL   WITH updated AS (UPDATE ... RETURNING 1)
//!              INSERT ... SELECT ... WHERE NOT EXISTS (SELECT 1 FROM updated)
//!
//! others       UPDATE ... WHERE keys
//!              then: INSERT ... SELECT ... WHERE NOT EXISTS (SELECT 1 FROM t WHERE keys)
//! ```
//!
//! Prepared statements accept one command, so outside PostgreSQL the result
//! is a batch of two commands (see [`SqlStatement::commands`]). Nothing
//! updatable leaves only the guarded insert.

use super::{Dialect, Operation, Parameters, QueryGenerator, SqlStatement, UpsertStrategy, join};
use crate::{
    error::{ConfigurationError, MappingError},
    metadata::PropertyDescriptor
};

impl QueryGenerator<'_> {
    /// Insert one aggregate, or update it when its key already exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoKeys`] when no key is declared and
    /// [`ConfigurationError::NothingToWrite`] when every column is
    /// store-assigned.
    pub fn upsert(&self) -> Result<SqlStatement, MappingError> {
        let keys = self.keys(Operation::Upsert)?;
        // updatable columns are a subset of insertable ones
        let insertable: Vec<_> = self.metadata.insertable().collect();
        if insertable.is_empty() {
            return Err(self.error(ConfigurationError::NothingToWrite {
                operation: Operation::Upsert
            }));
        }

        let strategy = self.upsert_strategy(&keys);
        let mut params = self.parameters();
        let text = match strategy {
            UpsertStrategy::OnConflict => self.on_conflict(&keys, &insertable, &mut params),
            UpsertStrategy::OnDuplicateKey => self.on_duplicate_key(&keys, &insertable, &mut params),
            UpsertStrategy::Merge => self.merge(&keys, &insertable, &mut params),
            UpsertStrategy::UpdateThenInsert => {
                return Ok(self.update_then_insert(&keys, &insertable));
            }
        };
        Ok(self.statement(text, params))
    }

    /// Strategy for this aggregate on this dialect.
    #[must_use]
    pub fn upsert_strategy(&self, keys: &[&PropertyDescriptor]) -> UpsertStrategy {
        let native = self.dialect().upsert_strategy();
        let key_in_insert = keys.iter().all(|key| key.is_insertable());
        match native {
            UpsertStrategy::OnConflict | UpsertStrategy::OnDuplicateKey if !key_in_insert => {
                UpsertStrategy::UpdateThenInsert
            }
            other => other
        }
    }

    /// `INSERT INTO t (cols) VALUES (ps)`.
    fn insert_values(&self, insertable: &[&PropertyDescriptor], params: &mut Parameters) -> String {
        let names = join(insertable.iter().map(|p| self.quote(p.column())));
        let values = join(insertable.iter().map(|p| params.placeholder(p.name())));
        format!("INSERT INTO {} ({names}) VALUES ({values})", self.table())
    }

    fn on_conflict(
        &self,
        keys: &[&PropertyDescriptor],
        insertable: &[&PropertyDescriptor],
        params: &mut Parameters
    ) -> String {
        let insert = self.insert_values(insertable, params);
        let target = join(keys.iter().map(|key| self.quote(key.column())));
        let updates = join(self.metadata.updatable().map(|p| {
            let column = self.quote(p.column());
            format!("{column} = EXCLUDED.{column}")
        }));
        if updates.is_empty() {
            format!("{insert} ON CONFLICT ({target}) DO NOTHING")
        } else {
            format!("{insert} ON CONFLICT ({target}) DO UPDATE SET {updates}")
        }
    }

    fn on_duplicate_key(
        &self,
        keys: &[&PropertyDescriptor],
        insertable: &[&PropertyDescriptor],
        params: &mut Parameters
    ) -> String {
        let insert = self.insert_values(insertable, params);
        let updates = join(self.metadata.updatable().map(|p| {
            let column = self.quote(p.column());
            format!("{column} = VALUES({column})")
        }));
        if updates.is_empty() {
            // no-op assignment keeps the duplicate silent
            let key = keys.first().map(|key| self.quote(key.column())).unwrap_or_default();
            format!("{insert} ON DUPLICATE KEY UPDATE {key} = {key}")
        } else {
            format!("{insert} ON DUPLICATE KEY UPDATE {updates}")
        }
    }

    fn merge(
        &self,
        keys: &[&PropertyDescriptor],
        insertable: &[&PropertyDescriptor],
        params: &mut Parameters
    ) -> String {
        let target = self.quote("target");
        let source = self.quote("source");
        let qualified = |alias: &str, property: &PropertyDescriptor| {
            format!("{alias}.{}", self.quote(property.column()))
        };

        let sourced = self
            .metadata
            .properties()
            .iter()
            .filter(|p| p.is_primary_key() || p.is_insertable());
        let projection = join(sourced.map(|p| {
            let placeholder = params.placeholder(p.name());
            format!("{placeholder} AS {}", self.quote(p.column()))
        }));
        let on = keys
            .iter()
            .map(|&key| format!("{} = {}", qualified(&target, key), qualified(&source, key)))
            .collect::<Vec<_>>()
            .join(" AND ");

        let mut text = format!(
            "MERGE INTO {} AS {target} USING (SELECT {projection}) AS {source} ON {on}",
            self.table()
        );
        let updates = join(
            self.metadata
                .updatable()
                .map(|p| format!("{} = {}", qualified(&target, p), qualified(&source, p)))
        );
        if !updates.is_empty() {
            text.push_str(&format!(" WHEN MATCHED THEN UPDATE SET {updates}"));
        }
        let names = join(insertable.iter().map(|p| self.quote(p.column())));
        let values = join(insertable.iter().map(|&p| qualified(&source, p)));
        text.push_str(&format!(
            " WHEN NOT MATCHED THEN INSERT ({names}) VALUES ({values});"
        ));
        text
    }

    /// Update by key, then insert when the key was not found.
    fn update_then_insert(
        &self,
        keys: &[&PropertyDescriptor],
        insertable: &[&PropertyDescriptor]
    ) -> SqlStatement {
        let table = self.table();

        if self.metadata.updatable().next().is_none() {
            let mut params = self.parameters();
            let text = self.insert_missing(keys, insertable, &mut params);
            return self.statement(text, params);
        }

        let mut params = self.parameters();
        let assignments = self.assignments(&mut params);
        let predicate = self.key_predicate(keys, &mut params);
        if self.dialect() == Dialect::Postgres {
            let names = join(insertable.iter().map(|p| self.quote(p.column())));
            let values = join(insertable.iter().map(|p| params.placeholder(p.name())));
            let text = format!(
                "WITH updated AS (UPDATE {table} SET {assignments} WHERE {predicate} RETURNING 1) \
                 INSERT INTO {table} ({names}) SELECT {values} WHERE NOT EXISTS (SELECT 1 FROM \
                 updated)"
            );
            return self.statement(text, params);
        }

        let update = self.statement(
            format!("UPDATE {table} SET {assignments} WHERE {predicate}"),
            params
        );
        let mut params = self.parameters();
        let insert = self.insert_missing(keys, insertable, &mut params);
        update.followed_by(self.statement(insert, params))
    }

    /// `INSERT ... SELECT ... WHERE NOT EXISTS (SELECT 1 FROM t WHERE keys)`.
    fn insert_missing(
        &self,
        keys: &[&PropertyDescriptor],
        insertable: &[&PropertyDescriptor],
        params: &mut Parameters
    ) -> String {
        let table = self.table();
        let names = join(insertable.iter().map(|p| self.quote(p.column())));
        let values = join(insertable.iter().map(|p| params.placeholder(p.name())));
        let predicate = self.key_predicate(keys, params);
        // MySQL wants a table reference before WHERE
        let from = match self.dialect() {
            Dialect::MySql => " FROM DUAL",
            _ => ""
        };
        format!(
            "INSERT INTO {table} ({names}) SELECT {values}{from} WHERE NOT EXISTS (SELECT 1 FROM \
             {table} WHERE {predicate})"
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Dialect, DialectOptions, QueryGenerator, UpsertStrategy,
        error::ConfigurationError,
        fixtures::{Customer, Order, metadata}
    };

    #[test]
    fn on_conflict_updates_non_keys() {
        let customers = metadata::<Customer>(|_| {});
        let options = DialectOptions::new(Dialect::Postgres);
        let statement = QueryGenerator::new(&customers, &options)
            .upsert()
            .expect("keyed");
        assert_eq!(
            statement.text(),
            r#"INSERT INTO "Customers" ("Id", "Name", "Address_Street", "Address_City") VALUES ($1, $2, $3, $4) ON CONFLICT ("Id") DO UPDATE SET "Name" = EXCLUDED."Name", "Address_Street" = EXCLUDED."Address_Street", "Address_City" = EXCLUDED."Address_City""#
        );
        assert_eq!(
            statement.parameters(),
            ["Id", "Name", "Address_Street", "Address_City"]
        );
    }

    #[test]
    fn on_conflict_without_updates_does_nothing() {
        let keyed = metadata::<Customer>(|c| {
            c.key("Name").key("Address");
        });
        let options = DialectOptions::new(Dialect::Sqlite);
        let statement = QueryGenerator::new(&keyed, &options)
            .upsert()
            .expect("keyed");
        assert!(statement.text().ends_with(
            r#"ON CONFLICT ("Id", "Name", "Address_Street", "Address_City") DO NOTHING"#
        ));
        assert!(statement.text().contains("VALUES (?1, ?2, ?3, ?4)"));
    }

    #[test]
    fn on_duplicate_key_for_mysql() {
        let customers = metadata::<Customer>(|c| {
            c.ignore("Address");
        });
        let options = DialectOptions::new(Dialect::MySql);
        let statement = QueryGenerator::new(&customers, &options)
            .upsert()
            .expect("keyed");
        assert_eq!(
            statement.text(),
            "INSERT INTO `Customers` (`Id`, `Name`) VALUES (?, ?) ON DUPLICATE KEY UPDATE `Name` = \
             VALUES(`Name`)"
        );
    }

    #[test]
    fn merge_for_sqlserver() {
        let customers = metadata::<Customer>(|c| {
            c.ignore("Address");
        });
        let options = DialectOptions::new(Dialect::SqlServer);
        let statement = QueryGenerator::new(&customers, &options)
            .upsert()
            .expect("keyed");
        assert_eq!(
            statement.text(),
            "MERGE INTO [Customers] AS [target] USING (SELECT @Id AS [Id], @Name AS [Name]) AS \
             [source] ON [target].[Id] = [source].[Id] WHEN MATCHED THEN UPDATE SET \
             [target].[Name] = [source].[Name] WHEN NOT MATCHED THEN INSERT ([Id], [Name]) VALUES \
             ([source].[Id], [source].[Name]);"
        );
        assert_eq!(statement.parameters(), ["Id", "Name"]);
    }

    #[test]
    fn identity_key_falls_back_to_update_then_insert() {
        let orders = metadata::<Order>(|_| {});
        let options = DialectOptions::new(Dialect::Postgres);
        let generator = QueryGenerator::new(&orders, &options);
        let keys: Vec<_> = orders.keys().collect();
        assert_eq!(
            generator.upsert_strategy(&keys),
            UpsertStrategy::UpdateThenInsert
        );

        let statement = generator.upsert().expect("keyed");
        assert!(!statement.is_batch());
        assert_eq!(
            statement.text(),
            r#"WITH updated AS (UPDATE "Orders" SET "Total" = $1, "Note" = $2 WHERE "Id" = $3 RETURNING 1) INSERT INTO "Orders" ("Total", "Note") SELECT $1, $2 WHERE NOT EXISTS (SELECT 1 FROM updated)"#
        );
        assert_eq!(statement.parameters(), ["Total", "Note", "Id"]);
    }

    #[test]
    fn identity_key_on_mysql_is_two_commands() {
        let orders = metadata::<Order>(|_| {});
        let options = DialectOptions::new(Dialect::MySql);
        let statement = QueryGenerator::new(&orders, &options)
            .upsert()
            .expect("keyed");
        let commands: Vec<_> = statement.commands().collect();
        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands[0].text(),
            "UPDATE `Orders` SET `Total` = ?, `Note` = ? WHERE `Id` = ?"
        );
        assert_eq!(commands[0].parameters(), ["Total", "Note", "Id"]);
        assert_eq!(
            commands[1].text(),
            "INSERT INTO `Orders` (`Total`, `Note`) SELECT ?, ? FROM DUAL WHERE NOT EXISTS (SELECT \
             1 FROM `Orders` WHERE `Id` = ?)"
        );
        assert_eq!(commands[1].parameters(), ["Total", "Note", "Id"]);
    }

    #[test]
    fn nothing_updatable_leaves_the_guarded_insert() {
        let orders = metadata::<Order>(|c| {
            c.key("Total").key("Note");
        });
        let options = DialectOptions::new(Dialect::Sqlite);
        let statement = QueryGenerator::new(&orders, &options)
            .upsert()
            .expect("keyed");
        assert!(!statement.is_batch());
        assert_eq!(
            statement.text(),
            r#"INSERT INTO "Orders" ("Total", "Note") SELECT ?1, ?2 WHERE NOT EXISTS (SELECT 1 FROM "Orders" WHERE "Id" = ?3 AND "Total" = ?1 AND "Note" = ?2)"#
        );
    }

    #[test]
    fn generic_dialect_positional_repeats_parameters() {
        let customers = metadata::<Customer>(|c| {
            c.ignore("Address");
        });
        let options = DialectOptions::new(Dialect::Generic)
            .with_parameter_style(crate::ParameterStyle::Positional);
        let statement = QueryGenerator::new(&customers, &options)
            .upsert()
            .expect("keyed");
        assert_eq!(
            statement.text(),
            r#"UPDATE "Customers" SET "Name" = ? WHERE "Id" = ?"#
        );
        assert_eq!(statement.parameters(), ["Name", "Id"]);

        let insert = statement.following().expect("insert follows");
        assert_eq!(
            insert.text(),
            r#"INSERT INTO "Customers" ("Id", "Name") SELECT ?, ? WHERE NOT EXISTS (SELECT 1 FROM "Customers" WHERE "Id" = ?)"#
        );
        assert_eq!(insert.parameters(), ["Id", "Name", "Id"]);
    }

    #[test]
    fn upsert_requires_keys() {
        let orders = metadata::<crate::fixtures::Address>(|_| {});
        let options = DialectOptions::default();
        let err = QueryGenerator::new(&orders, &options)
            .upsert()
            .expect_err("no keys");
        assert_eq!(
            err.as_configuration(),
            Some(&ConfigurationError::NoKeys {
                operation: crate::Operation::Upsert
            })
        );
    }
}
