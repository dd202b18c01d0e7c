// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! The mapping service.
//!
//! [`Mapper`] owns everything mapping needs at runtime: registered type
//! converters, fluent per-type configuration and the metadata cache. One
//! instance is usually created at start-up and shared by reference.
//!
//! # Lifecycle
//!
//! ```text
//! start-up:   register_converter() / configure()   ── clears the cache
//!                       │
//! runtime:    metadata::<T>() ── cache hit ──────────► Arc<AggregateMetadata>
//!                       │
//!                       └────── miss ── extract ─────► cached, shared
//! ```
//!
//! Configuration and converters may still change after start-up; each change
//! drops every cached entry so later calls observe it. Configuring a nested
//! value object changes the metadata of every aggregate embedding it, so the
//! whole cache goes rather than one entry.
//!
//! # Example
//!
//! ```rust,ignore
//! let mapper = Mapper::new();
//! mapper
//!     .register_converter::<OrderId, i64>(|id| id.0, OrderId)
//!     .configure::<Order>(|c| {
//!         c.schema("sales");
//!     });
//!
//! let row = mapper.to_row(&order)?;
//! let back: Order = mapper.unflatten(row)?;
//! ```

use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    sync::Arc
};

use parking_lot::RwLock;
use tracing::debug;

use crate::{
    cache::MetadataCache,
    config::AggregateConfig,
    converter::{ConverterRegistry, Converters},
    error::MappingError,
    extract::extract,
    flatten::{self, Flatten, Flattened},
    mapped::Mapped,
    metadata::AggregateMetadata,
    row::FlatRow,
    scalar::Scalar,
    sql::{DialectOptions, Operation, QueryGenerator, SqlStatement}
};

/// Converters, configuration and cached metadata.
#[derive(Debug, Default)]
pub struct Mapper {
    converters: ConverterRegistry,
    configs:    RwLock<HashMap<TypeId, AggregateConfig>>,
    cache:      MetadataCache
}

impl Mapper {
    /// Create a mapper with no converters and no fluent configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add fluent configuration for `T`.
    ///
    /// Declarations are merged over `T`'s own [`Mapped::configure`] and over
    /// earlier calls; later declarations win.
    pub fn configure<T: Mapped>(&self, configure: impl FnOnce(&mut AggregateConfig)) -> &Self {
        let mut config = AggregateConfig::default();
        configure(&mut config);
        {
            let mut configs = self.configs.write();
            configs.entry(TypeId::of::<T>()).or_default().merge(config);
        }
        debug!(aggregate = type_name::<T>(), "aggregate configured");
        self.cache.clear();
        self
    }

    /// Register the converter for `D`, replacing any previous one.
    pub fn register_converter<D: Send + 'static, P: Scalar>(
        &self,
        encode: impl Fn(&D) -> P + Send + Sync + 'static,
        decode: impl Fn(P) -> D + Send + Sync + 'static
    ) -> &Self {
        self.converters.register::<D, P>(encode, decode);
        self.cache.clear();
        self
    }

    /// Metadata of `T`, extracted on first use and cached.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Configuration`] when `T` cannot be mapped.
    /// Failures are not cached.
    pub fn metadata<T: Mapped>(&self) -> Result<Arc<AggregateMetadata>, MappingError> {
        self.cache.get_or_try_create_for::<T, _>(|| {
            let configs = self.configs.read();
            extract::<T>(&self.converters, &configs)
        })
    }

    /// Flatten a value: aggregates become rows, simple values pass through.
    ///
    /// # Errors
    ///
    /// Returns the configuration error of an aggregate's metadata.
    pub fn flatten<V: Flatten + ?Sized>(&self, value: &V) -> Result<Flattened, MappingError> {
        value.flatten(self)
    }

    /// Flatten an aggregate into a row.
    ///
    /// # Errors
    ///
    /// Returns the configuration error of `T`'s metadata.
    pub fn to_row<T: Mapped>(&self, aggregate: &T) -> Result<FlatRow, MappingError> {
        let metadata = self.metadata::<T>()?;
        flatten::flatten(&metadata, aggregate)
    }

    /// Rebuild an aggregate from a row.
    ///
    /// # Errors
    ///
    /// - [`MappingError::Configuration`] when `T` cannot be mapped
    /// - [`MappingError::ValueMissing`] when a column is absent
    /// - [`MappingError::TypeMismatch`] when a value does not fit its member
    pub fn unflatten<T: Mapped>(&self, row: FlatRow) -> Result<T, MappingError> {
        let metadata = self.metadata::<T>()?;
        flatten::unflatten(&metadata, row)
    }

    /// SQL for `operation` on `T`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Configuration`] when `T` cannot be mapped or
    /// cannot support the statement.
    pub fn generate<T: Mapped>(
        &self,
        operation: Operation,
        options: &DialectOptions
    ) -> Result<SqlStatement, MappingError> {
        let metadata = self.metadata::<T>()?;
        QueryGenerator::new(&metadata, options).generate(operation)
    }

    /// Registered converters, read-only.
    ///
    /// Use [`register_converter`](Self::register_converter) to change them.
    #[must_use]
    pub const fn converters(&self) -> Converters<'_> {
        Converters::new(&self.converters)
    }

    /// Metadata cache.
    #[must_use]
    pub const fn cache(&self) -> &MetadataCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        Dialect, Value,
        fixtures::{Customer, Order, OrderId}
    };

    #[test]
    fn metadata_is_cached() {
        let mapper = Mapper::new();
        let first = mapper.metadata::<Customer>().expect("mapped");
        let second = mapper.metadata::<Customer>().expect("mapped");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(mapper.cache().len(), 1);
    }

    #[test]
    fn missing_converter_is_not_cached() {
        let mapper = Mapper::new();
        let err = mapper.metadata::<Order>().expect_err("no converter");
        assert!(err.is_configuration());
        assert!(mapper.cache().is_empty());

        mapper.register_converter::<OrderId, i64>(|id| id.0, OrderId);
        assert!(mapper.metadata::<Order>().is_ok());
    }

    #[test]
    fn configure_clears_cache() {
        let mapper = Mapper::new();
        let before = mapper.metadata::<Customer>().expect("mapped");
        assert_eq!(before.entity_name(), "Customers");

        mapper.configure::<Customer>(|c| {
            c.table("Clients");
        });
        assert!(mapper.cache().is_empty());
        let after = mapper.metadata::<Customer>().expect("mapped");
        assert_eq!(after.entity_name(), "Clients");
    }

    #[test]
    fn round_trip_through_mapper() {
        let mapper = Mapper::new();
        mapper.register_converter::<OrderId, i64>(|id| id.0, OrderId);

        let order = Order::sample();
        let row = mapper.to_row(&order).expect("flattened");
        assert_eq!(row["Id"], Value::Int64(42));
        assert_eq!(row["Total"], Value::Decimal(Decimal::new(1999, 2)));
        assert_eq!(row["Note"], Value::Null);

        let back: Order = mapper.unflatten(row).expect("rebuilt");
        assert_eq!(back, order);
    }

    #[test]
    fn flatten_dispatches() {
        let mapper = Mapper::new();
        let row = mapper
            .flatten(&Customer::sample())
            .expect("flattened")
            .into_row()
            .expect("aggregate");
        assert_eq!(
            row.names().collect::<Vec<_>>(),
            ["Id", "Name", "Address_Street", "Address_City"]
        );
        assert_eq!(
            mapper.flatten("hello").expect("flattened"),
            Flattened::Scalar(Value::Text("hello".into()))
        );
    }

    #[test]
    fn generate_uses_cached_metadata() {
        let mapper = Mapper::new();
        let statement = mapper
            .generate::<Customer>(Operation::Delete, &DialectOptions::new(Dialect::Sqlite))
            .expect("keyed");
        assert_eq!(statement.text(), r#"DELETE FROM "Customers" WHERE "Id" = ?1"#);
        assert!(mapper.cache().contains(TypeId::of::<Customer>()));
    }
}
