// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Core runtime for aggregate-orm.
//!
//! Maps rich domain aggregates (nested value objects, strongly-typed
//! identifiers, native scalars) onto the flat column shape of SQL tables and
//! back, and generates dialect-specific statements for them.
//!
//! # Overview
//!
//! - [`Mapped`] — Structural description of an aggregate or value object
//! - [`Mapper`] — Converters, configuration and the metadata cache
//! - [`AggregateMetadata`] — Immutable per-type mapping model
//! - [`FlatRow`] — Single-level `logical name → Value` row
//! - [`QueryGenerator`] — SQL text per [`Dialect`]
//! - [`ConverterRegistry`] — Strong types stored as primitives
//! - [`prelude`] — Convenient re-exports
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐   describe()   ┌──────────────┐   once per type   ┌──────────────────┐
//! │ T: Mapped     │ ─────────────► │  extractor   │ ────────────────► │ MetadataCache    │
//! └───────────────┘                └──────────────┘                   └──────────────────┘
//!                                         ▲                                    │
//!                      converters, config │                                    ▼
//!                                  ┌──────────────┐            ┌──────────────────────────┐
//!                                  │    Mapper    │            │ Arc<AggregateMetadata>   │
//!                                  └──────────────┘            └──────────────────────────┘
//!                                                                 │                  │
//!                                                                 ▼                  ▼
//!                                                       flatten / unflatten   QueryGenerator
//! ```
//!
//! # Naming
//!
//! Members of nested value objects flatten to `_`-joined logical names from
//! the root: `Customer { id, name, address: Address { street, city } }`
//! becomes `Id, Name, Address_Street, Address_City`. Column names default to
//! the logical name and can be overridden per member.
//!
//! # Usage
//!
//! Most users should use `aggregate-orm` directly, which re-exports this
//! crate together with the derive macros. For manual implementations:
//!
//! ```rust
//! use aggregate_core::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! struct Tag {
//!     id:    i64,
//!     label: String
//! }
//!
//! impl Mapped for Tag {
//!     fn describe(members: &mut Members<Self>) {
//!         members
//!             .scalar::<i64>("Id", |t| &t.id)
//!             .scalar::<String>("Label", |t| &t.label);
//!     }
//!
//!     fn materialize(values: &mut MemberValues) -> Result<Self, MappingError> {
//!         Ok(Self {
//!             id:    values.take("Id")?,
//!             label: values.take("Label")?
//!         })
//!     }
//!
//!     fn configure(config: &mut AggregateConfig) {
//!         config.table("tags").key("Id");
//!     }
//! }
//!
//! let mapper = Mapper::new();
//! let tag = Tag { id: 7, label: "rust".into() };
//!
//! let row = mapper.to_row(&tag).expect("mapped");
//! assert_eq!(row["Label"], Value::Text("rust".into()));
//!
//! let select = mapper
//!     .generate::<Tag>(Operation::Select, &DialectOptions::new(Dialect::Postgres))
//!     .expect("keyed");
//! assert_eq!(select.text(), r#"SELECT "Id", "Label" FROM "tags" WHERE "Id" = $1"#);
//!
//! let back: Tag = mapper.unflatten(row).expect("rebuilt");
//! assert_eq!(back, tag);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod cache;
mod config;
mod converter;
mod error;
mod extract;
mod flatten;
mod mapped;
mod mapper;
mod metadata;
mod row;
mod scalar;
mod sql;
mod value;

#[cfg(test)]
mod fixtures;

pub mod prelude;

pub use cache::{MetadataCache, TypeCache};
pub use config::AggregateConfig;
pub use converter::{ConverterRegistry, Converters, ErasedConverter, TypeConverter};
pub use error::{ConfigurationError, MappingError};
pub use extract::extract;
pub use flatten::{Flatten, Flattened, flatten, unflatten};
pub use mapped::{Mapped, MemberValues, Members, TypeInfo};
pub use mapper::Mapper;
pub use metadata::{
    AggregateMetadata, CompositeMember, IgnoredMember, MemberNode, PropertyDescriptor,
    PropertyDescriptorCollection, PropertyFlags, SimpleMember
};
pub use row::FlatRow;
pub use scalar::Scalar;
pub use sql::{
    Dialect, DialectOptions, Operation, ParameterStyle, QueryGenerator, Returning, SqlStatement,
    UpsertStrategy
};
pub use value::{ScalarKind, Value};
