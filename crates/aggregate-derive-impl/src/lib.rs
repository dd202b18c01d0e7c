// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

//! # Quick Navigation
//!
//! - [`Aggregate`](macro@Aggregate) — maps a struct onto flat columns
//! - [`Scalar`](macro@Scalar) — stores a fieldless enum as text
//!
//! # Attribute Quick Reference
//!
//! ```rust,ignore
//! #[derive(Aggregate)]
//! #[aggregate(
//!     table = "orders",        // Optional: table name (default: type name)
//!     view = "order_summaries", // Optional: selects read from here
//!     schema = "sales",        // Optional: qualifies table and view
//!     rename_all = "PascalCase" // Optional: member naming rule
//! )]
//! pub struct Order {
//!     #[aggregate(identity, convert)]
//!     pub id: OrderId,
//!
//!     #[aggregate(value_object)]
//!     pub shipping: Option<Address>,
//!
//!     #[aggregate(column = "note_text")]
//!     pub note: Option<String>,
//!
//!     #[aggregate(default)]
//!     pub created_at: DateTime<Utc>,
//!
//!     #[aggregate(skip)]
//!     pub dirty: bool
//! }
//! ```
//!
//! # Generated Code Overview
//!
//! | Derive | Generated impls |
//! |--------|-----------------|
//! | `Aggregate` | `Mapped` (`describe`, `materialize`, `configure`), `Flatten` |
//! | `Scalar` | `Scalar` (text kind), `Flatten` |
//!
//! Nothing is generated at the type level beyond trait impls: metadata is
//! still extracted by the runtime `Mapper`, which applies converters and
//! fluent configuration on top of the declared attributes.

mod aggregate;
mod scalar;
mod utils;

use proc_macro::TokenStream;

/// Derive `Mapped` and `Flatten` for a struct with named fields.
///
/// # Container Attributes
///
/// | Attribute | Default | Description |
/// |-----------|---------|-------------|
/// | `table` | type name | Table written to |
/// | `view` | — | View selects read from |
/// | `schema` | — | Schema qualifying table and view |
/// | `rename_all` | `"PascalCase"` | Rule turning field names into member names |
/// | `crate` | `::aggregate_orm` | Path of the runtime crate |
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `key` | Part of the primary key |
/// | `identity` | Store-assigned key; never inserted or updated |
/// | `default` | Store default; never inserted or updated |
/// | `ignore` | Kept out of every column list |
/// | `skip` | Not described; rebuilt with `Default::default()` |
/// | `value_object` | Nested aggregate flattened into prefixed columns |
/// | `convert` | Stored through a registered type converter |
/// | `rename = "X"` | Member name instead of the `rename_all` result |
/// | `column = "x"` | Column name differing from the member name |
///
/// Plain fields must implement `Scalar`; `Option<S>` fields are nullable.
///
/// # Example
///
/// ```rust,ignore
/// use aggregate_orm::{Aggregate, Mapper};
///
/// #[derive(Debug, Clone, PartialEq, Aggregate)]
/// pub struct Address {
///     pub street: String,
///     pub city:   String
/// }
///
/// #[derive(Debug, Clone, PartialEq, Aggregate)]
/// #[aggregate(table = "Customers")]
/// pub struct Customer {
///     #[aggregate(key)]
///     pub id:      i64,
///     pub name:    String,
///     #[aggregate(value_object)]
///     pub address: Option<Address>
/// }
///
/// let mapper = Mapper::new();
/// let row = mapper.to_row(&customer)?;
/// // Id, Name, Address_Street, Address_City
/// ```
///
/// # Errors
///
/// Compile errors point at the offending attribute:
///
/// - applied to an enum, union or tuple struct
/// - `skip` combined with another attribute
/// - `value_object` combined with `convert`
/// - `column` on a value object
/// - a struct whose fields are all skipped
#[proc_macro_derive(Aggregate, attributes(aggregate))]
pub fn derive_aggregate(input: TokenStream) -> TokenStream {
    aggregate::derive(input)
}

/// Derive `Scalar` and `Flatten` for a fieldless enum stored as text.
///
/// # Attributes
///
/// | Attribute | Level | Default | Description |
/// |-----------|-------|---------|-------------|
/// | `rename_all` | enum | `"verbatim"` | Rule turning variant names into stored text |
/// | `rename` | variant | — | Stored text for one variant |
/// | `crate` | enum | `::aggregate_orm` | Path of the runtime crate |
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Scalar)]
/// #[scalar(rename_all = "snake_case")]
/// pub enum Status {
///     Open,
///     OnHold
/// }
///
/// assert_eq!(Status::OnHold.to_value(), Value::Text("on_hold".into()));
/// ```
#[proc_macro_derive(Scalar, attributes(scalar))]
pub fn derive_scalar(input: TokenStream) -> TokenStream {
    scalar::derive(input)
}
