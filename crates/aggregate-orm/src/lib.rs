// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

//! # aggregate-orm
//!
//! One crate, all features. Re-exports:
//! - [`Aggregate`](macro@Aggregate) and [`Scalar`](macro@Scalar) derive
//!   macros from `aggregate-derive-impl`
//! - All types from `aggregate-core` ([`Mapper`], [`FlatRow`],
//!   [`QueryGenerator`], [`Dialect`])
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use aggregate_orm::{Aggregate, Dialect, DialectOptions, Mapper, Operation};
//!
//! #[derive(Aggregate)]
//! #[aggregate(table = "Customers")]
//! pub struct Customer {
//!     #[aggregate(key)]
//!     pub id:   i64,
//!     pub name: String
//! }
//!
//! let mapper = Mapper::new();
//! let row = mapper.to_row(&customer)?;
//! let upsert = mapper.generate::<Customer>(
//!     Operation::Upsert,
//!     &DialectOptions::new(Dialect::SqlServer)
//! )?;
//! ```

pub use aggregate_core::*;
pub use aggregate_derive_impl::{Aggregate, Scalar};
