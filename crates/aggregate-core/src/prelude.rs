// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Convenient re-exports for common usage.
//!
//! # Usage
//!
//! ```rust,ignore
//! use aggregate_core::prelude::*;
//! ```

pub use crate::{
    AggregateConfig, AggregateMetadata, Dialect, DialectOptions, FlatRow, Flatten, Flattened,
    Mapped, Mapper, MappingError, MemberValues, Members, Operation, ParameterStyle,
    QueryGenerator, Scalar, ScalarKind, SqlStatement, Value
};
