// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Flattening and unflattening.
//!
//! [`flatten`] reads every descriptor of an aggregate into a [`FlatRow`];
//! [`unflatten`] walks the member tree the other way and rebuilds the
//! aggregate. Both use the naming of the metadata they are given, so a row
//! produced by one is always accepted by the other.
//!
//! # Null Subtrees
//!
//! ```text
//! Customer { Id: 1, Address: None }
//!     ──flatten──►  Id = 1, Address_Street = NULL, Address_City = NULL
//!     ──unflatten─► Customer { Id: 1, Address: None }
//! ```
//!
//! An optional value object whose columns are all `NULL` comes back as
//! `None`. A required value object is always rebuilt from its columns.
//!
//! # Passthrough
//!
//! The [`Flatten`] trait is implemented both for simple types, which flatten
//! to themselves ([`Flattened::Scalar`]), and by `#[derive(Aggregate)]` for
//! aggregates ([`Flattened::Row`]).

use std::any::{TypeId, type_name};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::MappingError,
    mapped::{Boxed, Mapped, MemberValues},
    mapper::Mapper,
    metadata::{AggregateMetadata, CompositeMember, MemberNode},
    row::FlatRow,
    scalar::Scalar,
    value::Value
};

/// Result of flattening a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Flattened {
    /// A simple value, returned unchanged.
    Scalar(Value),
    /// An aggregate spread over columns.
    Row(FlatRow)
}

impl Flattened {
    /// Check if the value was an aggregate.
    #[must_use]
    pub const fn is_row(&self) -> bool {
        matches!(self, Self::Row(_))
    }

    /// The row, if the value was an aggregate.
    #[must_use]
    pub fn into_row(self) -> Option<FlatRow> {
        match self {
            Self::Row(row) => Some(row),
            Self::Scalar(_) => None
        }
    }

    /// The value, if it was simple.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Row(_) => None
        }
    }
}

/// A value that can be flattened for storage.
pub trait Flatten {
    /// Flatten `self` using the metadata known to `mapper`.
    ///
    /// # Errors
    ///
    /// Configuration errors of the aggregate's metadata.
    fn flatten(&self, mapper: &Mapper) -> Result<Flattened, MappingError>;
}

macro_rules! flatten_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Flatten for $ty {
                fn flatten(&self, _mapper: &Mapper) -> Result<Flattened, MappingError> {
                    Ok(Flattened::Scalar(self.to_value()))
                }
            }
        )*
    };
}

flatten_scalar!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    Decimal,
    String,
    Vec<u8>,
    Uuid,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<Utc>,
    TimeDelta
);

impl Flatten for str {
    fn flatten(&self, _mapper: &Mapper) -> Result<Flattened, MappingError> {
        Ok(Flattened::Scalar(Value::Text(self.to_owned())))
    }
}

impl<T: Scalar> Flatten for Option<T> {
    fn flatten(&self, _mapper: &Mapper) -> Result<Flattened, MappingError> {
        Ok(Flattened::Scalar(self.to_value()))
    }
}

impl<T: Flatten + ?Sized> Flatten for &T {
    fn flatten(&self, mapper: &Mapper) -> Result<Flattened, MappingError> {
        (**self).flatten(mapper)
    }
}

/// Flatten `aggregate` into a row following `metadata`.
///
/// # Errors
///
/// [`MappingError::TypeMismatch`] when `metadata` was built for another type.
pub fn flatten<T: Mapped>(
    metadata: &AggregateMetadata,
    aggregate: &T
) -> Result<FlatRow, MappingError> {
    ensure_type::<T>(metadata)?;
    let mut row = FlatRow::with_capacity(metadata.properties().len());
    for property in metadata.properties() {
        let value = property.read(aggregate).ok_or_else(|| {
            MappingError::type_mismatch(
                metadata.aggregate_type().name(),
                property.name(),
                property.value_type().name(),
                "an unreadable member"
            )
        })?;
        row.insert(property.name(), value);
    }
    Ok(row)
}

/// Rebuild an aggregate from a row following `metadata`.
///
/// Columns not described by `metadata` are ignored.
///
/// # Errors
///
/// - [`MappingError::ValueMissing`] when a described column is absent
/// - [`MappingError::TypeMismatch`] when a value cannot be coerced to its
///   member type, or `metadata` was built for another type
pub fn unflatten<T: Mapped>(
    metadata: &AggregateMetadata,
    mut row: FlatRow
) -> Result<T, MappingError> {
    ensure_type::<T>(metadata)?;
    let mut values = Unflattener {
        metadata,
        row: &mut row
    }
    .members(metadata.members(), String::new())?;
    T::materialize(&mut values)
}

fn ensure_type<T: 'static>(metadata: &AggregateMetadata) -> Result<(), MappingError> {
    let expected = metadata.aggregate_type();
    if expected.id() == TypeId::of::<T>() {
        Ok(())
    } else {
        Err(MappingError::type_mismatch(
            expected.name(),
            metadata.entity_name(),
            expected.name(),
            type_name::<T>()
        ))
    }
}

struct Unflattener<'a> {
    metadata: &'a AggregateMetadata,
    row:      &'a mut FlatRow
}

impl Unflattener<'_> {
    fn aggregate(&self) -> &'static str {
        self.metadata.aggregate_type().name()
    }

    fn members(
        &mut self,
        nodes: &[MemberNode],
        prefix: String
    ) -> Result<MemberValues, MappingError> {
        let aggregate = self.aggregate();
        let mut values = MemberValues::new(aggregate, prefix);
        for node in nodes {
            match node {
                MemberNode::Simple(simple) => {
                    let property = &self.metadata.properties()[simple.position()];
                    let value = self
                        .row
                        .take(property.name())
                        .ok_or_else(|| MappingError::value_missing(aggregate, property.name()))?;
                    let decoded = property.decode(value).map_err(|found| {
                        MappingError::type_mismatch(
                            aggregate,
                            property.name(),
                            property.expected(),
                            found.type_name()
                        )
                    })?;
                    values.push(node.member(), decoded);
                }
                MemberNode::Composite(composite) => {
                    let value = self.composite(composite)?;
                    values.push(node.member(), value);
                }
                MemberNode::Ignored(ignored) => {
                    if let Some(value) = ignored.fallback.and_then(|fallback| fallback()) {
                        values.push(node.member(), value);
                    }
                }
            }
        }
        Ok(values)
    }

    fn composite(&mut self, composite: &CompositeMember) -> Result<Boxed, MappingError> {
        if let Some(null) = composite.wrapper.null
            && self.all_null(composite)?
        {
            return Ok(null());
        }
        let mut nested = self.members(composite.children(), format!("{}_", composite.path))?;
        let value = (composite.shape.materialize)(&mut nested)?;
        Ok((composite.wrapper.wrap)(value))
    }

    fn all_null(&self, composite: &CompositeMember) -> Result<bool, MappingError> {
        let mut positions = Vec::new();
        composite.leaf_positions(&mut positions);
        for position in positions {
            let name = self.metadata.properties()[position].name();
            match self.row.get(name) {
                None => return Err(MappingError::value_missing(self.aggregate(), name)),
                Some(value) if !value.is_null() => return Ok(false),
                Some(_) => {}
            }
        }
        Ok(true)
    }
}
