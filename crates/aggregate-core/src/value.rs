// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Column values and column kinds.
//!
//! A [`Value`] is what one column of a [`FlatRow`](crate::FlatRow) holds. It
//! never nests: composite members are spread across several columns by the
//! flattening engine before they reach this type.
//!
//! [`ScalarKind`] is the declared kind of a column, i.e. the non-null variants
//! of [`Value`]. Property descriptors carry one so generators and drivers know
//! what to expect without looking at data.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declared kind of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    /// `bool`.
    Bool,
    /// `i16`.
    Int16,
    /// `i32`.
    Int32,
    /// `i64`.
    Int64,
    /// `f32`.
    Float32,
    /// `f64`.
    Float64,
    /// Fixed-point decimal.
    Decimal,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Bytes,
    /// UUID.
    Uuid,
    /// Calendar date without time zone.
    Date,
    /// Time of day without time zone.
    Time,
    /// Date and time without time zone.
    DateTime,
    /// Date and time in UTC.
    Timestamp,
    /// Signed duration.
    Interval
}

impl ScalarKind {
    /// Lowercase name used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Decimal => "decimal",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Interval => "interval"
        }
    }

    /// Check if the kind is an integer kind.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Int16 | Self::Int32 | Self::Int64)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single column value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL `NULL`.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// 16-bit integer.
    Int16(i16),
    /// 32-bit integer.
    Int32(i32),
    /// 64-bit integer.
    Int64(i64),
    /// 32-bit float.
    Float32(f32),
    /// 64-bit float.
    Float64(f64),
    /// Fixed-point decimal.
    Decimal(Decimal),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// UUID.
    Uuid(Uuid),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time without time zone.
    DateTime(NaiveDateTime),
    /// Date and time in UTC.
    Timestamp(DateTime<Utc>),
    /// Signed duration.
    Interval(TimeDelta)
}

impl Value {
    /// Check if the value is `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Kind of the value, `None` for `NULL`.
    #[must_use]
    pub const fn kind(&self) -> Option<ScalarKind> {
        Some(match self {
            Self::Null => return None,
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int16(_) => ScalarKind::Int16,
            Self::Int32(_) => ScalarKind::Int32,
            Self::Int64(_) => ScalarKind::Int64,
            Self::Float32(_) => ScalarKind::Float32,
            Self::Float64(_) => ScalarKind::Float64,
            Self::Decimal(_) => ScalarKind::Decimal,
            Self::Text(_) => ScalarKind::Text,
            Self::Bytes(_) => ScalarKind::Bytes,
            Self::Uuid(_) => ScalarKind::Uuid,
            Self::Date(_) => ScalarKind::Date,
            Self::Time(_) => ScalarKind::Time,
            Self::DateTime(_) => ScalarKind::DateTime,
            Self::Timestamp(_) => ScalarKind::Timestamp,
            Self::Interval(_) => ScalarKind::Interval
        })
    }

    /// Name of the value's kind, `"null"` for `NULL`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.name(),
            None => "null"
        }
    }

    /// Borrow the text payload.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None
        }
    }

    /// Widen any integer payload to `i64`.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int16(v) => Some(*v as i64),
            Self::Int32(v) => Some(*v as i64),
            Self::Int64(v) => Some(*v),
            _ => None
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

value_from!(
    bool => Bool,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    Decimal => Decimal,
    String => Text,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<Utc> => Timestamp,
    TimeDelta => Interval
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
