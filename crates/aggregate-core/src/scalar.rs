// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Simple (single-column) types.
//!
//! A type implementing [`Scalar`] maps to exactly one column. The crate
//! implements it for the usual primitives, strings, bytes, decimals, UUIDs,
//! `chrono` date/time types and for `Option<S>` as the nullable wrapper of any
//! scalar `S`. Unsigned and 8-bit integers are stored in the next wider
//! signed column (`u64` as a decimal). Fieldless enums get an implementation from
//! `#[derive(Scalar)]`, which stores the variant name as text.
//!
//! # Coercion
//!
//! [`Scalar::from_value`] accepts more than the exact variant so rows coming
//! from drivers with narrower type systems still materialize:
//!
//! | Target | Accepted values |
//! |--------|-----------------|
//! | `i8`, `i16`, `i32`, `i64`, `u8`, `u16`, `u32` | any integer that fits |
//! | `u64` | non-negative integers, integral decimals that fit |
//! | `char` | text of exactly one character |
//! | `f32`, `f64` | floats, integers |
//! | `bool` | bool, integer `0`/`1` |
//! | `Decimal` | decimal, integers, floats, numeric text |
//! | `Uuid` | uuid, hyphenated text, 16 bytes |
//! | `NaiveDateTime`, `DateTime<Utc>` | either date-time flavour |
//! | `NaiveDate` | date, either date-time flavour |
//!
//! Anything else is rejected and handed back so the caller can report what it
//! found.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::value::{ScalarKind, Value};

/// A type stored in exactly one column.
///
/// # Example
///
/// ```rust
/// use aggregate_core::{Scalar, ScalarKind, Value};
///
/// #[derive(Debug, PartialEq)]
/// struct Celsius(f64);
///
/// impl Scalar for Celsius {
///     const KIND: ScalarKind = ScalarKind::Float64;
///
///     fn to_value(&self) -> Value {
///         Value::Float64(self.0)
///     }
///
///     fn from_value(value: Value) -> Result<Self, Value> {
///         f64::from_value(value).map(Celsius)
///     }
/// }
///
/// assert_eq!(Celsius::from_value(Value::Int32(21)), Ok(Celsius(21.0)));
/// ```
pub trait Scalar: Sized + Send + 'static {
    /// Declared column kind.
    const KIND: ScalarKind;

    /// Whether the column accepts `NULL`.
    const NULLABLE: bool = false;

    /// Encode into a column value.
    fn to_value(&self) -> Value;

    /// Decode from a column value, handing the value back when it cannot be
    /// coerced.
    fn from_value(value: Value) -> Result<Self, Value>;

    /// Value used when the member is ignored by configuration.
    ///
    /// `None` means the member cannot be ignored at runtime.
    fn fallback() -> Option<Self> {
        None
    }
}

macro_rules! integer_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;

                fn to_value(&self) -> Value {
                    Value::$kind(*self)
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    let converted = value.as_i64().and_then(|v| <$ty>::try_from(v).ok());
                    converted.ok_or(value)
                }

                fn fallback() -> Option<Self> {
                    Some(0)
                }
            }
        )*
    };
}

integer_scalar!(i16 => Int16, i32 => Int32, i64 => Int64);

macro_rules! widened_integer_scalar {
    ($($ty:ty => $kind:ident($wide:ty)),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;

                fn to_value(&self) -> Value {
                    Value::$kind(<$wide>::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    let converted = value.as_i64().and_then(|v| <$ty>::try_from(v).ok());
                    converted.ok_or(value)
                }

                fn fallback() -> Option<Self> {
                    Some(0)
                }
            }
        )*
    };
}

widened_integer_scalar!(
    i8 => Int16(i16),
    u8 => Int16(i16),
    u16 => Int32(i32),
    u32 => Int64(i64)
);

impl Scalar for u64 {
    const KIND: ScalarKind = ScalarKind::Decimal;

    fn to_value(&self) -> Value {
        Value::Decimal(Decimal::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        let converted = match &value {
            Value::Decimal(v) if v.fract().is_zero() => u64::try_from(*v).ok(),
            other => other.as_i64().and_then(|v| u64::try_from(v).ok())
        };
        converted.ok_or(value)
    }

    fn fallback() -> Option<Self> {
        Some(0)
    }
}

impl Scalar for char {
    const KIND: ScalarKind = ScalarKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        let converted = match &value {
            Value::Text(text) => {
                let mut chars = text.chars();
                chars.next().filter(|_| chars.next().is_none())
            }
            _ => None
        };
        converted.ok_or(value)
    }
}

impl Scalar for f32 {
    const KIND: ScalarKind = ScalarKind::Float32;

    fn to_value(&self) -> Value {
        Value::Float32(*self)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float32(v) => Ok(v),
            Value::Float64(v) => Ok(v as f32),
            Value::Int16(v) => Ok(f32::from(v)),
            Value::Int32(v) => Ok(v as f32),
            Value::Int64(v) => Ok(v as f32),
            other => Err(other)
        }
    }

    fn fallback() -> Option<Self> {
        Some(0.0)
    }
}

impl Scalar for f64 {
    const KIND: ScalarKind = ScalarKind::Float64;

    fn to_value(&self) -> Value {
        Value::Float64(*self)
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float64(v) => Ok(v),
            Value::Float32(v) => Ok(f64::from(v)),
            Value::Int16(v) => Ok(f64::from(v)),
            Value::Int32(v) => Ok(f64::from(v)),
            Value::Int64(v) => Ok(v as f64),
            other => Err(other)
        }
    }

    fn fallback() -> Option<Self> {
        Some(0.0)
    }
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(v) => Ok(v),
            other => match other.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(other)
            }
        }
    }

    fn fallback() -> Option<Self> {
        Some(false)
    }
}

impl Scalar for Decimal {
    const KIND: ScalarKind = ScalarKind::Decimal;

    fn to_value(&self) -> Value {
        Value::Decimal(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        let converted = match &value {
            Value::Decimal(v) => Some(*v),
            Value::Float32(v) => Decimal::try_from(*v).ok(),
            Value::Float64(v) => Decimal::try_from(*v).ok(),
            Value::Text(text) => Decimal::from_str(text).ok(),
            other => other.as_i64().map(Decimal::from)
        };
        converted.ok_or(value)
    }

    fn fallback() -> Option<Self> {
        Some(Decimal::ZERO)
    }
}

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Text(text) => Ok(text),
            other => Err(other)
        }
    }

    fn fallback() -> Option<Self> {
        Some(Self::new())
    }
}

impl Scalar for Vec<u8> {
    const KIND: ScalarKind = ScalarKind::Bytes;

    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(other)
        }
    }

    fn fallback() -> Option<Self> {
        Some(Self::new())
    }
}

impl Scalar for Uuid {
    const KIND: ScalarKind = ScalarKind::Uuid;

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        let converted = match &value {
            Value::Uuid(v) => Some(*v),
            Value::Text(text) => Uuid::parse_str(text).ok(),
            Value::Bytes(bytes) => Uuid::from_slice(bytes).ok(),
            _ => None
        };
        converted.ok_or(value)
    }

    fn fallback() -> Option<Self> {
        Some(Uuid::nil())
    }
}

impl Scalar for NaiveDate {
    const KIND: ScalarKind = ScalarKind::Date;

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Date(v) => Ok(v),
            Value::DateTime(v) => Ok(v.date()),
            Value::Timestamp(v) => Ok(v.date_naive()),
            other => Err(other)
        }
    }
}

impl Scalar for NaiveTime {
    const KIND: ScalarKind = ScalarKind::Time;

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Time(v) => Ok(v),
            other => Err(other)
        }
    }
}

impl Scalar for NaiveDateTime {
    const KIND: ScalarKind = ScalarKind::DateTime;

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::DateTime(v) => Ok(v),
            Value::Timestamp(v) => Ok(v.naive_utc()),
            other => Err(other)
        }
    }
}

impl Scalar for DateTime<Utc> {
    const KIND: ScalarKind = ScalarKind::Timestamp;

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Timestamp(v) => Ok(v),
            Value::DateTime(v) => Ok(Utc.from_utc_datetime(&v)),
            other => Err(other)
        }
    }
}

impl Scalar for TimeDelta {
    const KIND: ScalarKind = ScalarKind::Interval;

    fn to_value(&self) -> Value {
        Value::Interval(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Interval(v) => Ok(v),
            other => Err(other)
        }
    }

    fn fallback() -> Option<Self> {
        Some(TimeDelta::zero())
    }
}

impl<T: Scalar> Scalar for Option<T> {
    const KIND: ScalarKind = T::KIND;
    const NULLABLE: bool = true;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Scalar::to_value)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some)
        }
    }

    fn fallback() -> Option<Self> {
        Some(None)
    }
}
