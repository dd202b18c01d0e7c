// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Type converters between domain types and column primitives.
//!
//! A [`TypeConverter<D, P>`] turns a domain value `D` (a strongly typed id, a
//! money amount, an enum with custom codes) into a [`Scalar`] primitive `P`
//! and back. Converters are registered per domain type in a
//! [`ConverterRegistry`]; registering again for the same type replaces the
//! previous converter.
//!
//! Members whose exact type has a converter are stored in a single column of
//! the converter's primitive kind, even when they would otherwise be
//! flattened as value objects.
//!
//! # Example
//!
//! ```rust
//! use aggregate_core::{ConverterRegistry, Value};
//!
//! struct OrderId(i64);
//!
//! let registry = ConverterRegistry::new();
//! registry.register::<OrderId, i64>(|id| id.0, OrderId);
//!
//! let converter = registry.get_for::<OrderId>().expect("registered");
//! assert_eq!(converter.encode_any(&OrderId(7)), Some(Value::Int64(7)));
//! ```

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc
};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::{
    mapped::TypeInfo,
    scalar::Scalar,
    value::{ScalarKind, Value}
};

type EncodeFn<D, P> = Box<dyn Fn(&D) -> P + Send + Sync>;
type DecodeFn<D, P> = Box<dyn Fn(P) -> D + Send + Sync>;

/// Bidirectional conversion between a domain type and a column primitive.
pub struct TypeConverter<D, P> {
    encode: EncodeFn<D, P>,
    decode: DecodeFn<D, P>
}

impl<D, P> TypeConverter<D, P> {
    /// Build a converter from a pair of total functions.
    pub fn new(
        encode: impl Fn(&D) -> P + Send + Sync + 'static,
        decode: impl Fn(P) -> D + Send + Sync + 'static
    ) -> Self {
        Self {
            encode: Box::new(encode),
            decode: Box::new(decode)
        }
    }

    /// Domain value to primitive.
    pub fn encode(&self, value: &D) -> P {
        (self.encode)(value)
    }

    /// Primitive to domain value.
    pub fn decode(&self, value: P) -> D {
        (self.decode)(value)
    }
}

/// Type-erased converter as stored in the registry.
pub trait ErasedConverter: Send + Sync {
    /// Domain type the converter handles.
    fn domain_type(&self) -> TypeInfo;

    /// Column kind of the primitive side.
    fn primitive_kind(&self) -> ScalarKind;

    /// Whether the primitive side accepts `NULL`.
    fn primitive_nullable(&self) -> bool;

    /// Encode a domain value, `None` when `value` is not of the domain type.
    fn encode_any(&self, value: &dyn Any) -> Option<Value>;

    /// Decode a column value into a boxed domain value, handing the value back
    /// when the primitive side cannot accept it.
    #[doc(hidden)]
    fn decode_value(&self, value: Value) -> Result<Box<dyn Any + Send>, Value>;
}

impl<D: Send + 'static, P: Scalar> ErasedConverter for TypeConverter<D, P> {
    fn domain_type(&self) -> TypeInfo {
        TypeInfo::of::<D>()
    }

    fn primitive_kind(&self) -> ScalarKind {
        P::KIND
    }

    fn primitive_nullable(&self) -> bool {
        P::NULLABLE
    }

    fn encode_any(&self, value: &dyn Any) -> Option<Value> {
        value
            .downcast_ref::<D>()
            .map(|domain| self.encode(domain).to_value())
    }

    fn decode_value(&self, value: Value) -> Result<Box<dyn Any + Send>, Value> {
        P::from_value(value)
            .map(|primitive| Box::new(self.decode(primitive)) as Box<dyn Any + Send>)
    }
}

impl fmt::Debug for dyn ErasedConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeConverter")
            .field("domain", &self.domain_type().name())
            .field("primitive", &self.primitive_kind())
            .finish()
    }
}

/// Converters keyed by domain type.
#[derive(Default)]
pub struct ConverterRegistry {
    converters: RwLock<HashMap<TypeId, Arc<dyn ErasedConverter>>>
}

impl ConverterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter for `D`, replacing any previous one.
    ///
    /// Returns `true` when a previous converter was replaced.
    pub fn register<D: Send + 'static, P: Scalar>(
        &self,
        encode: impl Fn(&D) -> P + Send + Sync + 'static,
        decode: impl Fn(P) -> D + Send + Sync + 'static
    ) -> bool {
        self.insert(Arc::new(TypeConverter::new(encode, decode)))
    }

    /// Register an already built converter, replacing any previous one for
    /// its domain type.
    pub fn insert(&self, converter: Arc<dyn ErasedConverter>) -> bool {
        let domain = converter.domain_type();
        let replaced = self
            .converters
            .write()
            .insert(domain.id(), converter)
            .is_some();
        if replaced {
            warn!(domain = domain.name(), "type converter replaced");
        } else {
            debug!(domain = domain.name(), "type converter registered");
        }
        replaced
    }

    /// Converter registered for the type `id`.
    #[must_use]
    pub fn get(&self, id: TypeId) -> Option<Arc<dyn ErasedConverter>> {
        self.converters.read().get(&id).cloned()
    }

    /// Converter registered for `D`.
    #[must_use]
    pub fn get_for<D: 'static>(&self) -> Option<Arc<dyn ErasedConverter>> {
        self.get(TypeId::of::<D>())
    }

    /// Check if a converter is registered for the type `id`.
    #[must_use]
    pub fn contains(&self, id: TypeId) -> bool {
        self.converters.read().contains_key(&id)
    }

    /// Number of registered converters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.read().len()
    }

    /// Check if no converter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.read().is_empty()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let converters = self.converters.read();
        f.debug_list().entries(converters.values()).finish()
    }
}

/// Read-only view of a [`ConverterRegistry`].
///
/// Handed out by [`Mapper::converters`](crate::Mapper::converters); changes
/// go through [`Mapper::register_converter`](crate::Mapper::register_converter)
/// so cached metadata never outlives the converter it was built with.
#[derive(Clone, Copy)]
pub struct Converters<'a> {
    registry: &'a ConverterRegistry
}

impl<'a> Converters<'a> {
    pub(crate) const fn new(registry: &'a ConverterRegistry) -> Self {
        Self {
            registry
        }
    }

    /// Converter registered for the type `id`.
    #[must_use]
    pub fn get(&self, id: TypeId) -> Option<Arc<dyn ErasedConverter>> {
        self.registry.get(id)
    }

    /// Converter registered for `D`.
    #[must_use]
    pub fn get_for<D: 'static>(&self) -> Option<Arc<dyn ErasedConverter>> {
        self.registry.get_for::<D>()
    }

    /// Check if a converter is registered for the type `id`.
    #[must_use]
    pub fn contains(&self, id: TypeId) -> bool {
        self.registry.contains(id)
    }

    /// Number of registered converters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if no converter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl fmt::Debug for Converters<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.registry, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Sku(String);

    #[test]
    fn typed_converter_round_trips() {
        let converter = TypeConverter::<Sku, String>::new(|sku| sku.0.clone(), Sku);
        let raw = converter.encode(&Sku("A-1".into()));
        assert_eq!(raw, "A-1");
        assert_eq!(converter.decode(raw), Sku("A-1".into()));
    }

    #[test]
    fn erased_converter_reports_primitive() {
        let registry = ConverterRegistry::new();
        registry.register::<Sku, String>(|sku| sku.0.clone(), Sku);

        let converter = registry.get_for::<Sku>().expect("registered");
        assert_eq!(converter.primitive_kind(), ScalarKind::Text);
        assert!(!converter.primitive_nullable());
        assert_eq!(converter.domain_type(), TypeInfo::of::<Sku>());
        assert_eq!(converter.encode_any(&1_i32), None);

        let decoded = converter
            .decode_value(Value::Text("B-2".into()))
            .expect("decodes");
        assert_eq!(decoded.downcast_ref::<Sku>(), Some(&Sku("B-2".into())));
        assert_eq!(
            converter.decode_value(Value::Int32(3)).err(),
            Some(Value::Int32(3))
        );
    }

    #[test]
    fn last_registration_wins() {
        let registry = ConverterRegistry::new();
        assert!(!registry.register::<Sku, String>(|sku| sku.0.clone(), Sku));
        assert!(registry.register::<Sku, String>(|sku| sku.0.to_lowercase(), Sku));
        assert_eq!(registry.len(), 1);

        let converter = registry.get_for::<Sku>().expect("registered");
        assert_eq!(
            converter.encode_any(&Sku("ABC".into())),
            Some(Value::Text("abc".into()))
        );
    }

    #[test]
    fn unknown_type_has_no_converter() {
        let registry = ConverterRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get_for::<Sku>().is_none());
        assert!(!registry.contains(TypeId::of::<Sku>()));
    }
}
