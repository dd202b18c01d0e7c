// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Structural description of aggregates and value objects.
//!
//! The extractor cannot look inside a Rust type on its own. A type opts in by
//! implementing [`Mapped`]: it lists its members in declaration order through
//! [`Members`] and rebuilds itself from a [`MemberValues`] bag. Both halves
//! are normally generated by `#[derive(Aggregate)]`.
//!
//! # Member Kinds
//!
//! | Declaration | Shape | Flattened as |
//! |-------------|-------|--------------|
//! | [`Members::scalar`] | `Scalar` type, incl. `Option<S>` | one column |
//! | [`Members::value_object`] | nested `Mapped` type | prefixed columns |
//! | [`Members::optional_value_object`] | `Option<M>` of a `Mapped` type | prefixed nullable columns |
//! | [`Members::converted`] | type with a registered converter | one column |
//! | [`Members::optional_converted`] | `Option<D>` with a registered converter | one nullable column |
//! | [`Members::skipped`] | anything | nothing |
//!
//! A value object member still becomes a single column when a converter is
//! registered for its exact type.
//!
//! # Example
//!
//! ```rust
//! use aggregate_core::{Mapped, MappingError, MemberValues, Members};
//!
//! struct Address {
//!     street: String,
//!     city:   String
//! }
//!
//! impl Mapped for Address {
//!     fn describe(members: &mut Members<Self>) {
//!         members
//!             .scalar::<String>("Street", |a| &a.street)
//!             .scalar::<String>("City", |a| &a.city);
//!     }
//!
//!     fn materialize(values: &mut MemberValues) -> Result<Self, MappingError> {
//!         Ok(Self {
//!             street: values.take("Street")?,
//!             city:   values.take("City")?
//!         })
//!     }
//! }
//! ```

use std::{
    any::{Any, TypeId, type_name},
    fmt,
    marker::PhantomData,
    sync::Arc
};

use crate::{
    config::AggregateConfig,
    error::MappingError,
    scalar::Scalar,
    value::{ScalarKind, Value}
};

/// Owned, type-erased member value.
pub(crate) type Boxed = Box<dyn Any + Send>;

/// Rust type identity with its name for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    id:   TypeId,
    name: &'static str
}

impl TypeInfo {
    /// Describe `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id:   TypeId::of::<T>(),
            name: type_name::<T>()
        }
    }

    /// `TypeId` of the type.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without module path or generic arguments.
    ///
    /// ```rust
    /// use aggregate_core::TypeInfo;
    ///
    /// assert_eq!(TypeInfo::of::<Vec<String>>().short_name(), "Vec");
    /// ```
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Reads one member out of its owner.
pub(crate) trait Accessor: Send + Sync {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any>;
}

struct FieldAccessor<T, F> {
    get: fn(&T) -> &F
}

impl<T: 'static, F: 'static> Accessor for FieldAccessor<T, F> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any> {
        owner
            .downcast_ref::<T>()
            .map(|owner| (self.get)(owner) as &dyn Any)
    }
}

fn accessor<T: 'static, F: 'static>(get: fn(&T) -> &F) -> Arc<dyn Accessor> {
    Arc::new(FieldAccessor {
        get
    })
}

/// How a member's declared type relates to the type it carries.
///
/// `Option<M>` members are unwrapped before recursion or conversion and
/// wrapped again when the owner is rebuilt.
#[derive(Clone, Copy)]
pub(crate) struct Wrapper {
    pub(crate) unwrap: for<'a> fn(&'a dyn Any) -> Option<&'a dyn Any>,
    pub(crate) wrap:   fn(Boxed) -> Boxed,
    pub(crate) null:   Option<fn() -> Boxed>
}

impl Wrapper {
    const fn plain() -> Self {
        Self {
            unwrap: unwrap_plain,
            wrap:   wrap_plain,
            null:   None
        }
    }

    fn optional<F: Send + 'static>() -> Self {
        Self {
            unwrap: unwrap_option::<F>,
            wrap:   wrap_option::<F>,
            null:   Some(null_option::<F>)
        }
    }

    pub(crate) const fn is_nullable(&self) -> bool {
        self.null.is_some()
    }
}

fn unwrap_plain(value: &dyn Any) -> Option<&dyn Any> {
    Some(value)
}

fn unwrap_option<F: 'static>(value: &dyn Any) -> Option<&dyn Any> {
    value
        .downcast_ref::<Option<F>>()
        .and_then(Option::as_ref)
        .map(|inner| inner as &dyn Any)
}

fn wrap_plain(value: Boxed) -> Boxed {
    value
}

fn wrap_option<F: Send + 'static>(value: Boxed) -> Boxed {
    match value.downcast::<F>() {
        Ok(inner) => Box::new(Some(*inner)) as Boxed,
        Err(value) => value
    }
}

fn null_option<F: Send + 'static>() -> Boxed {
    Box::new(None::<F>)
}

/// Column behaviour of a `Scalar` member.
#[derive(Clone, Copy)]
pub(crate) struct ScalarShape {
    pub(crate) kind:     ScalarKind,
    pub(crate) nullable: bool,
    pub(crate) encode:   fn(&dyn Any) -> Option<Value>,
    pub(crate) decode:   fn(Value) -> Result<Boxed, Value>
}

impl ScalarShape {
    fn of<F: Scalar>() -> Self {
        Self {
            kind:     F::KIND,
            nullable: F::NULLABLE,
            encode:   encode_scalar::<F>,
            decode:   decode_scalar::<F>
        }
    }
}

fn encode_scalar<F: Scalar>(value: &dyn Any) -> Option<Value> {
    value.downcast_ref::<F>().map(Scalar::to_value)
}

fn decode_scalar<F: Scalar>(value: Value) -> Result<Boxed, Value> {
    F::from_value(value).map(|v| Box::new(v) as Boxed)
}

/// Recursion entry points of a nested `Mapped` type.
#[derive(Clone, Copy)]
pub(crate) struct CompositeShape {
    pub(crate) ty:          TypeInfo,
    pub(crate) describe:    fn() -> Vec<MemberDef>,
    pub(crate) configure:   fn(&mut AggregateConfig),
    pub(crate) materialize: fn(&mut MemberValues) -> Result<Boxed, MappingError>
}

impl CompositeShape {
    fn of<F: Mapped>() -> Self {
        Self {
            ty:          TypeInfo::of::<F>(),
            describe:    describe_members::<F>,
            configure:   F::configure,
            materialize: materialize_boxed::<F>
        }
    }
}

fn materialize_boxed<F: Mapped>(values: &mut MemberValues) -> Result<Boxed, MappingError> {
    F::materialize(values).map(|v| Box::new(v) as Boxed)
}

pub(crate) enum MemberKind {
    Scalar {
        access: Arc<dyn Accessor>,
        shape:  ScalarShape
    },
    ValueObject {
        access:  Arc<dyn Accessor>,
        shape:   CompositeShape,
        wrapper: Wrapper
    },
    Converted {
        access:  Arc<dyn Accessor>,
        wrapper: Wrapper
    },
    Skipped
}

/// One declared member, before classification.
pub(crate) struct MemberDef {
    pub(crate) name:     &'static str,
    /// Type a converter is looked up by: the member type, or `M` for
    /// `Option<M>` members.
    pub(crate) ty:       TypeInfo,
    pub(crate) kind:     MemberKind,
    pub(crate) fallback: fn() -> Option<Boxed>
}

impl MemberDef {
    pub(crate) const fn wrapper(&self) -> Wrapper {
        match &self.kind {
            MemberKind::ValueObject {
                wrapper, ..
            }
            | MemberKind::Converted {
                wrapper, ..
            } => *wrapper,
            MemberKind::Scalar { .. } | MemberKind::Skipped => Wrapper::plain()
        }
    }

    pub(crate) fn access(&self) -> Option<&Arc<dyn Accessor>> {
        match &self.kind {
            MemberKind::Scalar {
                access, ..
            }
            | MemberKind::ValueObject {
                access, ..
            }
            | MemberKind::Converted {
                access, ..
            } => Some(access),
            MemberKind::Skipped => None
        }
    }
}

fn no_fallback() -> Option<Boxed> {
    None
}

fn scalar_fallback<F: Scalar>() -> Option<Boxed> {
    F::fallback().map(|v| Box::new(v) as Boxed)
}

fn none_fallback<F: Send + 'static>() -> Option<Boxed> {
    Some(null_option::<F>())
}

/// Member declarations of `T`, in declaration order.
///
/// Names are the member's logical name segment; the extractor joins nested
/// segments with `_`.
pub struct Members<T> {
    defs:   Vec<MemberDef>,
    _owner: PhantomData<fn(&T)>
}

impl<T: 'static> Members<T> {
    pub(crate) const fn new() -> Self {
        Self {
            defs:   Vec::new(),
            _owner: PhantomData
        }
    }

    fn push(&mut self, def: MemberDef) -> &mut Self {
        self.defs.push(def);
        self
    }

    /// Declare a single-column member.
    pub fn scalar<F: Scalar>(&mut self, name: &'static str, get: fn(&T) -> &F) -> &mut Self {
        self.push(MemberDef {
            name,
            ty: TypeInfo::of::<F>(),
            kind: MemberKind::Scalar {
                access: accessor(get),
                shape:  ScalarShape::of::<F>()
            },
            fallback: scalar_fallback::<F>
        })
    }

    /// Declare a nested value object flattened into prefixed columns.
    pub fn value_object<F: Mapped>(&mut self, name: &'static str, get: fn(&T) -> &F) -> &mut Self {
        self.push(MemberDef {
            name,
            ty: TypeInfo::of::<F>(),
            kind: MemberKind::ValueObject {
                access:  accessor(get),
                shape:   CompositeShape::of::<F>(),
                wrapper: Wrapper::plain()
            },
            fallback: no_fallback
        })
    }

    /// Declare a nested value object that may be absent.
    ///
    /// An absent value flattens to `NULL` in every descendant column, and a
    /// row whose descendant columns are all `NULL` rebuilds it as `None`.
    pub fn optional_value_object<F: Mapped>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &Option<F>
    ) -> &mut Self {
        self.push(MemberDef {
            name,
            ty: TypeInfo::of::<F>(),
            kind: MemberKind::ValueObject {
                access:  accessor(get),
                shape:   CompositeShape::of::<F>(),
                wrapper: Wrapper::optional::<F>()
            },
            fallback: none_fallback::<F>
        })
    }

    /// Declare a member stored through a registered type converter.
    ///
    /// Metadata extraction fails when no converter for `F` is registered.
    pub fn converted<F: Send + 'static>(&mut self, name: &'static str, get: fn(&T) -> &F) -> &mut Self {
        self.push(MemberDef {
            name,
            ty: TypeInfo::of::<F>(),
            kind: MemberKind::Converted {
                access:  accessor(get),
                wrapper: Wrapper::plain()
            },
            fallback: no_fallback
        })
    }

    /// Declare an optional member stored through a converter for `F`.
    pub fn optional_converted<F: Send + 'static>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &Option<F>
    ) -> &mut Self {
        self.push(MemberDef {
            name,
            ty: TypeInfo::of::<F>(),
            kind: MemberKind::Converted {
                access:  accessor(get),
                wrapper: Wrapper::optional::<F>()
            },
            fallback: none_fallback::<F>
        })
    }

    /// Declare a member that never maps to a column.
    ///
    /// [`Mapped::materialize`] must build it without reading from the bag.
    pub fn skipped<F: 'static>(&mut self, name: &'static str) -> &mut Self {
        self.push(MemberDef {
            name,
            ty: TypeInfo::of::<F>(),
            kind: MemberKind::Skipped,
            fallback: no_fallback
        })
    }
}

/// Member values handed to [`Mapped::materialize`].
///
/// Values are keyed by the member's name segment as declared in
/// [`Mapped::describe`].
pub struct MemberValues {
    aggregate: &'static str,
    prefix:    String,
    entries:   Vec<(&'static str, Boxed)>
}

impl MemberValues {
    pub(crate) const fn new(aggregate: &'static str, prefix: String) -> Self {
        Self {
            aggregate,
            prefix,
            entries: Vec::new()
        }
    }

    pub(crate) fn push(&mut self, name: &'static str, value: Boxed) {
        self.entries.push((name, value));
    }

    fn path(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    /// Take the value of member `name`.
    ///
    /// # Errors
    ///
    /// [`MappingError::ValueMissing`] when no value was produced for `name`,
    /// [`MappingError::TypeMismatch`] when it is not an `F`.
    pub fn take<F: 'static>(&mut self, name: &str) -> Result<F, MappingError> {
        let position = self
            .entries
            .iter()
            .position(|(entry, _)| *entry == name)
            .ok_or_else(|| MappingError::value_missing(self.aggregate, self.path(name)))?;
        let (_, value) = self.entries.swap_remove(position);
        value.downcast::<F>().map(|value| *value).map_err(|_| {
            MappingError::type_mismatch(
                self.aggregate,
                self.path(name),
                type_name::<F>(),
                "a value of another member type"
            )
        })
    }

    /// Number of values not yet taken.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if every value was taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A type whose state maps onto columns.
///
/// Implemented by aggregates and the value objects nested in them, usually
/// through `#[derive(Aggregate)]`.
pub trait Mapped: Sized + Send + 'static {
    /// List members in declaration order.
    fn describe(members: &mut Members<Self>);

    /// Rebuild the value from its members.
    ///
    /// # Errors
    ///
    /// Propagates [`MemberValues::take`] failures.
    fn materialize(values: &mut MemberValues) -> Result<Self, MappingError>;

    /// Declarative mapping configuration.
    ///
    /// Runs before any configuration registered on the
    /// [`Mapper`](crate::Mapper), which therefore takes precedence.
    fn configure(_config: &mut AggregateConfig) {}
}

pub(crate) fn describe_members<T: Mapped>() -> Vec<MemberDef> {
    let mut members = Members::<T>::new();
    T::describe(&mut members);
    members.defs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Address, Customer};

    #[test]
    fn short_name_strips_path_and_generics() {
        assert_eq!(TypeInfo::of::<Customer>().short_name(), "Customer");
        assert_eq!(
            TypeInfo::of::<std::collections::HashMap<String, u8>>().short_name(),
            "HashMap"
        );
        assert_eq!(TypeInfo::of::<i32>().short_name(), "i32");
    }

    #[test]
    fn describe_keeps_declaration_order() {
        let names: Vec<_> = describe_members::<Customer>()
            .iter()
            .map(|def| def.name)
            .collect();
        assert_eq!(names, ["Id", "Name", "Address"]);
    }

    #[test]
    fn accessor_reads_member() {
        let customer = Customer::sample();
        let defs = describe_members::<Customer>();
        let access = defs[1].access().expect("scalar has accessor");
        let name = access
            .get(&customer)
            .and_then(|value| value.downcast_ref::<String>());
        assert_eq!(name.map(String::as_str), Some("Ada"));
        assert!(access.get(&42_i32).is_none());
    }

    #[test]
    fn optional_wrapper_round_trips() {
        let wrapper = Wrapper::optional::<Address>();
        assert!(wrapper.is_nullable());

        let absent: Option<Address> = None;
        assert!((wrapper.unwrap)(&absent).is_none());

        let wrapped = (wrapper.wrap)(Box::new(Address::sample()));
        let rebuilt = wrapped.downcast::<Option<Address>>().expect("option");
        assert_eq!(*rebuilt, Some(Address::sample()));

        let null = (wrapper.null.expect("nullable"))();
        assert!(null.downcast::<Option<Address>>().expect("option").is_none());
    }

    #[test]
    fn scalar_fallbacks_follow_scalar_trait() {
        assert!(scalar_fallback::<i32>().is_some());
        assert!(scalar_fallback::<chrono::NaiveDate>().is_none());
        assert!(none_fallback::<Address>().is_some());
    }

    #[test]
    fn take_reports_missing_and_mismatch() {
        let mut values = MemberValues::new("shop::Customer", "Address_".into());
        values.push("Street", Box::new(String::from("Main")));
        values.push("City", Box::new(5_i32));

        let street: String = values.take("Street").expect("street");
        assert_eq!(street, "Main");

        let err = values.take::<String>("Street").expect_err("taken twice");
        assert!(err.is_value_missing());
        assert!(err.to_string().contains("Address_Street"));

        let err = values.take::<String>("City").expect_err("wrong type");
        assert!(err.is_type_mismatch());
        assert!(values.is_empty());
    }
}
