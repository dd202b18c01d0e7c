// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Immutable metadata model of a mapped aggregate.
//!
//! Built once per aggregate type by the [extractor](crate::extract) and shared
//! read-only afterwards.
//!
//! # Structure
//!
//! ```text
//! AggregateMetadata
//! ├── entity / view / schema names
//! ├── properties: PropertyDescriptorCollection   (one per column, ordered)
//! │     └── PropertyDescriptor { name, column, kind, flags, accessor, converter }
//! ├── members: [MemberNode]                      (tree for unflattening)
//! │     ├── Simple(SimpleMember)       → properties[position]
//! │     ├── Composite(CompositeMember) → children
//! │     └── Ignored(IgnoredMember)
//! └── converters used by the properties
//! ```
//!
//! # Views
//!
//! | View | Selection |
//! |------|-----------|
//! | [`keys`](AggregateMetadata::keys) | primary key columns, identities included |
//! | [`identities`](AggregateMetadata::identities) | store-generated identity columns |
//! | [`default_constrained`](AggregateMetadata::default_constrained) | columns with store defaults |
//! | [`insertable`](AggregateMetadata::insertable) | neither identity nor default-constrained |
//! | [`updatable`](AggregateMetadata::updatable) | insertable and not a key |
//! | [`generated`](AggregateMetadata::generated) | identity or default-constrained |

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    ops::Index,
    sync::Arc
};

use indexmap::IndexMap;

use crate::{
    converter::ErasedConverter,
    error::ConfigurationError,
    mapped::{Accessor, Boxed, CompositeShape, ScalarShape, TypeInfo, Wrapper},
    value::{ScalarKind, Value}
};

/// Declared role of a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyFlags {
    /// Part of the primary key.
    pub primary_key:        bool,
    /// Value assigned by the store, never supplied on insert.
    pub identity:           bool,
    /// Column has a store default and is never written.
    pub default_constraint: bool
}

impl PropertyFlags {
    pub(crate) const fn union(self, other: Self) -> Self {
        Self {
            primary_key:        self.primary_key || other.primary_key,
            identity:           self.identity || other.identity,
            default_constraint: self.default_constraint || other.default_constraint
        }
    }
}

/// One hop from an owner to a nested value object.
#[derive(Clone)]
pub(crate) struct PathStep {
    pub(crate) access: Arc<dyn Accessor>,
    pub(crate) unwrap: for<'a> fn(&'a dyn Any) -> Option<&'a dyn Any>
}

/// Where a column value comes from.
pub(crate) enum ColumnSource {
    Scalar(ScalarShape),
    Converted {
        converter: Arc<dyn ErasedConverter>,
        wrapper:   Wrapper
    }
}

impl ColumnSource {
    fn encode(&self, member: &dyn Any) -> Option<Value> {
        match self {
            Self::Scalar(shape) => (shape.encode)(member),
            Self::Converted {
                converter,
                wrapper
            } => match (wrapper.unwrap)(member) {
                Some(inner) => converter.encode_any(inner),
                None => Some(Value::Null)
            }
        }
    }

    fn accepts_null(&self) -> bool {
        match self {
            Self::Scalar(shape) => shape.nullable,
            Self::Converted {
                converter,
                wrapper
            } => wrapper.is_nullable() || converter.primitive_nullable()
        }
    }

    fn decode(&self, value: Value) -> Result<Boxed, Value> {
        match self {
            Self::Scalar(shape) => (shape.decode)(value),
            Self::Converted {
                converter,
                wrapper
            } => match wrapper.null {
                Some(null) if value.is_null() => Ok(null()),
                _ => converter.decode_value(value).map(wrapper.wrap)
            }
        }
    }
}

/// One mapped column.
///
/// Immutable once built. [`read`](Self::read) extracts the column value from a
/// live aggregate by walking the member path from the root.
pub struct PropertyDescriptor {
    pub(crate) name:       String,
    pub(crate) column:     String,
    pub(crate) value_type: TypeInfo,
    pub(crate) kind:       ScalarKind,
    pub(crate) nullable:   bool,
    pub(crate) flags:      PropertyFlags,
    pub(crate) position:   usize,
    pub(crate) path:       Vec<PathStep>,
    pub(crate) access:     Arc<dyn Accessor>,
    pub(crate) source:     ColumnSource
}

impl PropertyDescriptor {
    /// Logical name, the `_`-joined member path.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column name in the store.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Check if the column name differs from the logical name.
    #[must_use]
    pub fn is_renamed(&self) -> bool {
        self.name != self.column
    }

    /// Declared Rust type of the member.
    #[must_use]
    pub const fn value_type(&self) -> TypeInfo {
        self.value_type
    }

    /// Column kind.
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Whether the column may hold `NULL`.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Column role.
    #[must_use]
    pub const fn flags(&self) -> PropertyFlags {
        self.flags
    }

    /// Check if the column is part of the primary key.
    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.flags.primary_key
    }

    /// Check if the column is store-generated.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.flags.identity
    }

    /// Check if the column has a store default.
    #[must_use]
    pub const fn has_default_constraint(&self) -> bool {
        self.flags.default_constraint
    }

    /// Check if the column is written on insert.
    #[must_use]
    pub const fn is_insertable(&self) -> bool {
        !self.flags.identity && !self.flags.default_constraint
    }

    /// Check if the column is written on update.
    #[must_use]
    pub const fn is_updatable(&self) -> bool {
        self.is_insertable() && !self.flags.primary_key
    }

    /// Position in the owning collection.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Converter applied to the member, if any.
    #[must_use]
    pub fn converter(&self) -> Option<&Arc<dyn ErasedConverter>> {
        match &self.source {
            ColumnSource::Converted {
                converter, ..
            } => Some(converter),
            ColumnSource::Scalar(_) => None
        }
    }

    /// Read the column value from an aggregate.
    ///
    /// An absent value object on the path yields `NULL`. Returns `None` when
    /// `aggregate` is not of the type this descriptor was built for.
    #[must_use]
    pub fn read(&self, aggregate: &dyn Any) -> Option<Value> {
        let mut owner = aggregate;
        for step in &self.path {
            let member = step.access.get(owner)?;
            match (step.unwrap)(member) {
                Some(inner) => owner = inner,
                None => return Some(Value::Null)
            }
        }
        let member = self.access.get(owner)?;
        self.source.encode(member)
    }

    pub(crate) fn decode(&self, value: Value) -> Result<Boxed, Value> {
        self.source.decode(value)
    }

    /// What the member accepts, for diagnostics.
    pub(crate) fn expected(&self) -> String {
        if self.source.accepts_null() {
            format!("{} or null", self.kind)
        } else {
            self.kind.to_string()
        }
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("value_type", &self.value_type.name())
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .field("flags", &self.flags)
            .field("position", &self.position)
            .field("converter", &self.converter())
            .finish_non_exhaustive()
    }
}

/// Ordered descriptors, unique by logical name.
///
/// Indexable by position and by logical name.
#[derive(Debug, Default)]
pub struct PropertyDescriptorCollection {
    inner: IndexMap<String, PropertyDescriptor>
}

impl PropertyDescriptorCollection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a descriptor, assigning its position.
    pub(crate) fn insert(
        &mut self,
        mut descriptor: PropertyDescriptor
    ) -> Result<usize, ConfigurationError> {
        if self.inner.contains_key(&descriptor.name) {
            return Err(ConfigurationError::DuplicateName {
                name: descriptor.name
            });
        }
        let position = self.inner.len();
        descriptor.position = position;
        self.inner.insert(descriptor.name.clone(), descriptor);
        Ok(position)
    }

    /// Descriptor by logical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.inner.get(name)
    }

    /// Descriptor by position.
    #[must_use]
    pub fn get_index(&self, position: usize) -> Option<&PropertyDescriptor> {
        self.inner.get_index(position).map(|(_, descriptor)| descriptor)
    }

    /// Position of a logical name.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.inner.get_index_of(name)
    }

    /// Check if a logical name is mapped.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Descriptors in order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.inner.values()
    }

    /// Logical names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    /// Number of descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Index<usize> for PropertyDescriptorCollection {
    type Output = PropertyDescriptor;

    fn index(&self, position: usize) -> &Self::Output {
        &self.inner[position]
    }
}

impl Index<&str> for PropertyDescriptorCollection {
    type Output = PropertyDescriptor;

    fn index(&self, name: &str) -> &Self::Output {
        &self.inner[name]
    }
}

impl<'a> IntoIterator for &'a PropertyDescriptorCollection {
    type Item = &'a PropertyDescriptor;
    type IntoIter = indexmap::map::Values<'a, String, PropertyDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.values()
    }
}

/// Classified member of an aggregate or value object.
#[derive(Debug)]
pub enum MemberNode {
    /// Maps to exactly one column.
    Simple(SimpleMember),
    /// Value object spread over prefixed columns.
    Composite(CompositeMember),
    /// Excluded from the mapping.
    Ignored(IgnoredMember)
}

impl MemberNode {
    /// Member name segment as declared.
    #[must_use]
    pub const fn member(&self) -> &'static str {
        match self {
            Self::Simple(node) => node.member,
            Self::Composite(node) => node.member,
            Self::Ignored(node) => node.member
        }
    }

    /// Logical path from the aggregate root.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Simple(node) => &node.path,
            Self::Composite(node) => &node.path,
            Self::Ignored(node) => &node.path
        }
    }
}

/// Member mapped to one column.
#[derive(Debug)]
pub struct SimpleMember {
    pub(crate) member:   &'static str,
    pub(crate) path:     String,
    pub(crate) position: usize
}

impl SimpleMember {
    /// Position of the member's descriptor.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }
}

/// Value object member.
pub struct CompositeMember {
    pub(crate) member:   &'static str,
    pub(crate) path:     String,
    pub(crate) shape:    CompositeShape,
    pub(crate) wrapper:  Wrapper,
    pub(crate) children: Vec<MemberNode>
}

impl CompositeMember {
    /// Value object type.
    #[must_use]
    pub const fn value_type(&self) -> TypeInfo {
        self.shape.ty
    }

    /// Check if the value object may be absent.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.wrapper.is_nullable()
    }

    /// Members of the value object.
    #[must_use]
    pub fn children(&self) -> &[MemberNode] {
        &self.children
    }

    /// Positions of every descriptor below this member.
    pub(crate) fn leaf_positions(&self, out: &mut Vec<usize>) {
        for child in &self.children {
            match child {
                MemberNode::Simple(node) => out.push(node.position),
                MemberNode::Composite(node) => node.leaf_positions(out),
                MemberNode::Ignored(_) => {}
            }
        }
    }
}

impl fmt::Debug for CompositeMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeMember")
            .field("member", &self.member)
            .field("path", &self.path)
            .field("value_type", &self.shape.ty.name())
            .field("nullable", &self.is_nullable())
            .field("children", &self.children)
            .finish()
    }
}

/// Member excluded from the mapping.
pub struct IgnoredMember {
    pub(crate) member:   &'static str,
    pub(crate) path:     String,
    /// Value the owner is built with; `None` for members the owner builds
    /// itself.
    pub(crate) fallback: Option<fn() -> Option<Boxed>>
}

impl fmt::Debug for IgnoredMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoredMember")
            .field("member", &self.member)
            .field("path", &self.path)
            .finish()
    }
}

/// Everything known about how one aggregate type maps to storage.
pub struct AggregateMetadata {
    pub(crate) aggregate:          TypeInfo,
    pub(crate) entity_name:        String,
    pub(crate) view_name:          Option<String>,
    pub(crate) schema:             Option<String>,
    pub(crate) properties:         PropertyDescriptorCollection,
    pub(crate) members:            Vec<MemberNode>,
    pub(crate) ignored:            Vec<String>,
    pub(crate) value_object_roots: Vec<String>,
    pub(crate) converters:         HashMap<TypeId, Arc<dyn ErasedConverter>>
}

impl AggregateMetadata {
    /// Aggregate type.
    #[must_use]
    pub const fn aggregate_type(&self) -> TypeInfo {
        self.aggregate
    }

    /// Table name.
    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// View selects read from, if configured.
    #[must_use]
    pub fn view_name(&self) -> Option<&str> {
        self.view_name.as_deref()
    }

    /// Relation selects read from: the view, else the table.
    #[must_use]
    pub fn read_source(&self) -> &str {
        self.view_name.as_deref().unwrap_or(&self.entity_name)
    }

    /// Schema qualifying table and view.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// All descriptors.
    #[must_use]
    pub const fn properties(&self) -> &PropertyDescriptorCollection {
        &self.properties
    }

    /// Descriptor by logical name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    /// Classified member tree of the root.
    #[must_use]
    pub fn members(&self) -> &[MemberNode] {
        &self.members
    }

    /// Logical paths excluded from the mapping.
    #[must_use]
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Top-level value object members.
    #[must_use]
    pub fn value_object_roots(&self) -> &[String] {
        &self.value_object_roots
    }

    /// Primary key columns.
    pub fn keys(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.is_primary_key())
    }

    /// Identity columns.
    pub fn identities(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.is_identity())
    }

    /// Default-constrained columns.
    pub fn default_constrained(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.has_default_constraint())
    }

    /// Columns written on insert.
    pub fn insertable(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.is_insertable())
    }

    /// Columns written on update.
    pub fn updatable(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.is_updatable())
    }

    /// Columns whose value the store assigns.
    pub fn generated(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| !p.is_insertable())
    }

    /// Check if any key is declared.
    #[must_use]
    pub fn has_keys(&self) -> bool {
        self.keys().next().is_some()
    }

    /// Converter used for the domain type `id`.
    #[must_use]
    pub fn converter(&self, id: TypeId) -> Option<&Arc<dyn ErasedConverter>> {
        self.converters.get(&id)
    }

    /// Converters used by this aggregate.
    pub fn converters(&self) -> impl Iterator<Item = &Arc<dyn ErasedConverter>> {
        self.converters.values()
    }
}

impl fmt::Debug for AggregateMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateMetadata")
            .field("aggregate", &self.aggregate.name())
            .field("entity_name", &self.entity_name)
            .field("view_name", &self.view_name)
            .field("schema", &self.schema)
            .field("properties", &self.properties)
            .field("ignored", &self.ignored)
            .field("value_object_roots", &self.value_object_roots)
            .finish_non_exhaustive()
    }
}
