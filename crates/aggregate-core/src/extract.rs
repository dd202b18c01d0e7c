// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Metadata extraction.
//!
//! [`extract`] walks the member list of an aggregate, classifies each member
//! and produces an [`AggregateMetadata`]. It is a pure function of the type's
//! description, its configuration and the registered converters; the
//! [`Mapper`](crate::Mapper) memoizes the result per type.
//!
//! # Classification
//!
//! ```text
//! member ──► ignored / skipped? ─yes─► Ignored
//!               │ no
//!               ▼
//!            converter for exact type? ─yes─► Simple (converter's primitive)
//!               │ no
//!               ▼
//!            scalar ─────────► Simple
//!            value object ───► Composite, recurse with "<path>_"
//!            converted ──────► error: missing converter
//! ```
//!
//! Declarations on a value object path apply to every column below it, so a
//! key declared on a composite id yields a composite key.

use std::{
    any::TypeId,
    collections::{HashMap, HashSet},
    mem,
    sync::Arc
};

use tracing::debug;

use crate::{
    config::AggregateConfig,
    converter::{ConverterRegistry, ErasedConverter},
    error::{ConfigurationError, MappingError},
    mapped::{Mapped, MemberDef, MemberKind, TypeInfo, describe_members},
    metadata::{
        AggregateMetadata, ColumnSource, CompositeMember, IgnoredMember, MemberNode, PathStep,
        PropertyDescriptor, PropertyDescriptorCollection, PropertyFlags, SimpleMember
    }
};

/// Build the metadata of `T`.
///
/// The declarative configuration of `T` (and of every nested value object)
/// is applied first, then the matching entries of `overrides`.
///
/// # Errors
///
/// [`MappingError::Configuration`] when the mapping is structurally invalid:
/// no columns, duplicate logical or column names, declarations naming unknown
/// members, contradicting declarations, ignored members that cannot be
/// constructed, or opaque members without a converter.
pub fn extract<T: Mapped>(
    converters: &ConverterRegistry,
    overrides: &HashMap<TypeId, AggregateConfig>
) -> Result<AggregateMetadata, MappingError> {
    let aggregate = TypeInfo::of::<T>();
    let fail = |source| MappingError::configuration(aggregate.name(), source);

    let mut config = AggregateConfig::default();
    T::configure(&mut config);
    if let Some(overlay) = overrides.get(&aggregate.id()) {
        config.merge(overlay.clone());
    }

    let mut builder = Builder {
        converters,
        overrides,
        config,
        properties: PropertyDescriptorCollection::new(),
        visited: HashSet::new(),
        ignored: Vec::new(),
        roots: Vec::new(),
        used: HashMap::new()
    };
    let members = builder
        .members(describe_members::<T>(), "", &[], Inherited::default())
        .map_err(fail)?;
    builder.validate().map_err(fail)?;

    let Builder {
        config,
        properties,
        ignored,
        roots,
        used,
        ..
    } = builder;
    let metadata = AggregateMetadata {
        aggregate,
        entity_name: config
            .table_name()
            .unwrap_or_else(|| aggregate.short_name())
            .to_owned(),
        view_name: config.view_name().map(str::to_owned),
        schema: config.schema_name().map(str::to_owned),
        properties,
        members,
        ignored,
        value_object_roots: roots,
        converters: used
    };
    debug!(
        aggregate = aggregate.name(),
        columns = metadata.properties.len(),
        keys = metadata.keys().count(),
        "aggregate metadata extracted"
    );
    Ok(metadata)
}

/// State handed down from enclosing value objects.
#[derive(Clone, Copy, Default)]
struct Inherited {
    flags:    PropertyFlags,
    nullable: bool
}

struct Builder<'a> {
    converters: &'a ConverterRegistry,
    overrides:  &'a HashMap<TypeId, AggregateConfig>,
    config:     AggregateConfig,
    properties: PropertyDescriptorCollection,
    visited:    HashSet<String>,
    ignored:    Vec<String>,
    roots:      Vec<String>,
    used:       HashMap<TypeId, Arc<dyn ErasedConverter>>
}

impl Builder<'_> {
    fn members(
        &mut self,
        defs: Vec<MemberDef>,
        prefix: &str,
        steps: &[PathStep],
        inherited: Inherited
    ) -> Result<Vec<MemberNode>, ConfigurationError> {
        let mut nodes = Vec::with_capacity(defs.len());
        for def in defs {
            let path = format!("{prefix}{}", def.name);
            if !self.visited.insert(path.clone()) {
                return Err(ConfigurationError::DuplicateName {
                    name: path
                });
            }
            let flags = inherited.flags.union(self.declared_flags(&path));
            let ignored = matches!(def.kind, MemberKind::Skipped)
                || self.config.ignored().contains(&path);

            let node = if ignored {
                self.ignored(&def, path, flags)?
            } else if let Some(converter) = self.converters.get(def.ty.id()) {
                self.converted(&def, path, steps, flags, inherited, converter)?
            } else {
                self.classified(def, path, steps, flags, inherited, prefix.is_empty())?
            };
            nodes.push(node);
        }
        Ok(nodes)
    }

    fn classified(
        &mut self,
        def: MemberDef,
        path: String,
        steps: &[PathStep],
        flags: PropertyFlags,
        inherited: Inherited,
        top_level: bool
    ) -> Result<MemberNode, ConfigurationError> {
        match def.kind {
            MemberKind::Scalar {
                access,
                shape
            } => {
                let descriptor = PropertyDescriptor {
                    name: path.clone(),
                    column: self.column(&path),
                    value_type: def.ty,
                    kind: shape.kind,
                    nullable: inherited.nullable || shape.nullable,
                    flags,
                    position: 0,
                    path: steps.to_vec(),
                    access,
                    source: ColumnSource::Scalar(shape)
                };
                self.simple(def.name, path, descriptor)
            }
            MemberKind::ValueObject {
                access,
                shape,
                wrapper
            } => {
                if self.config.column_for(&path).is_some() {
                    return Err(ConfigurationError::Conflict {
                        member: path,
                        reason: "is a value object and cannot be renamed to a single column"
                    });
                }
                let nested_prefix = format!("{path}_");
                self.adopt_nested(shape.configure, shape.ty.id(), &nested_prefix);

                let mut nested_steps = steps.to_vec();
                nested_steps.push(PathStep {
                    access,
                    unwrap: wrapper.unwrap
                });
                let children = self.members(
                    (shape.describe)(),
                    &nested_prefix,
                    &nested_steps,
                    Inherited {
                        flags,
                        nullable: inherited.nullable || wrapper.is_nullable()
                    }
                )?;
                if top_level {
                    self.roots.push(path.clone());
                }
                Ok(MemberNode::Composite(CompositeMember {
                    member: def.name,
                    path,
                    shape,
                    wrapper,
                    children
                }))
            }
            MemberKind::Converted { .. } => Err(ConfigurationError::MissingConverter {
                member: path,
                ty:     def.ty.name()
            }),
            MemberKind::Skipped => self.ignored(&def, path, flags)
        }
    }

    fn converted(
        &mut self,
        def: &MemberDef,
        path: String,
        steps: &[PathStep],
        flags: PropertyFlags,
        inherited: Inherited,
        converter: Arc<dyn ErasedConverter>
    ) -> Result<MemberNode, ConfigurationError> {
        let Some(access) = def.access() else {
            return self.ignored(def, path, flags);
        };
        let wrapper = def.wrapper();
        self.used.insert(def.ty.id(), Arc::clone(&converter));
        let descriptor = PropertyDescriptor {
            name: path.clone(),
            column: self.column(&path),
            value_type: def.ty,
            kind: converter.primitive_kind(),
            nullable: inherited.nullable
                || wrapper.is_nullable()
                || converter.primitive_nullable(),
            flags,
            position: 0,
            path: steps.to_vec(),
            access: Arc::clone(access),
            source: ColumnSource::Converted {
                converter,
                wrapper
            }
        };
        self.simple(def.name, path, descriptor)
    }

    fn simple(
        &mut self,
        member: &'static str,
        path: String,
        descriptor: PropertyDescriptor
    ) -> Result<MemberNode, ConfigurationError> {
        if descriptor.flags.identity && descriptor.flags.default_constraint {
            return Err(ConfigurationError::Conflict {
                member: path,
                reason: "cannot be both an identity and default-constrained"
            });
        }
        let position = self.properties.insert(descriptor)?;
        Ok(MemberNode::Simple(SimpleMember {
            member,
            path,
            position
        }))
    }

    fn ignored(
        &mut self,
        def: &MemberDef,
        path: String,
        flags: PropertyFlags
    ) -> Result<MemberNode, ConfigurationError> {
        if flags.primary_key {
            return Err(ConfigurationError::Conflict {
                member: path,
                reason: "cannot be both a key and ignored"
            });
        }
        let fallback = match def.kind {
            MemberKind::Skipped => None,
            _ if (def.fallback)().is_some() => Some(def.fallback),
            _ => {
                return Err(ConfigurationError::NotIgnorable {
                    member: path
                });
            }
        };
        self.ignored.push(path.clone());
        Ok(MemberNode::Ignored(IgnoredMember {
            member: def.name,
            path,
            fallback
        }))
    }

    /// Merge a value object's own configuration under `prefix`.
    ///
    /// Declarations already present, i.e. made on the enclosing aggregate,
    /// keep precedence.
    fn adopt_nested(
        &mut self,
        configure: fn(&mut AggregateConfig),
        ty: TypeId,
        prefix: &str
    ) {
        let mut nested = AggregateConfig::default();
        configure(&mut nested);
        if let Some(overlay) = self.overrides.get(&ty) {
            nested.merge(overlay.clone());
        }
        let mut merged = nested.prefixed(prefix);
        merged.merge(mem::take(&mut self.config));
        self.config = merged;
    }

    fn declared_flags(&self, path: &str) -> PropertyFlags {
        let declared = |paths: &[String]| paths.iter().any(|p| p == path);
        PropertyFlags {
            primary_key:        declared(self.config.keys()) || declared(self.config.identities()),
            identity:           declared(self.config.identities()),
            default_constraint: declared(self.config.default_constraints())
        }
    }

    fn column(&self, path: &str) -> String {
        self.config
            .column_for(path)
            .map_or_else(|| path.to_owned(), str::to_owned)
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(unknown) = self
            .config
            .declared_paths()
            .find(|path| !self.visited.contains(*path))
        {
            return Err(ConfigurationError::UnknownMember {
                member: unknown.to_owned()
            });
        }
        if self.properties.is_empty() {
            return Err(ConfigurationError::NoColumns);
        }
        if let Some(second) = self.properties.iter().filter(|p| p.is_identity()).nth(1) {
            return Err(ConfigurationError::Conflict {
                member: second.name().to_owned(),
                reason: "is a second identity column, at most one is allowed"
            });
        }
        let mut columns = HashSet::with_capacity(self.properties.len());
        for property in &self.properties {
            if !columns.insert(property.column()) {
                return Err(ConfigurationError::DuplicateColumn {
                    column: property.column().to_owned()
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::any::type_name;

    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::{
        fixtures::{Address, Customer, Order, OrderId},
        mapped::{MemberValues, Members},
        value::{ScalarKind, Value}
    };

    struct Money {
        amount:   Decimal,
        currency: String
    }

    impl Mapped for Money {
        fn describe(members: &mut Members<Self>) {
            members
                .scalar::<Decimal>("Amount", |m| &m.amount)
                .scalar::<String>("Currency", |m| &m.currency);
        }

        fn materialize(values: &mut MemberValues) -> Result<Self, MappingError> {
            Ok(Self {
                amount:   values.take("Amount")?,
                currency: values.take("Currency")?
            })
        }

        fn configure(config: &mut AggregateConfig) {
            config.column("Currency", "Ccy");
        }
    }

    struct Invoice {
        id:    Uuid,
        net:   Money,
        gross: Money,
        memo:  String
    }

    impl Mapped for Invoice {
        fn describe(members: &mut Members<Self>) {
            members
                .scalar::<Uuid>("Id", |i| &i.id)
                .value_object::<Money>("Net", |i| &i.net)
                .value_object::<Money>("Gross", |i| &i.gross)
                .skipped::<String>("Memo");
        }

        fn materialize(values: &mut MemberValues) -> Result<Self, MappingError> {
            Ok(Self {
                id:    values.take("Id")?,
                net:   values.take("Net")?,
                gross: values.take("Gross")?,
                memo:  String::new()
            })
        }
    }

    struct Clash {
        street:  String,
        address: Address
    }

    impl Mapped for Clash {
        fn describe(members: &mut Members<Self>) {
            members
                .scalar::<String>("Address_Street", |c| &c.street)
                .value_object::<Address>("Address", |c| &c.address);
        }

        fn materialize(values: &mut MemberValues) -> Result<Self, MappingError> {
            Ok(Self {
                street:  values.take("Address_Street")?,
                address: values.take("Address")?
            })
        }
    }

    struct Blank;

    impl Mapped for Blank {
        fn describe(members: &mut Members<Self>) {
            members.skipped::<()>("Nothing");
        }

        fn materialize(_values: &mut MemberValues) -> Result<Self, MappingError> {
            Ok(Self)
        }
    }

    fn plain<T: Mapped>() -> Result<AggregateMetadata, MappingError> {
        extract::<T>(&ConverterRegistry::new(), &HashMap::new())
    }

    fn with<T: Mapped>(
        configure: impl FnOnce(&mut AggregateConfig)
    ) -> Result<AggregateMetadata, MappingError> {
        let mut config = AggregateConfig::default();
        configure(&mut config);
        let overrides = HashMap::from([(TypeId::of::<T>(), config)]);
        extract::<T>(&ConverterRegistry::new(), &overrides)
    }

    fn config_error(result: Result<AggregateMetadata, MappingError>) -> ConfigurationError {
        result
            .expect_err("extraction fails")
            .as_configuration()
            .cloned()
            .expect("configuration error")
    }

    fn names(metadata: &AggregateMetadata) -> Vec<&str> {
        metadata.properties().names().collect()
    }

    #[test]
    fn nested_members_are_prefixed() {
        let metadata = plain::<Customer>().expect("customer maps");
        assert_eq!(names(&metadata), ["Id", "Name", "Address_Street", "Address_City"]);
        assert_eq!(metadata.entity_name(), "Customers");
        assert_eq!(metadata.value_object_roots(), ["Address"]);
        assert!(metadata.properties()["Address_City"].is_nullable());
        assert!(!metadata.properties()["Name"].is_nullable());
    }

    #[test]
    fn entity_name_defaults_to_type_name() {
        let metadata = plain::<Invoice>().expect("invoice maps");
        assert_eq!(metadata.entity_name(), "Invoice");
        assert_eq!(metadata.read_source(), "Invoice");
    }

    #[test]
    fn repeated_value_object_gets_own_prefix_and_config() {
        let metadata = plain::<Invoice>().expect("invoice maps");
        assert_eq!(
            names(&metadata),
            ["Id", "Net_Amount", "Net_Currency", "Gross_Amount", "Gross_Currency"]
        );
        assert_eq!(metadata.properties()["Net_Currency"].column(), "Net_Ccy");
        assert_eq!(metadata.properties()["Gross_Currency"].column(), "Gross_Ccy");
        assert_eq!(metadata.ignored(), ["Memo"]);
        assert_eq!(metadata.value_object_roots(), ["Net", "Gross"]);
    }

    #[test]
    fn enclosing_declarations_win_over_nested() {
        let metadata = with::<Invoice>(|c| {
            c.column("Net_Currency", "NetCurrency");
        })
        .expect("invoice maps");
        assert_eq!(metadata.properties()["Net_Currency"].column(), "NetCurrency");
        assert_eq!(metadata.properties()["Gross_Currency"].column(), "Gross_Ccy");
    }

    #[test]
    fn overrides_for_nested_types_apply() {
        let mut money = AggregateConfig::default();
        money.column("Amount", "Amt");
        let overrides = HashMap::from([(TypeId::of::<Money>(), money)]);
        let metadata =
            extract::<Invoice>(&ConverterRegistry::new(), &overrides).expect("invoice maps");
        assert_eq!(metadata.properties()["Net_Amount"].column(), "Net_Amt");
    }

    #[test]
    fn key_on_value_object_spans_its_columns() {
        let metadata = with::<Invoice>(|c| {
            c.key("Net");
        })
        .expect("invoice maps");
        let keys: Vec<_> = metadata.keys().map(|p| p.name()).collect();
        assert_eq!(keys, ["Net_Amount", "Net_Currency"]);
    }

    #[test]
    fn duplicate_logical_names_fail() {
        assert_eq!(
            config_error(plain::<Clash>()),
            ConfigurationError::DuplicateName {
                name: "Address_Street".into()
            }
        );
    }

    #[test]
    fn duplicate_columns_fail() {
        let err = config_error(with::<Customer>(|c| {
            c.column("Name", "Id");
        }));
        assert_eq!(
            err,
            ConfigurationError::DuplicateColumn {
                column: "Id".into()
            }
        );
    }

    #[test]
    fn aggregate_without_columns_fails() {
        assert_eq!(config_error(plain::<Blank>()), ConfigurationError::NoColumns);
    }

    #[test]
    fn unknown_member_fails() {
        assert_eq!(
            config_error(with::<Customer>(|c| {
                c.key("Nope");
            })),
            ConfigurationError::UnknownMember {
                member: "Nope".into()
            }
        );
    }

    #[test]
    fn opaque_member_requires_converter() {
        assert_eq!(
            config_error(plain::<Order>()),
            ConfigurationError::MissingConverter {
                member: "Id".into(),
                ty:     type_name::<OrderId>()
            }
        );
    }

    #[test]
    fn converter_turns_value_object_into_column() {
        let registry = ConverterRegistry::new();
        registry.register::<Address, String>(
            |a| format!("{}|{}", a.street, a.city),
            |raw| {
                let (street, city) = raw.split_once('|').unwrap_or((raw.as_str(), ""));
                Address {
                    street: street.to_owned(),
                    city:   city.to_owned()
                }
            }
        );
        let metadata = extract::<Customer>(&registry, &HashMap::new()).expect("customer maps");
        assert_eq!(names(&metadata), ["Id", "Name", "Address"]);

        let address = &metadata.properties()["Address"];
        assert_eq!(address.kind(), ScalarKind::Text);
        assert!(address.is_nullable());
        assert!(address.converter().is_some());
        assert!(metadata.value_object_roots().is_empty());
        assert_eq!(
            address.read(&Customer::sample()),
            Some(Value::Text("Main|Springfield".into()))
        );
    }

    #[test]
    fn identity_and_default_conflict() {
        let err = config_error(with::<Customer>(|c| {
            c.identity("Id").default_constraint("Id");
        }));
        assert!(matches!(err, ConfigurationError::Conflict { ref member, .. } if member == "Id"));
    }

    #[test]
    fn ignored_key_conflicts() {
        let err = config_error(with::<Customer>(|c| {
            c.ignore("Id");
        }));
        assert!(matches!(err, ConfigurationError::Conflict { .. }));
    }

    #[test]
    fn identity_over_several_columns_conflicts() {
        let err = config_error(with::<Invoice>(|c| {
            c.identity("Net");
        }));
        assert_eq!(
            err,
            ConfigurationError::Conflict {
                member: "Net_Currency".into(),
                reason: "is a second identity column, at most one is allowed"
            }
        );
    }

    #[test]
    fn renaming_value_object_conflicts() {
        let err = config_error(with::<Customer>(|c| {
            c.column("Address", "addr");
        }));
        assert!(matches!(err, ConfigurationError::Conflict { ref member, .. } if member == "Address"));
    }

    #[test]
    fn ignoring_requires_fallback() {
        let registry = ConverterRegistry::new();
        registry.register::<OrderId, i64>(|id| id.0, OrderId);
        let mut order = AggregateConfig::default();
        order.ignore("CreatedAt");
        let overrides = HashMap::from([(TypeId::of::<Order>(), order)]);
        assert_eq!(
            config_error(extract::<Order>(&registry, &overrides)),
            ConfigurationError::NotIgnorable {
                member: "CreatedAt".into()
            }
        );
    }

    #[test]
    fn ignored_members_leave_the_mapping() {
        let metadata = with::<Customer>(|c| {
            c.ignore("Name").ignore("Address");
        })
        .expect("customer maps");
        assert_eq!(names(&metadata), ["Id"]);
        assert_eq!(metadata.ignored(), ["Name", "Address"]);
        assert!(metadata.value_object_roots().is_empty());
    }

    #[test]
    fn schema_and_view_come_from_config() {
        let metadata = with::<Customer>(|c| {
            c.schema("sales").view("CustomerView");
        })
        .expect("customer maps");
        assert_eq!(metadata.schema(), Some("sales"));
        assert_eq!(metadata.view_name(), Some("CustomerView"));
        assert_eq!(metadata.entity_name(), "Customers");
        assert_eq!(metadata.read_source(), "CustomerView");
    }
}
