// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Hand-written aggregates shared by unit tests.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::{
    AggregateConfig, Flatten, Flattened, Mapped, Mapper, MappingError, MemberValues, Members
};

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city:   String
}

impl Address {
    pub fn sample() -> Self {
        Self {
            street: "Main".into(),
            city:   "Springfield".into()
        }
    }
}

impl Mapped for Address {
    fn describe(members: &mut Members<Self>) {
        members
            .scalar::<String>("Street", |a| &a.street)
            .scalar::<String>("City", |a| &a.city);
    }

    fn materialize(values: &mut MemberValues) -> Result<Self, MappingError> {
        Ok(Self {
            street: values.take("Street")?,
            city:   values.take("City")?
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id:      i32,
    pub name:    String,
    pub address: Option<Address>
}

impl Customer {
    pub fn sample() -> Self {
        Self {
            id:      1,
            name:    "Ada".into(),
            address: Some(Address::sample())
        }
    }
}

impl Mapped for Customer {
    fn describe(members: &mut Members<Self>) {
        members
            .scalar::<i32>("Id", |c| &c.id)
            .scalar::<String>("Name", |c| &c.name)
            .optional_value_object::<Address>("Address", |c| &c.address);
    }

    fn materialize(values: &mut MemberValues) -> Result<Self, MappingError> {
        Ok(Self {
            id:      values.take("Id")?,
            name:    values.take("Name")?,
            address: values.take("Address")?
        })
    }

    fn configure(config: &mut AggregateConfig) {
        config.table("Customers").key("Id");
    }
}

impl Flatten for Customer {
    fn flatten(&self, mapper: &Mapper) -> Result<Flattened, MappingError> {
        mapper.to_row(self).map(Flattened::Row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderId(pub i64);

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id:         OrderId,
    pub total:      Decimal,
    pub note:       Option<String>,
    pub created_at: NaiveDateTime
}

impl Order {
    pub fn sample() -> Self {
        Self {
            id:         OrderId(42),
            total:      Decimal::new(1999, 2),
            note:       None,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 2)
                .and_then(|d| d.and_hms_opt(3, 4, 5))
                .unwrap_or_default()
        }
    }
}

impl Mapped for Order {
    fn describe(members: &mut Members<Self>) {
        members
            .converted::<OrderId>("Id", |o| &o.id)
            .scalar::<Decimal>("Total", |o| &o.total)
            .scalar::<Option<String>>("Note", |o| &o.note)
            .scalar::<NaiveDateTime>("CreatedAt", |o| &o.created_at);
    }

    fn materialize(values: &mut MemberValues) -> Result<Self, MappingError> {
        Ok(Self {
            id:         values.take("Id")?,
            total:      values.take("Total")?,
            note:       values.take("Note")?,
            created_at: values.take("CreatedAt")?
        })
    }

    fn configure(config: &mut AggregateConfig) {
        config
            .table("Orders")
            .identity("Id")
            .default_constraint("CreatedAt");
    }
}

/// Metadata of `T` with the order id converter registered and `configure`
/// applied on top of the declarative configuration.
pub fn metadata<T: Mapped>(
    configure: impl FnOnce(&mut AggregateConfig)
) -> crate::AggregateMetadata {
    let registry = crate::ConverterRegistry::new();
    registry.register::<OrderId, i64>(|id| id.0, OrderId);
    let mut config = AggregateConfig::default();
    configure(&mut config);
    let overrides = std::collections::HashMap::from([(std::any::TypeId::of::<T>(), config)]);
    crate::extract::extract::<T>(&registry, &overrides).unwrap_or_else(|err| panic!("{err}"))
}
