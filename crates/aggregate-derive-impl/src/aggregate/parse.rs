// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Parsing of `#[derive(Aggregate)]` input.
//!
//! # Module Structure
//!
//! ```text
//! parse/
//! ├── container.rs — #[aggregate(...)] on the struct
//! └── field.rs     — #[aggregate(...)] on fields
//! ```

mod container;
mod field;

pub use container::{ContainerAttrs, default_crate_path};
use darling::{FromDeriveInput, FromField};
pub use field::{FieldAttrs, FieldDef, MemberShape};
use syn::{DeriveInput, Generics, Ident};

/// Complete parsed aggregate definition, passed to every generator.
#[derive(Debug)]
pub struct AggregateDef {
    /// Struct identifier.
    pub ident: Ident,

    /// Struct generics.
    pub generics: Generics,

    /// Table name, if declared.
    pub table: Option<String>,

    /// View name, if declared.
    pub view: Option<String>,

    /// Schema name, if declared.
    pub schema: Option<String>,

    /// Runtime crate path.
    pub krate: syn::Path,

    /// Fields in declaration order.
    pub fields: Vec<FieldDef>
}

impl AggregateDef {
    /// Parse from syn's `DeriveInput`.
    ///
    /// Field errors are accumulated so every bad field is reported at once.
    ///
    /// # Errors
    ///
    /// - applied to an enum, union, tuple or unit struct
    /// - unknown or contradicting attributes
    pub fn from_derive_input(input: &DeriveInput) -> darling::Result<Self> {
        let attrs = ContainerAttrs::from_derive_input(input)?;

        let syn::Data::Struct(data) = &input.data else {
            return Err(
                darling::Error::custom("Aggregate can only be derived for structs")
                    .with_span(&input.ident)
            );
        };
        let syn::Fields::Named(named) = &data.fields else {
            return Err(
                darling::Error::custom("Aggregate requires named fields").with_span(&input.ident)
            );
        };

        let mut errors = darling::Error::accumulator();
        let fields: Vec<FieldDef> = named
            .named
            .iter()
            .filter_map(|field| {
                errors.handle(
                    FieldAttrs::from_field(field)
                        .and_then(|parsed| FieldDef::from_attrs(parsed, attrs.rename_all))
                )
            })
            .collect();
        errors.finish()?;

        if !fields.iter().any(FieldDef::is_described) {
            return Err(darling::Error::custom(
                "Aggregate must have at least one field that is not skipped"
            )
            .with_span(&input.ident));
        }

        Ok(Self {
            ident: attrs.ident,
            generics: attrs.generics,
            table: attrs.table,
            view: attrs.view,
            schema: attrs.schema,
            krate: attrs.krate,
            fields
        })
    }

    /// Fields described to the runtime.
    pub fn described(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_described())
    }
}
