// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field-level attribute parsing.
//!
//! # Supported Attributes
//!
//! | Attribute | Effect |
//! |-----------|--------|
//! | `#[aggregate(key)]` | Primary key column(s) |
//! | `#[aggregate(identity)]` | Store-assigned key, never inserted |
//! | `#[aggregate(default)]` | Store default, never inserted or updated |
//! | `#[aggregate(ignore)]` | Described but not mapped; rebuilt from the type's fallback |
//! | `#[aggregate(skip)]` | Not described at all; rebuilt with `Default::default()` |
//! | `#[aggregate(value_object)]` | Nested `Mapped` type flattened into prefixed columns |
//! | `#[aggregate(convert)]` | Stored through a registered type converter |
//! | `#[aggregate(rename = "X")]` | Member name instead of the `rename_all` result |
//! | `#[aggregate(column = "x")]` | Column name differing from the logical name |
//!
//! `Option<T>` fields are nullable. With `value_object` or `convert` the
//! wrapped `T` is the nested or converted type.

use darling::FromField;
use syn::{Ident, Type};

use crate::utils::{case::RenameRule, types::option_inner};

/// Field attributes parsed from `#[aggregate(...)]`.
#[derive(Debug, FromField)]
#[darling(attributes(aggregate))]
pub struct FieldAttrs {
    /// Field identifier.
    pub ident: Option<Ident>,

    /// Field type.
    pub ty: Type,

    #[darling(default)]
    pub key: bool,

    #[darling(default)]
    pub identity: bool,

    #[darling(default)]
    pub default: bool,

    #[darling(default)]
    pub ignore: bool,

    #[darling(default)]
    pub skip: bool,

    #[darling(default)]
    pub value_object: bool,

    #[darling(default)]
    pub convert: bool,

    #[darling(default)]
    pub rename: Option<String>,

    #[darling(default)]
    pub column: Option<String>
}

/// How a member is described to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberShape {
    /// Single column of a `Scalar` type, `Option<S>` included.
    Scalar,
    /// Nested value object.
    ValueObject {
        /// Whether the field is `Option<T>`.
        optional: bool
    },
    /// Strong type stored through a converter.
    Converted {
        /// Whether the field is `Option<T>`.
        optional: bool
    },
    /// Never described.
    Skipped
}

/// One parsed field.
#[derive(Debug)]
pub struct FieldDef {
    /// Field identifier.
    pub ident: Ident,

    /// Field type as written.
    pub ty: Type,

    /// Member name segment.
    pub name: String,

    /// Description shape.
    pub shape: MemberShape,

    /// Declared as a key.
    pub key: bool,

    /// Declared as an identity.
    pub identity: bool,

    /// Declared as default-constrained.
    pub default: bool,

    /// Declared as ignored.
    pub ignore: bool,

    /// Column override.
    pub column: Option<String>
}

impl FieldDef {
    /// Validate parsed attributes and derive the member name.
    ///
    /// # Errors
    ///
    /// - unnamed field
    /// - `skip` combined with any other attribute
    /// - `value_object` combined with `convert`
    /// - `key` or `identity` combined with `ignore`
    /// - `column` on a value object
    pub fn from_attrs(attrs: FieldAttrs, rename_all: RenameRule) -> darling::Result<Self> {
        let ident = attrs.ident.clone().ok_or_else(|| {
            darling::Error::custom("Aggregate fields must be named").with_span(&attrs.ty)
        })?;

        let declared = attrs.key
            || attrs.identity
            || attrs.default
            || attrs.ignore
            || attrs.value_object
            || attrs.convert
            || attrs.rename.is_some()
            || attrs.column.is_some();
        if attrs.skip && declared {
            return Err(
                darling::Error::custom("`skip` cannot be combined with other attributes")
                    .with_span(&ident)
            );
        }
        if attrs.value_object && attrs.convert {
            return Err(darling::Error::custom(
                "`value_object` and `convert` are mutually exclusive"
            )
            .with_span(&ident));
        }
        if attrs.ignore && (attrs.key || attrs.identity) {
            return Err(darling::Error::custom(
                "an ignored member cannot be a key; drop `ignore` or `key`/`identity`"
            )
            .with_span(&ident));
        }
        if attrs.value_object && attrs.column.is_some() {
            return Err(darling::Error::custom(
                "a value object spans several columns; set `column` on its own fields"
            )
            .with_span(&ident));
        }

        let optional = option_inner(&attrs.ty).is_some();
        let shape = if attrs.skip {
            MemberShape::Skipped
        } else if attrs.value_object {
            MemberShape::ValueObject {
                optional
            }
        } else if attrs.convert {
            MemberShape::Converted {
                optional
            }
        } else {
            MemberShape::Scalar
        };

        let name = attrs
            .rename
            .clone()
            .unwrap_or_else(|| rename_all.apply(&ident.to_string()));

        Ok(Self {
            ident,
            ty: attrs.ty,
            name,
            shape,
            key: attrs.key,
            identity: attrs.identity,
            default: attrs.default,
            ignore: attrs.ignore,
            column: attrs.column
        })
    }

    /// Type handed to the runtime: `T` for optional value objects and
    /// converted members, the field type otherwise.
    #[must_use]
    pub fn described_ty(&self) -> &Type {
        match self.shape {
            MemberShape::ValueObject {
                optional: true
            }
            | MemberShape::Converted {
                optional: true
            } => option_inner(&self.ty).unwrap_or(&self.ty),
            _ => &self.ty
        }
    }

    /// Check if the field is described to the runtime.
    #[must_use]
    pub fn is_described(&self) -> bool {
        self.shape != MemberShape::Skipped
    }
}
