// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Aggregate-level attribute parsing with darling.
//!
//! # Supported Attributes
//!
//! | Attribute | Required | Default | Description |
//! |-----------|----------|---------|-------------|
//! | `table` | No | type name | Table written to |
//! | `view` | No | — | View selects read from |
//! | `schema` | No | — | Schema qualifying table and view |
//! | `rename_all` | No | `"PascalCase"` | Rule turning field names into member names |
//! | `crate` | No | `::aggregate_orm` | Path of the runtime crate |

use darling::FromDeriveInput;
use syn::{Generics, Ident};

use crate::utils::case::RenameRule;

/// Path the generated code uses for the runtime crate.
pub fn default_crate_path() -> syn::Path {
    syn::parse_quote!(::aggregate_orm)
}

/// Aggregate-level attributes parsed from `#[aggregate(...)]`.
///
/// ```rust,ignore
/// #[aggregate(table = "orders", schema = "sales", view = "order_summaries")]
/// ```
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(aggregate), supports(struct_named))]
pub struct ContainerAttrs {
    /// Struct identifier.
    pub ident: Ident,

    /// Struct generics.
    pub generics: Generics,

    /// Table name.
    #[darling(default)]
    pub table: Option<String>,

    /// View name.
    #[darling(default)]
    pub view: Option<String>,

    /// Schema name.
    #[darling(default)]
    pub schema: Option<String>,

    /// Member naming rule.
    #[darling(default)]
    pub rename_all: RenameRule,

    /// Runtime crate path, for crates re-exporting `aggregate-orm`.
    #[darling(rename = "crate", default = "default_crate_path")]
    pub krate: syn::Path
}
