// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `Mapped::configure` generation.
//!
//! Turns the declarative attributes into calls on the configuration builder,
//! the same calls `Mapper::configure` accepts fluently:
//!
//! ```rust,ignore
//! fn configure(config: &mut ::aggregate_orm::AggregateConfig) {
//!     config.table("orders");
//!     config.identity("Id");
//!     config.default_constraint("CreatedAt");
//!     config.column("Note", "note_text");
//! }
//! ```

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::AggregateDef;

/// Generate the `configure` method.
pub fn generate(def: &AggregateDef) -> TokenStream {
    let krate = &def.krate;
    let mut calls = Vec::new();

    if let Some(table) = &def.table {
        calls.push(quote! { config.table(#table); });
    }
    if let Some(view) = &def.view {
        calls.push(quote! { config.view(#view); });
    }
    if let Some(schema) = &def.schema {
        calls.push(quote! { config.schema(#schema); });
    }

    for field in def.described() {
        let name = &field.name;
        if field.key {
            calls.push(quote! { config.key(#name); });
        }
        if field.identity {
            calls.push(quote! { config.identity(#name); });
        }
        if field.default {
            calls.push(quote! { config.default_constraint(#name); });
        }
        if field.ignore {
            calls.push(quote! { config.ignore(#name); });
        }
        if let Some(column) = &field.column {
            calls.push(quote! { config.column(#name, #column); });
        }
    }

    if calls.is_empty() {
        return TokenStream::new();
    }

    quote! {
        fn configure(config: &mut #krate::AggregateConfig) {
            #(#calls)*
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_become_builder_calls() {
        let def = AggregateDef::from_derive_input(&syn::parse_quote! {
            #[aggregate(table = "orders", schema = "sales")]
            pub struct Order {
                #[aggregate(identity)]
                id: i64,
                #[aggregate(default)]
                created_at: String,
                #[aggregate(column = "note_text")]
                note: Option<String>,
                #[aggregate(ignore)]
                draft: bool,
            }
        })
        .expect("valid aggregate");
        let code = generate(&def).to_string();

        assert!(code.contains("config . table (\"orders\")"));
        assert!(code.contains("config . schema (\"sales\")"));
        assert!(code.contains("config . identity (\"Id\")"));
        assert!(code.contains("config . default_constraint (\"CreatedAt\")"));
        assert!(code.contains("config . column (\"Note\" , \"note_text\")"));
        assert!(code.contains("config . ignore (\"Draft\")"));
        assert!(!code.contains("config . view"));
    }

    #[test]
    fn nothing_declared_keeps_default() {
        let def = AggregateDef::from_derive_input(&syn::parse_quote! {
            pub struct Address {
                street: String,
            }
        })
        .expect("valid aggregate");
        assert!(generate(&def).is_empty());
    }
}
