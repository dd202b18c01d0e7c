// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `Mapped::describe` generation.
//!
//! # Generated Code
//!
//! ```rust,ignore
//! fn describe(members: &mut ::aggregate_orm::Members<Self>) {
//!     members.scalar::<i32>("Id", |this| &this.id);
//!     members.optional_value_object::<Address>("Address", |this| &this.address);
//!     members.converted::<OrderId>("Order", |this| &this.order);
//! }
//! ```

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::{AggregateDef, FieldDef, MemberShape};

/// Generate the `describe` method.
pub fn generate(def: &AggregateDef) -> TokenStream {
    let krate = &def.krate;
    let calls = def.fields.iter().map(member);

    quote! {
        fn describe(members: &mut #krate::Members<Self>) {
            #(#calls)*
        }
    }
}

fn member(field: &FieldDef) -> TokenStream {
    let ident = &field.ident;
    let name = &field.name;
    let ty = field.described_ty();

    match field.shape {
        MemberShape::Scalar => quote! {
            members.scalar::<#ty>(#name, |this| &this.#ident);
        },
        MemberShape::ValueObject {
            optional: false
        } => quote! {
            members.value_object::<#ty>(#name, |this| &this.#ident);
        },
        MemberShape::ValueObject {
            optional: true
        } => quote! {
            members.optional_value_object::<#ty>(#name, |this| &this.#ident);
        },
        MemberShape::Converted {
            optional: false
        } => quote! {
            members.converted::<#ty>(#name, |this| &this.#ident);
        },
        MemberShape::Converted {
            optional: true
        } => quote! {
            members.optional_converted::<#ty>(#name, |this| &this.#ident);
        },
        MemberShape::Skipped => quote! {
            members.skipped::<#ty>(#name);
        }
    }
}
