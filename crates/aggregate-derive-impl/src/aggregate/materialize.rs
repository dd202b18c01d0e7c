// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `Mapped::materialize` generation.
//!
//! Described fields are taken from the value bag by member name; skipped
//! fields get `Default::default()`.

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::AggregateDef;

/// Generate the `materialize` method.
pub fn generate(def: &AggregateDef) -> TokenStream {
    let krate = &def.krate;
    let assignments = def.fields.iter().map(|field| {
        let ident = &field.ident;
        let name = &field.name;
        if field.is_described() {
            quote! { #ident: values.take(#name)? }
        } else {
            quote! { #ident: ::core::default::Default::default() }
        }
    });

    quote! {
        fn materialize(
            values: &mut #krate::MemberValues
        ) -> ::core::result::Result<Self, #krate::MappingError> {
            ::core::result::Result::Ok(Self {
                #(#assignments),*
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_fields_use_default() {
        let def = AggregateDef::from_derive_input(&syn::parse_quote! {
            pub struct Customer {
                id: i32,
                #[aggregate(skip)]
                cache: Vec<u8>,
            }
        })
        .expect("valid aggregate");
        let code = generate(&def).to_string();

        assert!(code.contains("id : values . take (\"Id\") ?"));
        assert!(code.contains("cache : :: core :: default :: Default :: default ()"));
    }
}
