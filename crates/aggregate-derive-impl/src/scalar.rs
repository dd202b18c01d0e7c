// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `#[derive(Scalar)]` implementation.
//!
//! Fieldless enums are stored as text holding the variant name. Decoding
//! matches names exactly; anything else is handed back as a mismatch.
//!
//! # Attributes
//!
//! | Attribute | Level | Default | Description |
//! |-----------|-------|---------|-------------|
//! | `rename_all` | enum | `"verbatim"` | Rule turning variant names into stored text |
//! | `rename` | variant | — | Stored text for one variant |
//! | `crate` | enum | `::aggregate_orm` | Path of the runtime crate |
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(Scalar)]
//! #[scalar(rename_all = "snake_case")]
//! pub enum Status {
//!     Open,
//!     OnHold,
//!     #[scalar(rename = "done")]
//!     Closed
//! }
//! // Open -> "open", OnHold -> "on_hold", Closed -> "done"
//! ```

use darling::{FromDeriveInput, FromVariant, ast::Data, util::Ignored};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Generics, Ident, parse_macro_input};

use crate::{aggregate::parse, utils::case::RenameRule};

fn verbatim() -> RenameRule {
    RenameRule::Verbatim
}

#[derive(Debug, FromVariant)]
#[darling(attributes(scalar))]
struct VariantAttrs {
    ident: Ident,

    #[darling(default)]
    rename: Option<String>
}

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(scalar), supports(enum_unit))]
struct ScalarAttrs {
    ident: Ident,

    generics: Generics,

    data: Data<VariantAttrs, Ignored>,

    #[darling(default = "verbatim")]
    rename_all: RenameRule,

    #[darling(rename = "crate", default = "parse::default_crate_path")]
    krate: syn::Path
}

/// Main entry point for the Scalar derive macro.
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ScalarAttrs::from_derive_input(&input).and_then(|attrs| generate(&attrs)) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into()
    }
}

fn generate(attrs: &ScalarAttrs) -> darling::Result<TokenStream2> {
    let Data::Enum(variants) = &attrs.data else {
        return Err(darling::Error::custom("Scalar can only be derived for enums")
            .with_span(&attrs.ident));
    };
    if variants.is_empty() {
        return Err(
            darling::Error::custom("Scalar requires at least one variant").with_span(&attrs.ident)
        );
    }

    let krate = &attrs.krate;
    let ident = &attrs.ident;
    let (impl_generics, ty_generics, where_clause) = attrs.generics.split_for_impl();

    let mut names = Vec::with_capacity(variants.len());
    for variant in variants {
        let name = variant
            .rename
            .clone()
            .unwrap_or_else(|| attrs.rename_all.apply(&variant.ident.to_string()));
        if names.contains(&name) {
            return Err(darling::Error::custom(format!(
                "two variants are stored as `{name}`"
            ))
            .with_span(&variant.ident));
        }
        names.push(name);
    }
    let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();

    Ok(quote! {
        impl #impl_generics #krate::Scalar for #ident #ty_generics #where_clause {
            const KIND: #krate::ScalarKind = #krate::ScalarKind::Text;

            fn to_value(&self) -> #krate::Value {
                let name = match self {
                    #(Self::#idents => #names),*
                };
                #krate::Value::Text(::std::string::String::from(name))
            }

            fn from_value(
                value: #krate::Value
            ) -> ::core::result::Result<Self, #krate::Value> {
                let variant = match value.as_str() {
                    #(::core::option::Option::Some(#names) => ::core::option::Option::Some(Self::#idents),)*
                    _ => ::core::option::Option::None
                };
                variant.ok_or(value)
            }
        }

        impl #impl_generics #krate::Flatten for #ident #ty_generics #where_clause {
            fn flatten(
                &self,
                _mapper: &#krate::Mapper
            ) -> ::core::result::Result<#krate::Flattened, #krate::MappingError> {
                ::core::result::Result::Ok(#krate::Flattened::Scalar(
                    #krate::Scalar::to_value(self)
                ))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: DeriveInput) -> darling::Result<String> {
        let attrs = ScalarAttrs::from_derive_input(&input)?;
        generate(&attrs).map(|tokens| tokens.to_string())
    }

    #[test]
    fn variant_names_are_stored() {
        let code = expand(syn::parse_quote! {
            #[scalar(rename_all = "snake_case")]
            pub enum Status {
                Open,
                OnHold,
                #[scalar(rename = "done")]
                Closed,
            }
        })
        .expect("unit enum");

        assert!(code.contains("Self :: Open => \"open\""));
        assert!(code.contains("Self :: OnHold => \"on_hold\""));
        assert!(code.contains("Self :: Closed => \"done\""));
        assert!(code.contains("ScalarKind :: Text"));
    }

    #[test]
    fn verbatim_by_default() {
        let code = expand(syn::parse_quote! {
            pub enum Status { Open }
        })
        .expect("unit enum");
        assert!(code.contains("Self :: Open => \"Open\""));
    }

    #[test]
    fn rejects_data_variants() {
        let result = expand(syn::parse_quote! {
            pub enum Shape { Circle(f64) }
        });
        assert!(result.is_err());
    }

    #[test]
    fn rejects_clashing_names() {
        let result = expand(syn::parse_quote! {
            pub enum Status {
                Open,
                #[scalar(rename = "Open")]
                Reopened,
            }
        });
        assert!(result.is_err());
    }
}
