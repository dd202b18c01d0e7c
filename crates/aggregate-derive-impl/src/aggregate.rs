// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `#[derive(Aggregate)]` implementation.
//!
//! # Module Structure
//!
//! ```text
//! aggregate/
//! ├── parse.rs        — attribute parsing into AggregateDef
//! ├── describe.rs     — Mapped::describe
//! ├── materialize.rs  — Mapped::materialize
//! └── configure.rs    — Mapped::configure from declarative attributes
//! ```
//!
//! # Generated Code
//!
//! ```rust,ignore
//! impl ::aggregate_orm::Mapped for Customer {
//!     fn describe(members: &mut ::aggregate_orm::Members<Self>) { /* ... */ }
//!     fn materialize(values: &mut ::aggregate_orm::MemberValues) -> Result<Self, MappingError> { /* ... */ }
//!     fn configure(config: &mut ::aggregate_orm::AggregateConfig) { /* ... */ }
//! }
//!
//! impl ::aggregate_orm::Flatten for Customer {
//!     fn flatten(&self, mapper: &::aggregate_orm::Mapper) -> Result<Flattened, MappingError> {
//!         mapper.to_row(self).map(::aggregate_orm::Flattened::Row)
//!     }
//! }
//! ```

mod configure;
mod describe;
mod materialize;
pub mod parse;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use self::parse::AggregateDef;

/// Main entry point for the Aggregate derive macro.
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match AggregateDef::from_derive_input(&input) {
        Ok(def) => generate(&def).into(),
        Err(err) => err.write_errors().into()
    }
}

fn generate(def: &AggregateDef) -> TokenStream2 {
    let krate = &def.krate;
    let ident = &def.ident;
    let (impl_generics, ty_generics, where_clause) = def.generics.split_for_impl();

    let describe = describe::generate(def);
    let materialize = materialize::generate(def);
    let configure = configure::generate(def);

    quote! {
        impl #impl_generics #krate::Mapped for #ident #ty_generics #where_clause {
            #describe
            #materialize
            #configure
        }

        impl #impl_generics #krate::Flatten for #ident #ty_generics #where_clause {
            fn flatten(
                &self,
                mapper: &#krate::Mapper
            ) -> ::core::result::Result<#krate::Flattened, #krate::MappingError> {
                mapper.to_row(self).map(#krate::Flattened::Row)
            }
        }
    }
}
