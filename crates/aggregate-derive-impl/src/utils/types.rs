// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Type inspection helpers.
//!
//! Macros only see tokens, so `Option<T>` is recognized by its last path
//! segment. `std::option::Option<T>` and `core::option::Option<T>` match as
//! well; a user type named `Option` would too.

use syn::{GenericArgument, PathArguments, Type};

/// Inner type of `Option<T>`, or `None` for any other type.
///
/// # Example
///
/// ```text
/// Option<Address>               -> Some(Address)
/// std::option::Option<String>   -> Some(String)
/// Address                       -> None
/// ```
pub fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None
    }
}
