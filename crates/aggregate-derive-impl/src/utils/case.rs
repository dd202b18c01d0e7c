// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `rename_all` rules.
//!
//! | Value | `created_at` becomes |
//! |-------|----------------------|
//! | `"PascalCase"` (default for members) | `CreatedAt` |
//! | `"camelCase"` | `createdAt` |
//! | `"snake_case"` | `created_at` |
//! | `"SCREAMING_SNAKE_CASE"` | `CREATED_AT` |
//! | `"kebab-case"` | `created-at` |
//! | `"verbatim"` | unchanged |

use convert_case::{Case, Casing};
use darling::FromMeta;

/// Naming rule applied to Rust identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenameRule {
    /// `CreatedAt`.
    #[default]
    Pascal,
    /// `createdAt`.
    Camel,
    /// `created_at`.
    Snake,
    /// `CREATED_AT`.
    ScreamingSnake,
    /// `created-at`.
    Kebab,
    /// Identifier as written.
    Verbatim
}

impl RenameRule {
    /// Apply the rule to `ident`.
    ///
    /// A leading `r#` of raw identifiers is dropped first.
    #[must_use]
    pub fn apply(&self, ident: &str) -> String {
        let ident = ident.strip_prefix("r#").unwrap_or(ident);
        match self {
            Self::Pascal => ident.to_case(Case::Pascal),
            Self::Camel => ident.to_case(Case::Camel),
            Self::Snake => ident.to_case(Case::Snake),
            Self::ScreamingSnake => ident.to_case(Case::Constant),
            Self::Kebab => ident.to_case(Case::Kebab),
            Self::Verbatim => ident.to_owned()
        }
    }
}

impl FromMeta for RenameRule {
    fn from_string(value: &str) -> darling::Result<Self> {
        match value {
            "PascalCase" => Ok(Self::Pascal),
            "camelCase" => Ok(Self::Camel),
            "snake_case" => Ok(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            "kebab-case" => Ok(Self::Kebab),
            "verbatim" => Ok(Self::Verbatim),
            _ => Err(darling::Error::unknown_value(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_is_default() {
        assert_eq!(RenameRule::default().apply("created_at"), "CreatedAt");
        assert_eq!(RenameRule::default().apply("id"), "Id");
    }

    #[test]
    fn rules() {
        assert_eq!(RenameRule::Camel.apply("created_at"), "createdAt");
        assert_eq!(RenameRule::Snake.apply("CreatedAt"), "created_at");
        assert_eq!(RenameRule::ScreamingSnake.apply("created_at"), "CREATED_AT");
        assert_eq!(RenameRule::Kebab.apply("created_at"), "created-at");
        assert_eq!(RenameRule::Verbatim.apply("created_at"), "created_at");
    }

    #[test]
    fn raw_identifiers() {
        assert_eq!(RenameRule::Pascal.apply("r#type"), "Type");
    }

    #[test]
    fn parses_serde_style_names() {
        assert_eq!(
            RenameRule::from_string("snake_case").expect("known"),
            RenameRule::Snake
        );
        assert!(RenameRule::from_string("Title Case").is_err());
    }
}
