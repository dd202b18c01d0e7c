// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Mapping errors.
//!
//! Two families exist:
//!
//! - **Configuration** ([`MappingError::Configuration`]): the aggregate's
//!   shape or declarations are wrong. Found while building metadata, or while
//!   generating SQL from metadata that cannot support the statement. These
//!   are programming errors and retrying cannot help.
//! - **Data shape** ([`MappingError::ValueMissing`],
//!   [`MappingError::TypeMismatch`]): a row handed to the unflattening engine
//!   does not fit the metadata. Reported per call.
//!
//! Every variant names the aggregate type and the offending logical name.

use thiserror::Error;

use crate::sql::Operation;

/// Error raised by metadata extraction, flattening or SQL generation.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The aggregate cannot be mapped as declared.
    #[error("invalid mapping for `{aggregate}`: {source}")]
    Configuration {
        /// Aggregate type name.
        aggregate: &'static str,
        /// What is wrong with the declaration.
        source:    ConfigurationError
    },

    /// A column required by the metadata is absent from the row.
    #[error("column `{column}` of `{aggregate}` is missing from the row")]
    ValueMissing {
        /// Aggregate type name.
        aggregate: &'static str,
        /// Logical name of the missing column.
        column:    String
    },

    /// A column value cannot be coerced into the member's type.
    #[error("column `{column}` of `{aggregate}` expects {expected}, found {found}")]
    TypeMismatch {
        /// Aggregate type name.
        aggregate: &'static str,
        /// Logical name of the column.
        column:    String,
        /// What the member accepts.
        expected:  String,
        /// What the row held.
        found:     String
    }
}

impl MappingError {
    pub(crate) const fn configuration(
        aggregate: &'static str,
        source: ConfigurationError
    ) -> Self {
        Self::Configuration {
            aggregate,
            source
        }
    }

    pub(crate) fn value_missing(aggregate: &'static str, column: impl Into<String>) -> Self {
        Self::ValueMissing {
            aggregate,
            column: column.into()
        }
    }

    pub(crate) fn type_mismatch(
        aggregate: &'static str,
        column: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>
    ) -> Self {
        Self::TypeMismatch {
            aggregate,
            column: column.into(),
            expected: expected.into(),
            found: found.into()
        }
    }

    /// Aggregate type the error refers to.
    #[must_use]
    pub const fn aggregate(&self) -> &'static str {
        match self {
            Self::Configuration {
                aggregate, ..
            }
            | Self::ValueMissing {
                aggregate, ..
            }
            | Self::TypeMismatch {
                aggregate, ..
            } => aggregate
        }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Check if this is a missing-column error.
    #[must_use]
    pub const fn is_value_missing(&self) -> bool {
        matches!(self, Self::ValueMissing { .. })
    }

    /// Check if this is a type-mismatch error.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// The configuration problem, if this is a configuration error.
    #[must_use]
    pub const fn as_configuration(&self) -> Option<&ConfigurationError> {
        match self {
            Self::Configuration {
                source, ..
            } => Some(source),
            _ => None
        }
    }
}

/// Structural problem in an aggregate's mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Nothing maps to a column after flattening.
    #[error("no member maps to a column")]
    NoColumns,

    /// Two member paths flatten to the same logical name.
    #[error("logical name `{name}` is produced by more than one member")]
    DuplicateName {
        /// The clashing logical name.
        name: String
    },

    /// Two properties end up in the same column.
    #[error("column `{column}` is mapped by more than one property")]
    DuplicateColumn {
        /// The clashing column name.
        column: String
    },

    /// A declaration names a member that does not exist.
    #[error("no mapped member is named `{member}`")]
    UnknownMember {
        /// The declared logical name.
        member: String
    },

    /// Declarations on one member contradict each other.
    #[error("member `{member}` {reason}")]
    Conflict {
        /// Logical name of the member.
        member: String,
        /// What contradicts.
        reason: &'static str
    },

    /// An ignored member has no value to be constructed with.
    #[error("member `{member}` cannot be ignored: its type has no fallback value")]
    NotIgnorable {
        /// Logical name of the member.
        member: String
    },

    /// An opaque member has no type converter registered.
    #[error("member `{member}` of type `{ty}` requires a registered type converter")]
    MissingConverter {
        /// Logical name of the member.
        member: String,
        /// Rust type of the member.
        ty:     &'static str
    },

    /// A keyed statement was requested for an aggregate without keys.
    #[error("{operation} requires at least one key column")]
    NoKeys {
        /// Requested statement.
        operation: Operation
    },

    /// A statement would have no columns to write.
    #[error("{operation} has no columns to write")]
    NothingToWrite {
        /// Requested statement.
        operation: Operation
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn configuration_display_names_aggregate() {
        let err = MappingError::configuration(
            "shop::Customer",
            ConfigurationError::DuplicateName {
                name: "Address_Street".into()
            }
        );
        assert!(err.is_configuration());
        assert_eq!(err.aggregate(), "shop::Customer");
        assert_eq!(
            err.to_string(),
            "invalid mapping for `shop::Customer`: logical name `Address_Street` is produced by \
             more than one member"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn value_missing_display() {
        let err = MappingError::value_missing("shop::Customer", "Name");
        assert!(err.is_value_missing());
        assert_eq!(
            err.to_string(),
            "column `Name` of `shop::Customer` is missing from the row"
        );
        assert!(err.as_configuration().is_none());
    }

    #[test]
    fn type_mismatch_display() {
        let err = MappingError::type_mismatch("shop::Customer", "Id", "int32", "text");
        assert!(err.is_type_mismatch());
        assert_eq!(
            err.to_string(),
            "column `Id` of `shop::Customer` expects int32, found text"
        );
    }

    #[test]
    fn keyed_operation_error() {
        let err = ConfigurationError::NoKeys {
            operation: Operation::Delete
        };
        assert_eq!(err.to_string(), "DELETE requires at least one key column");
    }
}
