// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Generated statements and placeholder numbering.
//!
//! # Placeholders
//!
//! | Style | Placeholder for `Address-Street` | Repeated name |
//! |-------|----------------------------------|---------------|
//! | `Named { '@' }` | `@Address_Street` | same placeholder |
//! | `Numbered { '$' }` | `$n` | same index |
//! | `Positional` | `?` | bound again |
//!
//! Named placeholders only carry `[A-Za-z0-9_]`; other characters become `_`
//! and a clashing label gets a `_2`, `_3` suffix. [`SqlStatement::parameters`]
//! still lists logical names.

use std::{fmt, iter};

use super::dialect::ParameterStyle;
use crate::{error::MappingError, row::FlatRow, value::Value};

/// SQL text with the logical names of its parameters in binding order.
///
/// Where a dialect has no single-command form, a statement is followed by
/// further commands. Each command carries its own parameters and must be
/// executed in order, see [`SqlStatement::commands`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    text:       String,
    parameters: Vec<String>,
    aggregate:  &'static str,
    following:  Option<Box<SqlStatement>>
}

impl SqlStatement {
    pub(crate) const fn new(
        text: String,
        parameters: Vec<String>,
        aggregate: &'static str
    ) -> Self {
        Self {
            text,
            parameters,
            aggregate,
            following: None
        }
    }

    /// Append `next` to the end of the command chain.
    pub(crate) fn followed_by(mut self, next: Self) -> Self {
        self.following = Some(Box::new(match self.following.take() {
            Some(following) => (*following).followed_by(next),
            None => next
        }));
        self
    }

    /// Command executed after this one, if any.
    #[must_use]
    pub fn following(&self) -> Option<&Self> {
        self.following.as_deref()
    }

    /// This command and every following one, in execution order.
    pub fn commands(&self) -> impl Iterator<Item = &Self> {
        iter::successors(Some(self), |command| command.following())
    }

    /// Check if more than one command has to be executed.
    #[must_use]
    pub fn is_batch(&self) -> bool {
        self.following.is_some()
    }

    /// Text of this command.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Logical names of the parameters in binding order.
    ///
    /// With positional placeholders a name appears once per occurrence; with
    /// named or numbered placeholders once per distinct placeholder.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Consume the statement, returning the text of its first command.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Values of `row` in this command's parameter order.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::ValueMissing`] for a parameter absent from
    /// `row`.
    pub fn bind(&self, row: &FlatRow) -> Result<Vec<Value>, MappingError> {
        self.parameters
            .iter()
            .map(|name| {
                row.get(name)
                    .cloned()
                    .ok_or_else(|| MappingError::value_missing(self.aggregate, name.as_str()))
            })
            .collect()
    }
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        if let Some(following) = &self.following {
            write!(f, "; {following}")?;
        }
        Ok(())
    }
}

impl AsRef<str> for SqlStatement {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Placeholder writer for one statement.
#[derive(Debug)]
pub(crate) struct Parameters {
    style:  ParameterStyle,
    names:  Vec<String>,
    labels: Vec<String>
}

impl Parameters {
    pub(crate) const fn new(style: ParameterStyle) -> Self {
        Self {
            style,
            names: Vec::new(),
            labels: Vec::new()
        }
    }

    /// Placeholder for the column with logical name `name`.
    pub(crate) fn placeholder(&mut self, name: &str) -> String {
        match self.style {
            ParameterStyle::Named {
                prefix
            } => {
                let label = match self.names.iter().position(|known| known == name) {
                    Some(index) => self.labels[index].clone(),
                    None => {
                        let label = self.unique_label(name);
                        self.names.push(name.to_owned());
                        self.labels.push(label.clone());
                        label
                    }
                };
                format!("{prefix}{label}")
            }
            ParameterStyle::Numbered {
                prefix
            } => {
                let index = match self.names.iter().position(|known| known == name) {
                    Some(index) => index,
                    None => {
                        self.names.push(name.to_owned());
                        self.names.len() - 1
                    }
                };
                format!("{prefix}{}", index + 1)
            }
            ParameterStyle::Positional => {
                self.names.push(name.to_owned());
                "?".to_owned()
            }
        }
    }

    pub(crate) fn into_names(self) -> Vec<String> {
        self.names
    }

    /// Identifier-safe label for `name`, distinct from earlier labels.
    fn unique_label(&self, name: &str) -> String {
        let base: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        let base = match base.chars().next() {
            Some(first) if !first.is_ascii_digit() => base,
            _ => format!("_{base}")
        };
        let mut label = base.clone();
        let mut suffix = 2;
        while self.labels.contains(&label) {
            label = format!("{base}_{suffix}");
            suffix += 1;
        }
        label
    }
}
