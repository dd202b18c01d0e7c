// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Shared utilities for code generation.
//!
//! # Submodules
//!
//! - [`case`] — `rename_all` rules for member and variant names
//! - [`types`] — Type inspection helpers

pub mod case;
pub mod types;
