// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use aggregate_orm::Aggregate;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dirty(bool);

#[derive(Debug, Clone, PartialEq, Aggregate)]
#[aggregate(
    table = "accounts",
    view = "account_summaries",
    schema = "crm",
    rename_all = "snake_case"
)]
pub struct Account {
    #[aggregate(key)]
    pub tenant: i32,
    #[aggregate(key)]
    pub number: i64,
    #[aggregate(rename = "display")]
    pub display_name: String,
    #[aggregate(column = "notes_text")]
    pub notes: Option<String>,
    #[aggregate(ignore)]
    pub cached_total: Option<i64>,
    #[aggregate(skip)]
    pub dirty: Dirty,
}

mod nested {
    use aggregate_orm as orm;

    #[derive(Debug, orm::Aggregate)]
    #[aggregate(crate = "orm")]
    pub struct Label {
        pub text: String,
    }
}

fn main() {
    let _ = nested::Label { text: String::new() };
}
