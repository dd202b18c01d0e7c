// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use aggregate_orm::Aggregate;

#[derive(Aggregate)]
pub struct Customer {
    #[aggregate(key, ignore)]
    pub id: i64,
    pub name: String,
}

fn main() {}
