// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use aggregate_orm::Aggregate;

pub struct Address {
    pub city: String,
}

#[derive(Aggregate)]
pub struct Customer {
    pub id: i64,
    #[aggregate(value_object, convert)]
    pub address: Address,
}

fn main() {}
