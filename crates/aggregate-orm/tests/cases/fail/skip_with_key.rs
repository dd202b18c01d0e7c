// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use aggregate_orm::Aggregate;

#[derive(Aggregate)]
pub struct Customer {
    pub id: i64,
    #[aggregate(skip, key)]
    pub cache: Vec<u8>,
}

fn main() {}
