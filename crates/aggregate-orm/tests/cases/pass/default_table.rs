// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use aggregate_orm::{Aggregate, Mapper};

#[derive(Debug, Clone, PartialEq, Aggregate)]
pub struct Invoice {
    #[aggregate(key)]
    pub id: i64,
    pub amount: i64,
}

fn main() {
    let metadata = Mapper::new().metadata::<Invoice>().unwrap();
    assert_eq!(metadata.entity_name(), "Invoice");
}
