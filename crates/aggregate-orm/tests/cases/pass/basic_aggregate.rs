// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use aggregate_orm::{Aggregate, Mapped, Mapper};

#[derive(Debug, Clone, PartialEq, Aggregate)]
#[aggregate(table = "tags")]
pub struct Tag {
    #[aggregate(key)]
    pub id: i64,
    pub label: String,
    pub weight: Option<i32>,
}

fn assert_mapped<T: Mapped>() {}

fn main() {
    assert_mapped::<Tag>();
    let mapper = Mapper::new();
    let metadata = mapper.metadata::<Tag>().unwrap();
    assert_eq!(metadata.entity_name(), "tags");
}
