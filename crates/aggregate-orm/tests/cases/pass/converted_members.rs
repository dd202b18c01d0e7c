// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use aggregate_orm::{Aggregate, Mapper};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerId(pub uuid::Uuid);

#[derive(Debug, Clone, PartialEq, Aggregate)]
#[aggregate(table = "orders")]
pub struct Order {
    #[aggregate(identity, convert)]
    pub id: OrderId,
    #[aggregate(convert)]
    pub customer: CustomerId,
    #[aggregate(convert)]
    pub referrer: Option<CustomerId>,
    #[aggregate(default)]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

fn main() {
    let mapper = Mapper::new();
    mapper
        .register_converter::<OrderId, i64>(|id| id.0, OrderId)
        .register_converter::<CustomerId, uuid::Uuid>(|id| id.0, CustomerId);
    assert!(mapper.metadata::<Order>().is_ok());
}
