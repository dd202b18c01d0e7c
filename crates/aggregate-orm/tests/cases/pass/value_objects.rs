// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use aggregate_orm::{Aggregate, Mapper};

#[derive(Debug, Clone, PartialEq, Aggregate)]
pub struct Money {
    pub amount: rust_decimal::Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Aggregate)]
pub struct Address {
    pub street: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Aggregate)]
#[aggregate(table = "invoices", schema = "billing")]
pub struct Invoice {
    #[aggregate(key)]
    pub id: uuid::Uuid,
    #[aggregate(value_object)]
    pub total: Money,
    #[aggregate(value_object)]
    pub billing_address: Option<Address>,
}

fn main() {
    let mapper = Mapper::new();
    let metadata = mapper.metadata::<Invoice>().unwrap();
    let names: Vec<_> = metadata.properties().names().collect();
    assert_eq!(
        names,
        [
            "Id",
            "Total_Amount",
            "Total_Currency",
            "BillingAddress_Street",
            "BillingAddress_City",
        ]
    );
}
