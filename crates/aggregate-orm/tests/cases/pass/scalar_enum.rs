// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use aggregate_orm::{Aggregate, Scalar, Value};

#[derive(Debug, Clone, Copy, PartialEq, Scalar)]
#[scalar(rename_all = "snake_case")]
pub enum Status {
    Open,
    OnHold,
    #[scalar(rename = "done")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Aggregate)]
pub struct Ticket {
    #[aggregate(key)]
    pub id: i64,
    pub status: Status,
    pub previous: Option<Status>,
}

fn main() {
    assert_eq!(Status::OnHold.to_value(), Value::Text("on_hold".into()));
    assert_eq!(Status::from_value(Value::Text("done".into())), Ok(Status::Closed));
}
