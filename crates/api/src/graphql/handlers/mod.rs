// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::{DateTime, Utc};

pub mod events;
pub mod forum;
pub mod teams;
pub mod tickets;
pub mod tournaments;
pub mod viewer;

fn timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339()
}

/// GraphQL has no 64-bit integer; amounts fit a Float exactly.
fn amount(value: i64) -> f64 {
    value as f64
}

fn count(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
