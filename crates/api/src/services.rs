// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Validation and orchestration in front of the [`crate::store::Store`].
//! Every check runs before the single write each operation performs.

pub mod events;
pub mod forum;
pub mod registration;
pub mod teams;
pub mod tickets;
