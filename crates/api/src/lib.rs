// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod rest;
pub mod services;
pub mod store;
