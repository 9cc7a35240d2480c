// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

fn main() {
    let schema = arena_api::graphql::schema();

    let result = schema.as_sdl();

    std::fs::write("schema.gql", result).expect("Unable to write schema file");
}
