// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::graphql_object;

use crate::{
    auth::{CallerContext, UserRole},
    graphql::Context,
};

#[graphql_object]
#[graphql(name = "Viewer", context = Context)]
impl CallerContext {
    fn user_id(&self) -> String {
        self.user_id.to_string()
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn role(&self) -> UserRole {
        self.role
    }

    /// Address the request was attributed to, after proxy resolution.
    fn ip(&self, context: &Context) -> String {
        context.get_ip().to_string()
    }

    fn user_agent(&self, context: &Context) -> String {
        context.get_user_agent().to_string()
    }
}

pub fn get_current_user(context: &Context) -> Option<CallerContext> {
    context.caller().cloned()
}
