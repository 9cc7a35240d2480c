// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::graphql_object;

use crate::{
    db::models::ForumReply,
    error::ServiceError,
    graphql::{Context, parse_id},
    services,
};

use super::timestamp;

#[graphql_object]
#[graphql(context = Context)]
impl ForumReply {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn topic_id(&self) -> String {
        self.topic_id.to_string()
    }

    pub fn author_id(&self) -> String {
        self.author_id.to_string()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn created_at(&self) -> String {
        timestamp(&self.created_at)
    }
}

pub async fn create_reply(
    context: &Context,
    topic_id: String,
    body: String,
) -> Result<ForumReply, ServiceError> {
    let topic_id = parse_id(&topic_id, "ID topik")?;
    services::forum::create_reply(context.store(), context.caller(), topic_id, &body).await
}
