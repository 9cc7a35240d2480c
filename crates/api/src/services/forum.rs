// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use uuid::Uuid;

use crate::{
    auth::CallerContext,
    db::models::{ForumReply, NewForumReply},
    error::{ServiceError, internal},
    services::teams::require_caller,
    store::Store,
};

/// Adds a reply to a topic. Locked topics take no new replies.
pub async fn create_reply(
    store: &dyn Store,
    caller: Option<&CallerContext>,
    topic_id: Uuid,
    body: &str,
) -> Result<ForumReply, ServiceError> {
    let caller = require_caller(caller)?;
    let body = body.trim();
    if body.is_empty() {
        return Err(ServiceError::EmptyReply);
    }

    let topic = store
        .topic(topic_id)
        .await
        .map_err(|e| internal("Failed to load topic", e))?
        .ok_or(ServiceError::TopicNotFound)?;
    if topic.is_locked {
        return Err(ServiceError::TopicLocked);
    }

    let reply = store
        .insert_reply(NewForumReply {
            topic_id,
            author_id: caller.user_id,
            body: body.to_string(),
        })
        .await
        .map_err(|e| internal("Failed to insert reply", e))?;

    tracing::info!("User {} replied to topic {topic_id}", caller.user_id);
    Ok(reply)
}
