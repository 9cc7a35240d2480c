// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::graphql_object;

use crate::{
    db::models::Team,
    error::{ServiceError, internal},
    graphql::Context,
    services,
};

use super::{count, timestamp};

#[graphql_object]
#[graphql(context = Context)]
impl Team {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn recruiting(&self) -> bool {
        self.recruiting
    }

    pub fn created_at(&self) -> String {
        timestamp(&self.created_at)
    }

    pub async fn member_count(&self, context: &Context) -> Result<i32, ServiceError> {
        let members = context
            .store()
            .team_member_count(self.id)
            .await
            .map_err(|e| internal("Failed to count team members", e))?;
        Ok(count(members))
    }
}

pub async fn get_my_teams(context: &Context) -> Result<Vec<Team>, ServiceError> {
    services::teams::my_teams(context.store(), context.caller()).await
}
