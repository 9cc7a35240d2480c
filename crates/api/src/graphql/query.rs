// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::graphql_object;

use crate::{
    auth::CallerContext,
    db::models::{Event, Team, Ticket, Tournament},
    error::ServiceError,
    graphql::handlers,
    services::registration::RegistrationStatus,
};

use super::Context;

pub struct Query;

#[graphql_object]
#[graphql(context = Context)]
impl Query {
    fn is_authenticated(context: &Context) -> bool {
        context.caller().is_some()
    }

    fn me(context: &Context) -> Option<CallerContext> {
        handlers::viewer::get_current_user(context)
    }

    async fn tournament(
        context: &Context,
        tournament_id: String,
    ) -> Result<Option<Tournament>, ServiceError> {
        handlers::tournaments::get_tournament(context, tournament_id).await
    }

    /// Never fails for anonymous callers; they are simply not registered.
    async fn registration_status(
        context: &Context,
        tournament_id: String,
    ) -> Result<RegistrationStatus, ServiceError> {
        handlers::tournaments::get_registration_status(context, tournament_id).await
    }

    async fn my_teams(context: &Context) -> Result<Vec<Team>, ServiceError> {
        handlers::teams::get_my_teams(context).await
    }

    async fn event(context: &Context, event_id: String) -> Result<Option<Event>, ServiceError> {
        handlers::events::get_event(context, event_id).await
    }

    async fn my_tickets(context: &Context) -> Result<Vec<Ticket>, ServiceError> {
        handlers::tickets::get_my_tickets(context).await
    }
}
