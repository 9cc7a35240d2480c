// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::graphql_object;

use crate::{
    db::models::{ForumReply, Ticket},
    error::ServiceError,
    graphql::handlers,
    services::{
        events::EventRegistrationOutcome,
        registration::{RegistrationOutcome, UnregistrationOutcome},
        tickets::PurchaseResult,
    },
};

use super::Context;

pub struct Mutation;

#[graphql_object]
#[graphql(
    context = Context,
)]
impl Mutation {
    /// Registers a team. Without `teamId` the caller's default team is used.
    async fn register_team(
        context: &Context,
        tournament_id: String,
        team_id: Option<String>,
    ) -> Result<RegistrationOutcome, ServiceError> {
        handlers::tournaments::register_team(context, tournament_id, team_id).await
    }

    async fn unregister_team(
        context: &Context,
        tournament_id: String,
        team_id: Option<String>,
    ) -> Result<UnregistrationOutcome, ServiceError> {
        handlers::tournaments::unregister_team(context, tournament_id, team_id).await
    }

    async fn register_for_event(
        context: &Context,
        event_id: String,
    ) -> Result<EventRegistrationOutcome, ServiceError> {
        handlers::events::register_for_event(context, event_id).await
    }

    async fn unregister_from_event(
        context: &Context,
        event_id: String,
    ) -> Result<String, ServiceError> {
        handlers::events::unregister_from_event(context, event_id).await
    }

    async fn purchase_tickets(
        context: &Context,
        event_id: String,
        ticket_type: String,
        quantity: i32,
    ) -> Result<PurchaseResult, ServiceError> {
        handlers::tickets::purchase_tickets(context, event_id, ticket_type, quantity).await
    }

    async fn cancel_ticket(context: &Context, ticket_id: String) -> Result<Ticket, ServiceError> {
        handlers::tickets::cancel_ticket(context, ticket_id).await
    }

    /// The source ticket becomes `TRANSFERRED`; the returned ticket belongs to the recipient.
    async fn transfer_ticket(
        context: &Context,
        ticket_id: String,
        recipient_id: String,
    ) -> Result<Ticket, ServiceError> {
        handlers::tickets::transfer_ticket(context, ticket_id, recipient_id).await
    }

    async fn create_reply(
        context: &Context,
        topic_id: String,
        body: String,
    ) -> Result<ForumReply, ServiceError> {
        handlers::forum::create_reply(context, topic_id, body).await
    }
}
