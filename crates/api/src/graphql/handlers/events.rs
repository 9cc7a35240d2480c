// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::{GraphQLObject, graphql_object};

use crate::{
    db::models::{CompetitionStatus, Event, EventRegistration},
    error::{ServiceError, internal},
    graphql::{Context, parse_id},
    services::events::{self, EventRegistrationOutcome},
};

use super::{amount, count, timestamp};

#[derive(GraphQLObject)]
pub struct TicketTypeInfo {
    pub name: String,
    pub price: f64,
    /// Null for unlimited stock.
    pub available: Option<i32>,
}

#[graphql_object]
#[graphql(context = Context)]
impl Event {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn starts_at(&self) -> String {
        timestamp(&self.starts_at)
    }

    pub fn ends_at(&self) -> Option<String> {
        self.ends_at.as_ref().map(timestamp)
    }

    pub fn max_participants(&self) -> i32 {
        self.max_participants
    }

    pub fn status(&self) -> CompetitionStatus {
        self.status
    }

    #[graphql(name = "ticketTypes")]
    pub fn ticket_type_list(&self) -> Result<Vec<TicketTypeInfo>, ServiceError> {
        let types = self.ticket_types().map_err(|e| {
            tracing::error!("Event {} has unreadable ticket types: {e}", self.id);
            ServiceError::Internal
        })?;
        Ok(types
            .iter()
            .map(|(name, spec)| TicketTypeInfo {
                name: name.clone(),
                price: amount(spec.price),
                available: spec.available.map(count),
            })
            .collect())
    }

    pub async fn registration_count(&self, context: &Context) -> Result<i32, ServiceError> {
        let registrations = context
            .store()
            .event_registration_count(self.id)
            .await
            .map_err(|e| internal("Failed to count event registrations", e))?;
        Ok(count(registrations))
    }

    pub async fn is_registered(&self, context: &Context) -> bool {
        events::event_registration_status(context.store(), context.caller(), self.id)
            .await
            .is_registered
    }
}

#[graphql_object]
#[graphql(context = Context)]
impl EventRegistration {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn event_id(&self) -> String {
        self.event_id.to_string()
    }

    pub fn user_id(&self) -> String {
        self.user_id.to_string()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn created_at(&self) -> String {
        timestamp(&self.created_at)
    }
}

#[graphql_object]
#[graphql(context = Context)]
impl EventRegistrationOutcome {
    pub fn success(&self) -> bool {
        true
    }

    pub fn registration(&self) -> EventRegistration {
        self.registration.clone()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub async fn get_event(context: &Context, event_id: String) -> Result<Option<Event>, ServiceError> {
    let event_id = parse_id(&event_id, "ID event")?;
    context
        .store()
        .event(event_id)
        .await
        .map_err(|e| internal("Failed to load event", e))
}

pub async fn register_for_event(
    context: &Context,
    event_id: String,
) -> Result<EventRegistrationOutcome, ServiceError> {
    let event_id = parse_id(&event_id, "ID event")?;
    events::register_for_event(context.store(), context.caller(), event_id).await
}

pub async fn unregister_from_event(
    context: &Context,
    event_id: String,
) -> Result<String, ServiceError> {
    let event_id = parse_id(&event_id, "ID event")?;
    events::unregister_from_event(context.store(), context.caller(), event_id).await
}
