// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::graphql_object;

use crate::{
    db::models::{Ticket, TicketStatus},
    error::ServiceError,
    graphql::{Context, parse_id},
    services::tickets::{self, PurchaseResult},
};

use super::{amount, timestamp};

#[graphql_object]
#[graphql(context = Context)]
impl Ticket {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn event_id(&self) -> String {
        self.event_id.to_string()
    }

    pub fn ticket_type(&self) -> &str {
        &self.ticket_type
    }

    pub fn price(&self) -> f64 {
        amount(self.price)
    }

    /// Only shown to the holder.
    pub fn qr_code(&self, context: &Context) -> Option<&str> {
        context
            .caller()
            .is_some_and(|c| c.user_id == self.user_id)
            .then_some(self.qr_code.as_str())
    }

    pub fn status(&self) -> TicketStatus {
        self.status
    }

    pub fn purchased_at(&self) -> String {
        timestamp(&self.purchased_at)
    }

    pub fn used_at(&self) -> Option<String> {
        self.used_at.as_ref().map(timestamp)
    }
}

#[graphql_object]
#[graphql(context = Context)]
impl PurchaseResult {
    pub fn tickets(&self) -> Vec<Ticket> {
        self.tickets.clone()
    }

    pub fn total_price(&self) -> f64 {
        amount(self.total_price)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub async fn purchase_tickets(
    context: &Context,
    event_id: String,
    ticket_type: String,
    quantity: i32,
) -> Result<PurchaseResult, ServiceError> {
    let event_id = parse_id(&event_id, "ID event")?;
    tickets::purchase(
        context.store(),
        context.caller(),
        event_id,
        &ticket_type,
        i64::from(quantity),
    )
    .await
}

pub async fn get_my_tickets(context: &Context) -> Result<Vec<Ticket>, ServiceError> {
    tickets::my_tickets(context.store(), context.caller()).await
}

pub async fn cancel_ticket(context: &Context, ticket_id: String) -> Result<Ticket, ServiceError> {
    let ticket_id = parse_id(&ticket_id, "ID tiket")?;
    tickets::cancel_ticket(context.store(), context.caller(), ticket_id).await
}

pub async fn transfer_ticket(
    context: &Context,
    ticket_id: String,
    recipient_id: String,
) -> Result<Ticket, ServiceError> {
    let ticket_id = parse_id(&ticket_id, "ID tiket")?;
    let recipient_id = parse_id(&recipient_id, "ID penerima")?;
    tickets::transfer_ticket(context.store(), context.caller(), ticket_id, recipient_id).await
}
