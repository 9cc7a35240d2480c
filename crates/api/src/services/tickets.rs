// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Ticket purchase and the ticket state machine.

use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::CallerContext,
    db::models::{Ticket, TicketStatus},
    error::{ServiceError, StoreError, internal},
    services::{events::load_event, teams::require_caller},
    store::{Store, TicketPurchase},
};

/// Upper bound on tickets issued by one purchase, stock permitting.
pub const MAX_TICKETS_PER_PURCHASE: i64 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResult {
    pub tickets: Vec<Ticket>,
    pub total_price: i64,
    pub message: String,
}

pub fn generate_qr_code() -> String {
    use rand::RngCore;
    let mut buf = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut buf);
    let hex: String = buf.iter().map(|b| format!("{:02x}", b)).collect();
    format!("TIX-{hex}")
}

/// Buys `quantity` tickets of `ticket_type`.
///
/// Type and stock are checked up front for a precise message, then the store
/// reserves the stock and inserts the tickets in one transaction.
pub async fn purchase(
    store: &dyn Store,
    caller: Option<&CallerContext>,
    event_id: Uuid,
    ticket_type: &str,
    quantity: i64,
) -> Result<PurchaseResult, ServiceError> {
    let caller = require_caller(caller)?;
    if !(1..=MAX_TICKETS_PER_PURCHASE).contains(&quantity) {
        return Err(ServiceError::InvalidQuantity);
    }
    let ticket_type = ticket_type.trim();
    if ticket_type.is_empty() {
        return Err(ServiceError::InvalidTicketType);
    }

    let event = load_event(store, event_id).await?;
    let types = event.ticket_types().map_err(|e| {
        tracing::error!("Event {event_id} has unreadable ticket types: {e}");
        ServiceError::Internal
    })?;
    let spec = types
        .get(ticket_type)
        .ok_or(ServiceError::InvalidTicketType)?;
    if spec.available.is_some_and(|available| available < quantity) {
        return Err(ServiceError::SoldOut);
    }
    if spec.price.checked_mul(quantity).is_none() {
        return Err(ServiceError::InvalidQuantity);
    }

    let tickets = store
        .purchase_tickets(TicketPurchase {
            event_id,
            user_id: caller.user_id,
            ticket_type: ticket_type.to_string(),
            qr_codes: (0..quantity).map(|_| generate_qr_code()).collect(),
        })
        .await
        .map_err(|e| match e {
            StoreError::SoldOut => ServiceError::SoldOut,
            StoreError::AmountOverflow => ServiceError::InvalidQuantity,
            StoreError::NotFound => ServiceError::InvalidTicketType,
            other => internal("Failed to purchase tickets", other),
        })?;

    // Unit price may have changed between the check and the locked read.
    let total_price = tickets
        .iter()
        .try_fold(0i64, |total, t| total.checked_add(t.price))
        .ok_or(ServiceError::InvalidQuantity)?;

    tracing::info!(
        "User {} bought {quantity} {ticket_type} ticket(s) for event {event_id}",
        caller.user_id
    );

    Ok(PurchaseResult {
        tickets,
        total_price,
        message: "Tiket berhasil dibeli".to_string(),
    })
}

async fn owned_ticket(
    store: &dyn Store,
    caller: &CallerContext,
    ticket_id: Uuid,
) -> Result<Ticket, ServiceError> {
    let ticket = store
        .ticket(ticket_id)
        .await
        .map_err(|e| internal("Failed to load ticket", e))?
        .ok_or(ServiceError::TicketNotFound)?;
    if ticket.user_id != caller.user_id {
        return Err(ServiceError::NotTicketOwner);
    }
    Ok(ticket)
}

/// Reports the status the ticket actually holds after a lost race.
async fn transition_error(store: &dyn Store, ticket_id: Uuid, to: TicketStatus) -> ServiceError {
    match store.ticket(ticket_id).await {
        Ok(Some(ticket)) => ServiceError::InvalidTicketTransition {
            from: ticket.status,
            to,
        },
        Ok(None) => ServiceError::TicketNotFound,
        Err(e) => internal("Failed to reload ticket", e),
    }
}

/// Cancels an active ticket. Stock is not returned to the event.
pub async fn cancel_ticket(
    store: &dyn Store,
    caller: Option<&CallerContext>,
    ticket_id: Uuid,
) -> Result<Ticket, ServiceError> {
    let caller = require_caller(caller)?;
    let ticket = owned_ticket(store, caller, ticket_id).await?;
    if !ticket.status.can_transition_to(TicketStatus::Cancelled) {
        return Err(ServiceError::InvalidTicketTransition {
            from: ticket.status,
            to: TicketStatus::Cancelled,
        });
    }

    let cancelled = match store
        .set_ticket_status(ticket_id, TicketStatus::Active, TicketStatus::Cancelled)
        .await
    {
        Ok(ticket) => ticket,
        Err(StoreError::InvalidTransition) => {
            return Err(transition_error(store, ticket_id, TicketStatus::Cancelled).await);
        }
        Err(e) => return Err(internal("Failed to cancel ticket", e)),
    };

    tracing::info!("User {} cancelled ticket {ticket_id}", caller.user_id);
    Ok(cancelled)
}

/// Hands an active ticket to another user. The source ticket is marked
/// transferred and the recipient gets a new ticket with a fresh code.
pub async fn transfer_ticket(
    store: &dyn Store,
    caller: Option<&CallerContext>,
    ticket_id: Uuid,
    recipient_id: Uuid,
) -> Result<Ticket, ServiceError> {
    let caller = require_caller(caller)?;
    if recipient_id == caller.user_id {
        return Err(ServiceError::SelfTransfer);
    }
    let ticket = owned_ticket(store, caller, ticket_id).await?;
    if !ticket.status.can_transition_to(TicketStatus::Transferred) {
        return Err(ServiceError::InvalidTicketTransition {
            from: ticket.status,
            to: TicketStatus::Transferred,
        });
    }

    let issued = match store
        .transfer_ticket(ticket_id, recipient_id, generate_qr_code())
        .await
    {
        Ok(ticket) => ticket,
        Err(StoreError::InvalidTransition) => {
            return Err(transition_error(store, ticket_id, TicketStatus::Transferred).await);
        }
        Err(e) => return Err(internal("Failed to transfer ticket", e)),
    };

    tracing::info!(
        "User {} transferred ticket {ticket_id} to {recipient_id}",
        caller.user_id
    );
    Ok(issued)
}

pub async fn my_tickets(
    store: &dyn Store,
    caller: Option<&CallerContext>,
) -> Result<Vec<Ticket>, ServiceError> {
    let caller = require_caller(caller)?;
    store
        .tickets_for_user(caller.user_id)
        .await
        .map_err(|e| internal("Failed to load tickets", e))
}
