// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Individual registration for non-team events.

use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::CallerContext,
    db::models::{Event, EventRegistration, NewEventRegistration, REGISTERED},
    error::{ServiceError, StoreError, internal},
    services::teams::require_caller,
    store::Store,
};

#[derive(Debug, Clone, Serialize)]
pub struct EventRegistrationOutcome {
    pub registration: EventRegistration,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistrationStatus {
    pub is_registered: bool,
}

pub async fn load_event(store: &dyn Store, event_id: Uuid) -> Result<Event, ServiceError> {
    store
        .event(event_id)
        .await
        .map_err(|e| internal("Failed to load event", e))?
        .ok_or(ServiceError::EventNotFound)
}

pub async fn register_for_event(
    store: &dyn Store,
    caller: Option<&CallerContext>,
    event_id: Uuid,
) -> Result<EventRegistrationOutcome, ServiceError> {
    let caller = require_caller(caller)?;
    let event = load_event(store, event_id).await?;
    if event.has_started(chrono::Utc::now()) {
        return Err(ServiceError::RegistrationClosed);
    }

    if store
        .event_registration(event_id, caller.user_id)
        .await
        .map_err(|e| internal("Failed to check event registration", e))?
        .is_some()
    {
        return Err(ServiceError::AlreadyRegistered);
    }

    let registration = store
        .insert_event_registration(NewEventRegistration {
            event_id,
            user_id: caller.user_id,
            status: REGISTERED.to_string(),
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict => ServiceError::AlreadyRegistered,
            StoreError::CapacityExceeded => ServiceError::CapacityExceeded,
            StoreError::NotFound => ServiceError::EventNotFound,
            other => internal("Failed to insert event registration", other),
        })?;

    tracing::info!("User {} registered for event {event_id}", caller.user_id);
    Ok(EventRegistrationOutcome {
        registration,
        message: "Berhasil mendaftar ke event".to_string(),
    })
}

pub async fn unregister_from_event(
    store: &dyn Store,
    caller: Option<&CallerContext>,
    event_id: Uuid,
) -> Result<String, ServiceError> {
    let caller = require_caller(caller)?;
    let event = load_event(store, event_id).await?;
    if event.has_started(chrono::Utc::now()) {
        return Err(ServiceError::UnregistrationClosed);
    }

    let deleted = store
        .delete_event_registration(event_id, caller.user_id)
        .await
        .map_err(|e| internal("Failed to delete event registration", e))?;
    if !deleted {
        return Err(ServiceError::NotRegistered);
    }

    tracing::info!("User {} unregistered from event {event_id}", caller.user_id);
    Ok("Pendaftaran event berhasil dibatalkan".to_string())
}

pub async fn event_registration_status(
    store: &dyn Store,
    caller: Option<&CallerContext>,
    event_id: Uuid,
) -> EventRegistrationStatus {
    let Some(caller) = caller else {
        return EventRegistrationStatus {
            is_registered: false,
        };
    };
    let is_registered = match store.event_registration(event_id, caller.user_id).await {
        Ok(registration) => registration.is_some(),
        Err(e) => {
            tracing::warn!("Failed to read event registration status: {e}");
            false
        }
    };
    EventRegistrationStatus { is_registered }
}
