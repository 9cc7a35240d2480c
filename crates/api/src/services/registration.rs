// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Team registration for tournaments.

use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::CallerContext,
    db::models::{NewTournamentParticipant, REGISTERED, TeamMember, TournamentParticipant},
    error::{ServiceError, StoreError, internal},
    services::teams::{memberships_of, require_caller, require_leader, resolve_default_team},
    store::Store,
};

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOutcome {
    pub registration: TournamentParticipant,
    pub participant_count: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnregistrationOutcome {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatus {
    pub is_registered: bool,
    pub team_id: Option<Uuid>,
}

impl RegistrationStatus {
    fn not_registered() -> Self {
        Self {
            is_registered: false,
            team_id: None,
        }
    }
}

/// Registers a team for a tournament.
///
/// Without `team_id` the caller's default team is used. Checks run in a fixed
/// order so the caller gets the most specific failure: leadership, tournament,
/// start time, duplicate, capacity, then team size. The registration deadline
/// is informational and never consulted.
pub async fn register(
    store: &dyn Store,
    caller: Option<&CallerContext>,
    tournament_id: Uuid,
    team_id: Option<Uuid>,
) -> Result<RegistrationOutcome, ServiceError> {
    let caller = require_caller(caller)?;
    let memberships = memberships_of(store, caller).await?;

    let team_id = match team_id {
        Some(team_id) => team_id,
        None => resolve_default_team(&memberships).ok_or(ServiceError::NoTeam)?,
    };
    require_leader(&memberships, team_id, ServiceError::NotTeamLeader)?;

    let tournament = store
        .tournament(tournament_id)
        .await
        .map_err(|e| internal("Failed to load tournament", e))?
        .ok_or(ServiceError::TournamentNotFound)?;

    if tournament.has_started(chrono::Utc::now()) {
        return Err(ServiceError::RegistrationClosed);
    }

    if store
        .participant(tournament_id, team_id)
        .await
        .map_err(|e| internal("Failed to check registration", e))?
        .is_some()
    {
        return Err(ServiceError::AlreadyRegistered);
    }

    let current = store
        .participant_count(tournament_id)
        .await
        .map_err(|e| internal("Failed to count participants", e))?;
    if tournament.max_participants > 0 && current >= i64::from(tournament.max_participants) {
        return Err(ServiceError::CapacityExceeded);
    }

    if let Some(required) = tournament.format.required_team_size() {
        let members = store
            .team_member_count(team_id)
            .await
            .map_err(|e| internal("Failed to count team members", e))?;
        if members != required {
            return Err(ServiceError::TeamSizeMismatch {
                required,
                format: tournament.format.as_str().to_string(),
            });
        }
    }

    // The store re-checks duplicate and capacity atomically; the checks above
    // only pick the error message.
    let registration = store
        .insert_participant(NewTournamentParticipant {
            tournament_id,
            team_id,
            status: REGISTERED.to_string(),
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict => ServiceError::AlreadyRegistered,
            StoreError::CapacityExceeded => ServiceError::CapacityExceeded,
            StoreError::NotFound => ServiceError::TournamentNotFound,
            other => internal("Failed to insert registration", other),
        })?;

    tracing::info!(
        "Team {team_id} registered for tournament {tournament_id} by user {}",
        caller.user_id
    );

    Ok(RegistrationOutcome {
        registration,
        participant_count: current + 1,
        message: "Tim berhasil didaftarkan ke turnamen".to_string(),
    })
}

/// Withdraws a team from a tournament before it starts.
///
/// Without `team_id` the caller's registered team is used, preferring one
/// they own or captain.
pub async fn unregister(
    store: &dyn Store,
    caller: Option<&CallerContext>,
    tournament_id: Uuid,
    team_id: Option<Uuid>,
) -> Result<UnregistrationOutcome, ServiceError> {
    let caller = require_caller(caller)?;
    let memberships = memberships_of(store, caller).await?;

    let team_id = match team_id {
        Some(team_id) => team_id,
        None => {
            let (led, joined): (Vec<&TeamMember>, Vec<&TeamMember>) =
                memberships.iter().partition(|m| m.role.is_leader());
            let mut found = None;
            for group in [led, joined] {
                let team_ids: Vec<Uuid> = group.iter().map(|m| m.team_id).collect();
                found = store
                    .registered_team(tournament_id, &team_ids)
                    .await
                    .map_err(|e| internal("Failed to look up registered team", e))?;
                if found.is_some() {
                    break;
                }
            }
            found.ok_or(ServiceError::NotRegistered)?
        }
    };
    require_leader(
        &memberships,
        team_id,
        ServiceError::NotTeamLeaderForUnregister,
    )?;

    let tournament = store
        .tournament(tournament_id)
        .await
        .map_err(|e| internal("Failed to load tournament", e))?
        .ok_or(ServiceError::TournamentNotFound)?;

    if tournament.has_started(chrono::Utc::now()) {
        return Err(ServiceError::UnregistrationClosed);
    }

    let deleted = store
        .delete_participant(tournament_id, team_id)
        .await
        .map_err(|e| internal("Failed to delete registration", e))?;
    if !deleted {
        return Err(ServiceError::NotRegistered);
    }

    tracing::info!(
        "Team {team_id} unregistered from tournament {tournament_id} by user {}",
        caller.user_id
    );

    Ok(UnregistrationOutcome {
        message: "Pendaftaran tim berhasil dibatalkan".to_string(),
    })
}

/// Whether any of the caller's teams is registered. Never fails: anonymous
/// callers and store errors read as not registered.
pub async fn registration_status(
    store: &dyn Store,
    caller: Option<&CallerContext>,
    tournament_id: Uuid,
) -> RegistrationStatus {
    let Some(caller) = caller else {
        return RegistrationStatus::not_registered();
    };
    let memberships = match store.team_memberships(caller.user_id).await {
        Ok(memberships) => memberships,
        Err(e) => {
            tracing::warn!("Failed to load memberships for registration status: {e}");
            return RegistrationStatus::not_registered();
        }
    };
    let team_ids: Vec<Uuid> = memberships.iter().map(|m| m.team_id).collect();
    match store.registered_team(tournament_id, &team_ids).await {
        Ok(Some(team_id)) => RegistrationStatus {
            is_registered: true,
            team_id: Some(team_id),
        },
        Ok(None) => RegistrationStatus::not_registered(),
        Err(e) => {
            tracing::warn!("Failed to read registration status: {e}");
            RegistrationStatus::not_registered()
        }
    }
}
