// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::graphql_object;

use crate::{
    db::models::{CompetitionStatus, Tournament, TournamentFormat, TournamentParticipant},
    error::{ServiceError, internal},
    graphql::{Context, parse_id},
    services::registration::{
        self, RegistrationOutcome, RegistrationStatus, UnregistrationOutcome,
    },
};

use super::{amount, count, timestamp};

#[graphql_object]
#[graphql(context = Context)]
impl Tournament {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn format(&self) -> TournamentFormat {
        self.format
    }

    pub fn starts_at(&self) -> String {
        timestamp(&self.starts_at)
    }

    pub fn ends_at(&self) -> Option<String> {
        self.ends_at.as_ref().map(timestamp)
    }

    /// Informational. Registration stays open until the tournament starts.
    pub fn registration_deadline(&self) -> Option<String> {
        self.registration_deadline.as_ref().map(timestamp)
    }

    /// 0 means unlimited.
    pub fn max_participants(&self) -> i32 {
        self.max_participants
    }

    pub fn entry_fee(&self) -> f64 {
        amount(self.entry_fee)
    }

    pub fn status(&self) -> CompetitionStatus {
        self.status
    }

    pub async fn participant_count(&self, context: &Context) -> Result<i32, ServiceError> {
        let participants = context
            .store()
            .participant_count(self.id)
            .await
            .map_err(|e| internal("Failed to count participants", e))?;
        Ok(count(participants))
    }
}

#[graphql_object]
#[graphql(context = Context)]
impl TournamentParticipant {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn tournament_id(&self) -> String {
        self.tournament_id.to_string()
    }

    pub fn team_id(&self) -> String {
        self.team_id.to_string()
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
impl RegistrationOutcome {
    pub fn success(&self) -> bool {
        true
    }

    pub fn registration(&self) -> TournamentParticipant {
        self.registration.clone()
    }

    pub fn participant_count(&self) -> i32 {
        count(self.participant_count)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[graphql_object]
#[graphql(context = Context)]
impl UnregistrationOutcome {
    pub fn success(&self) -> bool {
        true
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[graphql_object]
#[graphql(context = Context)]
impl RegistrationStatus {
    pub fn is_registered(&self) -> bool {
        self.is_registered
    }

    pub fn team_id(&self) -> Option<String> {
        self.team_id.map(|id| id.to_string())
    }
}

pub async fn get_tournament(
    context: &Context,
    tournament_id: String,
) -> Result<Option<Tournament>, ServiceError> {
    let tournament_id = parse_id(&tournament_id, "ID turnamen")?;
    context
        .store()
        .tournament(tournament_id)
        .await
        .map_err(|e| internal("Failed to load tournament", e))
}

pub async fn get_registration_status(
    context: &Context,
    tournament_id: String,
) -> Result<RegistrationStatus, ServiceError> {
    let tournament_id = parse_id(&tournament_id, "ID turnamen")?;
    Ok(registration::registration_status(context.store(), context.caller(), tournament_id).await)
}

pub async fn register_team(
    context: &Context,
    tournament_id: String,
    team_id: Option<String>,
) -> Result<RegistrationOutcome, ServiceError> {
    let tournament_id = parse_id(&tournament_id, "ID turnamen")?;
    let team_id = team_id
        .as_deref()
        .map(|raw| parse_id(raw, "ID tim"))
        .transpose()?;
    registration::register(context.store(), context.caller(), tournament_id, team_id).await
}

pub async fn unregister_team(
    context: &Context,
    tournament_id: String,
    team_id: Option<String>,
) -> Result<UnregistrationOutcome, ServiceError> {
    let tournament_id = parse_id(&tournament_id, "ID turnamen")?;
    let team_id = team_id
        .as_deref()
        .map(|raw| parse_id(raw, "ID tim"))
        .transpose()?;
    registration::unregister(context.store(), context.caller(), tournament_id, team_id).await
}
