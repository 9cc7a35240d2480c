// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory [`Store`] for service tests. Every operation runs under one lock,
//! which gives the atomic operations the same guarantees as the database.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    db::{
        models::{
            CompetitionStatus, Event, EventRegistration, ForumReply, ForumTopic,
            NewEventRegistration, NewForumReply, NewTournamentParticipant, Team, TeamMember,
            TeamRole, Ticket, TicketStatus, Tournament, TournamentFormat, TournamentParticipant,
        },
        ticket_types::ReserveError,
    },
    error::StoreError,
    store::{Store, TicketPurchase},
};

#[derive(Default)]
struct Tables {
    teams: Vec<Team>,
    team_members: Vec<TeamMember>,
    tournaments: Vec<Tournament>,
    participants: Vec<TournamentParticipant>,
    events: Vec<Event>,
    event_registrations: Vec<EventRegistration>,
    tickets: Vec<Ticket>,
    topics: Vec<ForumTopic>,
    replies: Vec<ForumReply>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

pub fn tournament_fixture(
    format: TournamentFormat,
    max_participants: i32,
    starts_at: DateTime<Utc>,
) -> Tournament {
    let now = Utc::now();
    Tournament {
        id: Uuid::now_v7(),
        title: "Cup A".to_string(),
        game: "Mobile Legends".to_string(),
        format,
        starts_at,
        ends_at: Some(starts_at + Duration::hours(6)),
        registration_deadline: Some(starts_at - Duration::hours(12)),
        max_participants,
        entry_fee: 0,
        status: CompetitionStatus::Upcoming,
        created_at: now,
        updated_at: now,
    }
}

pub fn event_fixture(
    ticket_types: Option<serde_json::Value>,
    price: Option<i64>,
    starts_at: DateTime<Utc>,
) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::now_v7(),
        title: "Community Meetup".to_string(),
        location: Some("Jakarta".to_string()),
        starts_at,
        ends_at: None,
        max_participants: 0,
        price,
        ticket_types,
        status: CompetitionStatus::Upcoming,
        created_at: now,
        updated_at: now,
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a team whose members join in the given order.
    pub async fn add_team(&self, members: &[(Uuid, TeamRole)]) -> Uuid {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let team = Team {
            id: Uuid::now_v7(),
            name: format!("Team {}", tables.teams.len() + 1),
            game: "Mobile Legends".to_string(),
            recruiting: false,
            created_at: now,
            updated_at: now,
        };
        for (offset, (user_id, role)) in members.iter().enumerate() {
            tables.team_members.push(TeamMember {
                team_id: team.id,
                user_id: *user_id,
                role: *role,
                joined_at: now + Duration::milliseconds(offset as i64),
            });
        }
        let id = team.id;
        tables.teams.push(team);
        id
    }

    pub async fn add_tournament(&self, tournament: Tournament) -> Uuid {
        let id = tournament.id;
        self.tables.lock().await.tournaments.push(tournament);
        id
    }

    pub async fn add_event(&self, event: Event) -> Uuid {
        let id = event.id;
        self.tables.lock().await.events.push(event);
        id
    }

    pub async fn add_topic(&self, is_locked: bool) -> Uuid {
        let now = Utc::now();
        let topic = ForumTopic {
            id: Uuid::now_v7(),
            category_id: Uuid::now_v7(),
            author_id: Uuid::now_v7(),
            title: "Jadwal scrim".to_string(),
            body: "Siapa yang ikut?".to_string(),
            is_locked,
            is_pinned: false,
            created_at: now,
            updated_at: now,
        };
        let id = topic.id;
        self.tables.lock().await.topics.push(topic);
        id
    }

    pub async fn stored_event(&self, event_id: Uuid) -> Option<Event> {
        self.tables
            .lock()
            .await
            .events
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
    }
}

fn check_capacity(current: usize, max_participants: i32) -> Result<(), StoreError> {
    if max_participants > 0 && current >= max_participants as usize {
        return Err(StoreError::CapacityExceeded);
    }
    Ok(())
}

fn issue_ticket(
    event_id: Uuid,
    user_id: Uuid,
    ticket_type: String,
    price: i64,
    qr_code: String,
) -> Ticket {
    Ticket {
        id: Uuid::now_v7(),
        event_id,
        user_id,
        ticket_type,
        price,
        qr_code,
        status: TicketStatus::Active,
        purchased_at: Utc::now(),
        used_at: None,
        checked_in_at: None,
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn team(&self, team_id: Uuid) -> Result<Option<Team>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.teams.iter().find(|t| t.id == team_id).cloned())
    }

    async fn team_memberships(&self, user_id: Uuid) -> Result<Vec<TeamMember>, StoreError> {
        let tables = self.tables.lock().await;
        let mut memberships: Vec<TeamMember> = tables
            .team_members
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        memberships.sort_by_key(|m| m.joined_at);
        Ok(memberships)
    }

    async fn team_member_count(&self, team_id: Uuid) -> Result<i64, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .team_members
            .iter()
            .filter(|m| m.team_id == team_id)
            .count() as i64)
    }

    async fn tournament(&self, tournament_id: Uuid) -> Result<Option<Tournament>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tournaments
            .iter()
            .find(|t| t.id == tournament_id)
            .cloned())
    }

    async fn participant(
        &self,
        tournament_id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<TournamentParticipant>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .participants
            .iter()
            .find(|p| p.tournament_id == tournament_id && p.team_id == team_id)
            .cloned())
    }

    async fn participant_count(&self, tournament_id: Uuid) -> Result<i64, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .participants
            .iter()
            .filter(|p| p.tournament_id == tournament_id)
            .count() as i64)
    }

    async fn registered_team(
        &self,
        tournament_id: Uuid,
        team_ids: &[Uuid],
    ) -> Result<Option<Uuid>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .participants
            .iter()
            .find(|p| p.tournament_id == tournament_id && team_ids.contains(&p.team_id))
            .map(|p| p.team_id))
    }

    async fn insert_participant(
        &self,
        participant: NewTournamentParticipant,
    ) -> Result<TournamentParticipant, StoreError> {
        let mut tables = self.tables.lock().await;
        let max_participants = tables
            .tournaments
            .iter()
            .find(|t| t.id == participant.tournament_id)
            .map(|t| t.max_participants)
            .ok_or(StoreError::NotFound)?;
        if tables.participants.iter().any(|p| {
            p.tournament_id == participant.tournament_id && p.team_id == participant.team_id
        }) {
            return Err(StoreError::Conflict);
        }
        let current = tables
            .participants
            .iter()
            .filter(|p| p.tournament_id == participant.tournament_id)
            .count();
        check_capacity(current, max_participants)?;

        let row = TournamentParticipant {
            id: Uuid::now_v7(),
            tournament_id: participant.tournament_id,
            team_id: participant.team_id,
            status: participant.status,
            created_at: Utc::now(),
        };
        tables.participants.push(row.clone());
        Ok(row)
    }

    async fn delete_participant(
        &self,
        tournament_id: Uuid,
        team_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.participants.len();
        tables
            .participants
            .retain(|p| !(p.tournament_id == tournament_id && p.team_id == team_id));
        Ok(tables.participants.len() < before)
    }

    async fn event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.events.iter().find(|e| e.id == event_id).cloned())
    }

    async fn event_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EventRegistration>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .event_registrations
            .iter()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
            .cloned())
    }

    async fn event_registration_count(&self, event_id: Uuid) -> Result<i64, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .event_registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .count() as i64)
    }

    async fn insert_event_registration(
        &self,
        registration: NewEventRegistration,
    ) -> Result<EventRegistration, StoreError> {
        let mut tables = self.tables.lock().await;
        let max_participants = tables
            .events
            .iter()
            .find(|e| e.id == registration.event_id)
            .map(|e| e.max_participants)
            .ok_or(StoreError::NotFound)?;
        if tables
            .event_registrations
            .iter()
            .any(|r| r.event_id == registration.event_id && r.user_id == registration.user_id)
        {
            return Err(StoreError::Conflict);
        }
        let current = tables
            .event_registrations
            .iter()
            .filter(|r| r.event_id == registration.event_id)
            .count();
        check_capacity(current, max_participants)?;

        let row = EventRegistration {
            id: Uuid::now_v7(),
            event_id: registration.event_id,
            user_id: registration.user_id,
            status: registration.status,
            created_at: Utc::now(),
        };
        tables.event_registrations.push(row.clone());
        Ok(row)
    }

    async fn delete_event_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.event_registrations.len();
        tables
            .event_registrations
            .retain(|r| !(r.event_id == event_id && r.user_id == user_id));
        Ok(tables.event_registrations.len() < before)
    }

    async fn purchase_tickets(&self, purchase: TicketPurchase) -> Result<Vec<Ticket>, StoreError> {
        let mut tables = self.tables.lock().await;
        let event = tables
            .events
            .iter_mut()
            .find(|e| e.id == purchase.event_id)
            .ok_or(StoreError::NotFound)?;
        let mut types = event
            .ticket_types()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let spec = types
            .reserve(&purchase.ticket_type, purchase.qr_codes.len() as i64)
            .map_err(|e| match e {
                ReserveError::SoldOut => StoreError::SoldOut,
                ReserveError::UnknownType(_) => StoreError::NotFound,
                ReserveError::PriceOverflow => StoreError::AmountOverflow,
            })?;
        if !types.is_implicit() {
            event.ticket_types = Some(types.to_column());
        }

        let issued: Vec<Ticket> = purchase
            .qr_codes
            .into_iter()
            .map(|qr_code| {
                issue_ticket(
                    purchase.event_id,
                    purchase.user_id,
                    purchase.ticket_type.clone(),
                    spec.price,
                    qr_code,
                )
            })
            .collect();
        tables.tickets.extend(issued.iter().cloned());
        Ok(issued)
    }

    async fn ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.tickets.iter().find(|t| t.id == ticket_id).cloned())
    }

    async fn tickets_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tickets
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn set_ticket_status(
        &self,
        ticket_id: Uuid,
        from: TicketStatus,
        to: TicketStatus,
    ) -> Result<Ticket, StoreError> {
        let mut tables = self.tables.lock().await;
        let ticket = tables
            .tickets
            .iter_mut()
            .find(|t| t.id == ticket_id && t.status == from)
            .ok_or(StoreError::InvalidTransition)?;
        ticket.status = to;
        if to == TicketStatus::Used {
            ticket.used_at = Some(Utc::now());
        }
        Ok(ticket.clone())
    }

    async fn transfer_ticket(
        &self,
        ticket_id: Uuid,
        recipient: Uuid,
        qr_code: String,
    ) -> Result<Ticket, StoreError> {
        let mut tables = self.tables.lock().await;
        let source = tables
            .tickets
            .iter_mut()
            .find(|t| t.id == ticket_id && t.status == TicketStatus::Active)
            .ok_or(StoreError::InvalidTransition)?;
        source.status = TicketStatus::Transferred;
        let copy = issue_ticket(
            source.event_id,
            recipient,
            source.ticket_type.clone(),
            source.price,
            qr_code,
        );
        tables.tickets.push(copy.clone());
        Ok(copy)
    }

    async fn topic(&self, topic_id: Uuid) -> Result<Option<ForumTopic>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.topics.iter().find(|t| t.id == topic_id).cloned())
    }

    async fn insert_reply(&self, reply: NewForumReply) -> Result<ForumReply, StoreError> {
        let mut tables = self.tables.lock().await;
        let row = ForumReply {
            id: Uuid::now_v7(),
            topic_id: reply.topic_id,
            author_id: reply.author_id,
            body: reply.body,
            created_at: Utc::now(),
        };
        tables.replies.push(row.clone());
        Ok(row)
    }
}
