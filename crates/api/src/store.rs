// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use uuid::Uuid;

use crate::{
    db::models::{
        Event, EventRegistration, ForumReply, ForumTopic, NewEventRegistration, NewForumReply,
        NewTournamentParticipant, Team, TeamMember, Ticket, TicketStatus, Tournament,
        TournamentParticipant,
    },
    error::StoreError,
};

#[cfg(test)]
pub mod memory;
pub mod pg;

pub use pg::PgStore;

/// A ticket purchase, validated by the caller and applied atomically by the store.
#[derive(Debug, Clone)]
pub struct TicketPurchase {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub ticket_type: String,
    /// One code per ticket to issue.
    pub qr_codes: Vec<String>,
}

/// Data-store capability consumed by the services.
///
/// Operations documented as atomic must hold their invariant under concurrent
/// callers; the read helpers are plain lookups.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn team(&self, team_id: Uuid) -> Result<Option<Team>, StoreError>;

    /// Memberships of `user_id`, oldest first.
    async fn team_memberships(&self, user_id: Uuid) -> Result<Vec<TeamMember>, StoreError>;

    async fn team_member_count(&self, team_id: Uuid) -> Result<i64, StoreError>;

    async fn tournament(&self, tournament_id: Uuid) -> Result<Option<Tournament>, StoreError>;

    async fn participant(
        &self,
        tournament_id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<TournamentParticipant>, StoreError>;

    async fn participant_count(&self, tournament_id: Uuid) -> Result<i64, StoreError>;

    /// The first of `team_ids` registered for the tournament.
    async fn registered_team(
        &self,
        tournament_id: Uuid,
        team_ids: &[Uuid],
    ) -> Result<Option<Uuid>, StoreError>;

    /// Atomic. Reads the tournament's `max_participants` under a row lock and
    /// fails with `CapacityExceeded` once that many rows exist (0 = unlimited),
    /// `Conflict` on a duplicate and `NotFound` for an unknown tournament.
    async fn insert_participant(
        &self,
        participant: NewTournamentParticipant,
    ) -> Result<TournamentParticipant, StoreError>;

    /// Returns whether a row was removed.
    async fn delete_participant(&self, tournament_id: Uuid, team_id: Uuid)
    -> Result<bool, StoreError>;

    async fn event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError>;

    async fn event_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EventRegistration>, StoreError>;

    async fn event_registration_count(&self, event_id: Uuid) -> Result<i64, StoreError>;

    /// Atomic, same contract as [`Store::insert_participant`].
    async fn insert_event_registration(
        &self,
        registration: NewEventRegistration,
    ) -> Result<EventRegistration, StoreError>;

    async fn delete_event_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError>;

    /// Atomic. Reserves stock for the ticket type and inserts one active ticket
    /// per QR code. Fails with `SoldOut` when stock is short and `NotFound` for
    /// an unknown event or ticket type.
    async fn purchase_tickets(&self, purchase: TicketPurchase) -> Result<Vec<Ticket>, StoreError>;

    async fn ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError>;

    async fn tickets_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError>;

    /// Moves the ticket from `from` to `to`, or fails with `InvalidTransition`
    /// if it is no longer in `from`.
    async fn set_ticket_status(
        &self,
        ticket_id: Uuid,
        from: TicketStatus,
        to: TicketStatus,
    ) -> Result<Ticket, StoreError>;

    /// Atomic. Marks an active ticket transferred and issues a copy to `recipient`.
    async fn transfer_ticket(
        &self,
        ticket_id: Uuid,
        recipient: Uuid,
        qr_code: String,
    ) -> Result<Ticket, StoreError>;

    async fn topic(&self, topic_id: Uuid) -> Result<Option<ForumTopic>, StoreError>;

    async fn insert_reply(&self, reply: NewForumReply) -> Result<ForumReply, StoreError>;
}
