// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use diesel::prelude::*;
use diesel_async::{
    AsyncConnection, AsyncPgConnection, RunQueryDsl, scoped_futures::ScopedFutureExt,
};
use uuid::Uuid;

use crate::{
    db::{
        DbPool,
        models::{
            Event, EventRegistration, ForumReply, ForumTopic, NewEventRegistration,
            NewForumReply, NewTicket, NewTournamentParticipant, Team, TeamMember, Ticket,
            TicketStatus, Tournament, TournamentParticipant,
        },
        schema::{
            event_registrations, events, forum_replies, forum_topics, team_members, teams,
            tickets, tournament_participants, tournaments,
        },
        ticket_types::ReserveError,
    },
    error::StoreError,
    store::{Store, TicketPurchase},
};

/// PostgreSQL-backed [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn get_db_conn(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, AsyncPgConnection>,
        StoreError,
    > {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Backend(format!("failed to get DB connection: {e}")))
    }
}

/// Fails with `CapacityExceeded` when `current` has reached a non-zero `max`.
fn check_capacity(current: i64, max_participants: i32) -> Result<(), StoreError> {
    if max_participants > 0 && current >= i64::from(max_participants) {
        return Err(StoreError::CapacityExceeded);
    }
    Ok(())
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn team(&self, team_id: Uuid) -> Result<Option<Team>, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(teams::table
            .filter(teams::id.eq(team_id))
            .select(Team::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn team_memberships(&self, user_id: Uuid) -> Result<Vec<TeamMember>, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(team_members::table
            .filter(team_members::user_id.eq(user_id))
            .order_by(team_members::joined_at.asc())
            .select(TeamMember::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn team_member_count(&self, team_id: Uuid) -> Result<i64, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(team_members::table
            .filter(team_members::team_id.eq(team_id))
            .count()
            .get_result(&mut conn)
            .await?)
    }

    async fn tournament(&self, tournament_id: Uuid) -> Result<Option<Tournament>, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(tournaments::table
            .filter(tournaments::id.eq(tournament_id))
            .select(Tournament::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn participant(
        &self,
        tournament_id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<TournamentParticipant>, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(tournament_participants::table
            .filter(tournament_participants::tournament_id.eq(tournament_id))
            .filter(tournament_participants::team_id.eq(team_id))
            .select(TournamentParticipant::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn participant_count(&self, tournament_id: Uuid) -> Result<i64, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(tournament_participants::table
            .filter(tournament_participants::tournament_id.eq(tournament_id))
            .count()
            .get_result(&mut conn)
            .await?)
    }

    async fn registered_team(
        &self,
        tournament_id: Uuid,
        team_ids: &[Uuid],
    ) -> Result<Option<Uuid>, StoreError> {
        if team_ids.is_empty() {
            return Ok(None);
        }
        let mut conn = self.get_db_conn().await?;
        Ok(tournament_participants::table
            .filter(tournament_participants::tournament_id.eq(tournament_id))
            .filter(tournament_participants::team_id.eq_any(team_ids.to_vec()))
            .order_by(tournament_participants::created_at.asc())
            .select(tournament_participants::team_id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()?)
    }

    async fn insert_participant(
        &self,
        participant: NewTournamentParticipant,
    ) -> Result<TournamentParticipant, StoreError> {
        let mut pooled = self.get_db_conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(move |conn| {
            async move {
                // Serializes registrations for this tournament until commit.
                let max_participants: i32 = tournaments::table
                    .filter(tournaments::id.eq(participant.tournament_id))
                    .select(tournaments::max_participants)
                    .for_update()
                    .first(conn)
                    .await?;

                let current: i64 = tournament_participants::table
                    .filter(tournament_participants::tournament_id.eq(participant.tournament_id))
                    .count()
                    .get_result(conn)
                    .await?;
                check_capacity(current, max_participants)?;

                Ok(diesel::insert_into(tournament_participants::table)
                    .values(&participant)
                    .returning(TournamentParticipant::as_returning())
                    .get_result(conn)
                    .await?)
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete_participant(
        &self,
        tournament_id: Uuid,
        team_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut conn = self.get_db_conn().await?;
        let deleted = diesel::delete(
            tournament_participants::table
                .filter(tournament_participants::tournament_id.eq(tournament_id))
                .filter(tournament_participants::team_id.eq(team_id)),
        )
        .execute(&mut conn)
        .await?;
        Ok(deleted > 0)
    }

    async fn event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(events::table
            .filter(events::id.eq(event_id))
            .select(Event::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn event_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EventRegistration>, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(event_registrations::table
            .filter(event_registrations::event_id.eq(event_id))
            .filter(event_registrations::user_id.eq(user_id))
            .select(EventRegistration::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn event_registration_count(&self, event_id: Uuid) -> Result<i64, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(event_registrations::table
            .filter(event_registrations::event_id.eq(event_id))
            .count()
            .get_result(&mut conn)
            .await?)
    }

    async fn insert_event_registration(
        &self,
        registration: NewEventRegistration,
    ) -> Result<EventRegistration, StoreError> {
        let mut pooled = self.get_db_conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(move |conn| {
            async move {
                let max_participants: i32 = events::table
                    .filter(events::id.eq(registration.event_id))
                    .select(events::max_participants)
                    .for_update()
                    .first(conn)
                    .await?;

                let current: i64 = event_registrations::table
                    .filter(event_registrations::event_id.eq(registration.event_id))
                    .count()
                    .get_result(conn)
                    .await?;
                check_capacity(current, max_participants)?;

                Ok(diesel::insert_into(event_registrations::table)
                    .values(&registration)
                    .returning(EventRegistration::as_returning())
                    .get_result(conn)
                    .await?)
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete_event_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut conn = self.get_db_conn().await?;
        let deleted = diesel::delete(
            event_registrations::table
                .filter(event_registrations::event_id.eq(event_id))
                .filter(event_registrations::user_id.eq(user_id)),
        )
        .execute(&mut conn)
        .await?;
        Ok(deleted > 0)
    }

    async fn purchase_tickets(&self, purchase: TicketPurchase) -> Result<Vec<Ticket>, StoreError> {
        let mut pooled = self.get_db_conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(move |conn| {
            async move {
                let event: Event = events::table
                    .filter(events::id.eq(purchase.event_id))
                    .select(Event::as_select())
                    .for_update()
                    .first(conn)
                    .await?;

                let mut types = event
                    .ticket_types()
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                let quantity = purchase.qr_codes.len() as i64;
                let spec = types
                    .reserve(&purchase.ticket_type, quantity)
                    .map_err(|e| match e {
                        ReserveError::SoldOut => StoreError::SoldOut,
                        ReserveError::UnknownType(_) => StoreError::NotFound,
                        ReserveError::PriceOverflow => StoreError::AmountOverflow,
                    })?;

                if !types.is_implicit() {
                    diesel::update(events::table.filter(events::id.eq(event.id)))
                        .set((
                            events::ticket_types.eq(Some(types.to_column())),
                            events::updated_at.eq(chrono::Utc::now()),
                        ))
                        .execute(conn)
                        .await?;
                }

                let new_tickets: Vec<NewTicket> = purchase
                    .qr_codes
                    .into_iter()
                    .map(|qr_code| NewTicket {
                        event_id: purchase.event_id,
                        user_id: purchase.user_id,
                        ticket_type: purchase.ticket_type.clone(),
                        price: spec.price,
                        qr_code,
                        status: TicketStatus::Active,
                    })
                    .collect();

                Ok(diesel::insert_into(tickets::table)
                    .values(&new_tickets)
                    .returning(Ticket::as_returning())
                    .get_results(conn)
                    .await?)
            }
            .scope_boxed()
        })
        .await
    }

    async fn ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(tickets::table
            .filter(tickets::id.eq(ticket_id))
            .select(Ticket::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn tickets_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(tickets::table
            .filter(tickets::user_id.eq(user_id))
            .order_by(tickets::purchased_at.desc())
            .select(Ticket::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn set_ticket_status(
        &self,
        ticket_id: Uuid,
        from: TicketStatus,
        to: TicketStatus,
    ) -> Result<Ticket, StoreError> {
        let mut conn = self.get_db_conn().await?;
        let target = tickets::table
            .filter(tickets::id.eq(ticket_id))
            .filter(tickets::status.eq(from));
        let updated = if to == TicketStatus::Used {
            diesel::update(target)
                .set((
                    tickets::status.eq(to),
                    tickets::used_at.eq(Some(chrono::Utc::now())),
                ))
                .returning(Ticket::as_returning())
                .get_result(&mut conn)
                .await
                .optional()?
        } else {
            diesel::update(target)
                .set(tickets::status.eq(to))
                .returning(Ticket::as_returning())
                .get_result(&mut conn)
                .await
                .optional()?
        };
        updated.ok_or(StoreError::InvalidTransition)
    }

    async fn transfer_ticket(
        &self,
        ticket_id: Uuid,
        recipient: Uuid,
        qr_code: String,
    ) -> Result<Ticket, StoreError> {
        let mut pooled = self.get_db_conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(move |conn| {
            async move {
                let source: Ticket = diesel::update(
                    tickets::table
                        .filter(tickets::id.eq(ticket_id))
                        .filter(tickets::status.eq(TicketStatus::Active)),
                )
                .set(tickets::status.eq(TicketStatus::Transferred))
                .returning(Ticket::as_returning())
                .get_result(conn)
                .await
                .optional()?
                .ok_or(StoreError::InvalidTransition)?;

                Ok(diesel::insert_into(tickets::table)
                    .values(&NewTicket {
                        event_id: source.event_id,
                        user_id: recipient,
                        ticket_type: source.ticket_type,
                        price: source.price,
                        qr_code,
                        status: TicketStatus::Active,
                    })
                    .returning(Ticket::as_returning())
                    .get_result(conn)
                    .await?)
            }
            .scope_boxed()
        })
        .await
    }

    async fn topic(&self, topic_id: Uuid) -> Result<Option<ForumTopic>, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(forum_topics::table
            .filter(forum_topics::id.eq(topic_id))
            .select(ForumTopic::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn insert_reply(&self, reply: NewForumReply) -> Result<ForumReply, StoreError> {
        let mut conn = self.get_db_conn().await?;
        Ok(diesel::insert_into(forum_replies::table)
            .values(&reply)
            .returning(ForumReply::as_returning())
            .get_result(&mut conn)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_capacity() {
        assert!(check_capacity(0, 0).is_ok());
        assert!(check_capacity(1000, 0).is_ok());
        assert!(check_capacity(1, 2).is_ok());
        assert!(matches!(
            check_capacity(2, 2),
            Err(StoreError::CapacityExceeded)
        ));
    }
}
