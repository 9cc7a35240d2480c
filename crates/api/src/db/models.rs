// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use juniper::GraphQLEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::*;
use super::ticket_types::{TicketTypes, TicketTypesError};

/// Status written for every ledger row created by a successful registration.
pub const REGISTERED: &str = "registered";

#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    GraphQLEnum,
)]
#[DbValueStyle = "snake_case"]
#[ExistingTypePath = "crate::db::schema::sql_types::TeamRole"]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Owner,
    Captain,
    Member,
}

impl TeamRole {
    /// Owners and captains may register or unregister their team.
    pub fn is_leader(&self) -> bool {
        matches!(self, TeamRole::Owner | TeamRole::Captain)
    }
}

#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    GraphQLEnum,
)]
#[ExistingTypePath = "crate::db::schema::sql_types::TournamentFormat"]
pub enum TournamentFormat {
    #[db_rename = "1v1"]
    #[serde(rename = "1v1")]
    OneVsOne,
    #[db_rename = "2v2"]
    #[serde(rename = "2v2")]
    TwoVsTwo,
    #[db_rename = "3v3"]
    #[serde(rename = "3v3")]
    ThreeVsThree,
    #[db_rename = "4v4"]
    #[serde(rename = "4v4")]
    FourVsFour,
    #[db_rename = "5v5"]
    #[serde(rename = "5v5")]
    FiveVsFive,
    #[db_rename = "custom"]
    #[serde(rename = "custom")]
    Custom,
}

impl TournamentFormat {
    /// Number of members a team needs for this format, `None` when unchecked.
    pub fn required_team_size(&self) -> Option<i64> {
        match self {
            TournamentFormat::OneVsOne => Some(1),
            TournamentFormat::TwoVsTwo => Some(2),
            TournamentFormat::ThreeVsThree => Some(3),
            TournamentFormat::FourVsFour => Some(4),
            TournamentFormat::FiveVsFive => Some(5),
            TournamentFormat::Custom => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentFormat::OneVsOne => "1v1",
            TournamentFormat::TwoVsTwo => "2v2",
            TournamentFormat::ThreeVsThree => "3v3",
            TournamentFormat::FourVsFour => "4v4",
            TournamentFormat::FiveVsFive => "5v5",
            TournamentFormat::Custom => "custom",
        }
    }
}

#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    GraphQLEnum,
)]
#[DbValueStyle = "snake_case"]
#[ExistingTypePath = "crate::db::schema::sql_types::CompetitionStatus"]
#[serde(rename_all = "snake_case")]
pub enum CompetitionStatus {
    Draft,
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    GraphQLEnum,
)]
#[DbValueStyle = "snake_case"]
#[ExistingTypePath = "crate::db::schema::sql_types::TicketStatus"]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Active,
    Used,
    Cancelled,
    Transferred,
}

impl TicketStatus {
    /// Only active tickets move, and never back to active.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (
                TicketStatus::Active,
                TicketStatus::Used | TicketStatus::Cancelled | TicketStatus::Transferred
            )
        )
    }
}

/* =========================
 * TEAMS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub game: String,
    pub recruiting: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, Serialize)]
#[diesel(table_name = team_members)]
#[diesel(primary_key(team_id, user_id))]
#[diesel(belongs_to(Team))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeamMember {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
}

/* =========================
 * TOURNAMENTS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = tournaments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tournament {
    pub id: Uuid,
    pub title: String,
    pub game: String,
    pub format: TournamentFormat,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    /// Shown to players only. Registration closes at `starts_at`.
    pub registration_deadline: Option<DateTime<Utc>>,
    /// 0 means unlimited.
    pub max_participants: i32,
    pub entry_fee: i64,
    pub status: CompetitionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.starts_at
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, Serialize)]
#[diesel(table_name = tournament_participants)]
#[diesel(belongs_to(Tournament))]
#[diesel(belongs_to(Team))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TournamentParticipant {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub team_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = tournament_participants)]
pub struct NewTournamentParticipant {
    pub tournament_id: Uuid,
    pub team_id: Uuid,
    pub status: String,
}

/* =========================
 * EVENTS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub max_participants: i32,
    /// Flat price used when no ticket-type map is configured.
    pub price: Option<i64>,
    /// Raw column; go through [`Event::ticket_types`].
    pub ticket_types: Option<serde_json::Value>,
    pub status: CompetitionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.starts_at
    }

    pub fn ticket_types(&self) -> Result<TicketTypes, TicketTypesError> {
        TicketTypes::from_column(self.ticket_types.as_ref(), self.price)
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, Serialize)]
#[diesel(table_name = event_registrations)]
#[diesel(belongs_to(Event))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventRegistration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = event_registrations)]
pub struct NewEventRegistration {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
}

/* =========================
 * TICKETS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, Serialize)]
#[diesel(table_name = tickets)]
#[diesel(belongs_to(Event))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Ticket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub ticket_type: String,
    pub price: i64,
    pub qr_code: String,
    pub status: TicketStatus,
    pub purchased_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub checked_in_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = tickets)]
pub struct NewTicket {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub ticket_type: String,
    pub price: i64,
    pub qr_code: String,
    pub status: TicketStatus,
}

/* =========================
 * FORUM
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = forum_topics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ForumTopic {
    pub id: Uuid,
    pub category_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub is_locked: bool,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, Serialize)]
#[diesel(table_name = forum_replies)]
#[diesel(belongs_to(ForumTopic, foreign_key = topic_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ForumReply {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = forum_replies)]
pub struct NewForumReply {
    pub topic_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_team_size() {
        assert_eq!(TournamentFormat::OneVsOne.required_team_size(), Some(1));
        assert_eq!(TournamentFormat::FiveVsFive.required_team_size(), Some(5));
        assert_eq!(TournamentFormat::Custom.required_team_size(), None);
    }

    #[test]
    fn test_format_serializes_as_db_value() {
        let json = serde_json::to_string(&TournamentFormat::ThreeVsThree).unwrap();
        assert_eq!(json, "\"3v3\"");
        let parsed: TournamentFormat = serde_json::from_str("\"custom\"").unwrap();
        assert_eq!(parsed, TournamentFormat::Custom);
    }

    #[test]
    fn test_ticket_transitions_only_leave_active() {
        use TicketStatus::*;
        assert!(Active.can_transition_to(Used));
        assert!(Active.can_transition_to(Cancelled));
        assert!(Active.can_transition_to(Transferred));
        assert!(!Active.can_transition_to(Active));
        for terminal in [Used, Cancelled, Transferred] {
            for next in [Active, Used, Cancelled, Transferred] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_leader_roles() {
        assert!(TeamRole::Owner.is_leader());
        assert!(TeamRole::Captain.is_leader());
        assert!(!TeamRole::Member.is_leader());
    }
}
