// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use uuid::Uuid;

use crate::{
    auth::CallerContext,
    db::models::{Team, TeamMember},
    error::{ServiceError, internal},
    store::Store,
};

pub fn require_caller(caller: Option<&CallerContext>) -> Result<&CallerContext, ServiceError> {
    caller.ok_or(ServiceError::Unauthenticated)
}

/// Picks the team used when a request names none: the first team the caller
/// owns or captains, otherwise the first team they joined.
pub fn resolve_default_team(memberships: &[TeamMember]) -> Option<Uuid> {
    memberships
        .iter()
        .find(|m| m.role.is_leader())
        .or_else(|| memberships.first())
        .map(|m| m.team_id)
}

/// Fails with `denied` unless the caller owns or captains `team_id`.
pub fn require_leader(
    memberships: &[TeamMember],
    team_id: Uuid,
    denied: ServiceError,
) -> Result<(), ServiceError> {
    match memberships.iter().find(|m| m.team_id == team_id) {
        Some(membership) if membership.role.is_leader() => Ok(()),
        _ => Err(denied),
    }
}

pub async fn memberships_of(
    store: &dyn Store,
    caller: &CallerContext,
) -> Result<Vec<TeamMember>, ServiceError> {
    store
        .team_memberships(caller.user_id)
        .await
        .map_err(|e| internal("Failed to load team memberships", e))
}

pub async fn my_teams(
    store: &dyn Store,
    caller: Option<&CallerContext>,
) -> Result<Vec<Team>, ServiceError> {
    let caller = require_caller(caller)?;
    let mut teams = Vec::new();
    for membership in memberships_of(store, caller).await? {
        if let Some(team) = store
            .team(membership.team_id)
            .await
            .map_err(|e| internal("Failed to load team", e))?
        {
            teams.push(team);
        }
    }
    Ok(teams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::UserRole, db::models::TeamRole, store::memory::MemoryStore};

    fn membership(team_id: Uuid, role: TeamRole, offset: i64) -> TeamMember {
        TeamMember {
            team_id,
            user_id: Uuid::nil(),
            role,
            joined_at: chrono::Utc::now() + chrono::Duration::seconds(offset),
        }
    }

    #[test]
    fn test_default_team_prefers_leader_role() {
        let member_of = Uuid::now_v7();
        let captain_of = Uuid::now_v7();
        let memberships = vec![
            membership(member_of, TeamRole::Member, 0),
            membership(captain_of, TeamRole::Captain, 1),
        ];
        assert_eq!(resolve_default_team(&memberships), Some(captain_of));
    }

    #[test]
    fn test_default_team_falls_back_to_first_membership() {
        let first = Uuid::now_v7();
        let memberships = vec![
            membership(first, TeamRole::Member, 0),
            membership(Uuid::now_v7(), TeamRole::Member, 1),
        ];
        assert_eq!(resolve_default_team(&memberships), Some(first));
        assert_eq!(resolve_default_team(&[]), None);
    }

    #[test]
    fn test_require_leader() {
        let team = Uuid::now_v7();
        let owner = vec![membership(team, TeamRole::Owner, 0)];
        let member = vec![membership(team, TeamRole::Member, 0)];
        assert!(require_leader(&owner, team, ServiceError::NotTeamLeader).is_ok());
        assert_eq!(
            require_leader(&member, team, ServiceError::NotTeamLeader),
            Err(ServiceError::NotTeamLeader)
        );
        assert_eq!(
            require_leader(&owner, Uuid::now_v7(), ServiceError::NotTeamLeader),
            Err(ServiceError::NotTeamLeader)
        );
    }

    #[tokio::test]
    async fn test_my_teams() {
        let store = MemoryStore::new();
        let user = Uuid::now_v7();
        let team = store.add_team(&[(user, TeamRole::Member)]).await;
        store.add_team(&[(Uuid::now_v7(), TeamRole::Owner)]).await;
        let caller = CallerContext {
            user_id: user,
            role: UserRole::Member,
            username: "budi".to_string(),
        };

        let teams = my_teams(&store, Some(&caller)).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].id, team);
        assert_eq!(
            my_teams(&store, None).await.unwrap_err(),
            ServiceError::Unauthenticated
        );
    }
}
