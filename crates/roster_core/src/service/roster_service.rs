//! Roster use-case service.
//!
//! # Responsibility
//! - Provide use-case entry points for registering members, forming teams
//!   and running roster-wide updates.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - The service stays storage-agnostic.

use crate::model::member::{Member, MemberDto};
use crate::model::team::Team;
use crate::query::page::{Page, PageRequest};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::member_repo::MemberRepository;
use crate::repo::team_repo::TeamRepository;

/// Use-case wrapper over member and team repositories.
pub struct RosterService<M: MemberRepository, T: TeamRepository> {
    members: M,
    teams: T,
}

impl<M: MemberRepository, T: TeamRepository> RosterService<M, T> {
    pub fn new(members: M, teams: T) -> Self {
        Self { members, teams }
    }

    /// Saves a new member and returns it with its assigned id.
    pub fn register_member(&self, username: impl Into<String>, age: i64) -> RepoResult<Member> {
        let mut member = Member::with_age(username, age);
        self.members.save(&mut member)?;
        Ok(member)
    }

    /// Saves a new team and returns it with its assigned id.
    pub fn found_team(&self, name: impl Into<String>) -> RepoResult<Team> {
        let mut team = Team::new(name);
        self.teams.save(&mut team)?;
        Ok(team)
    }

    /// Moves `member` into `team` and persists the change.
    ///
    /// On failure `member` keeps its previous team reference.
    pub fn join_team(&self, member: &mut Member, team: &Team) -> RepoResult<()> {
        let previous = member.team.clone();
        member.change_team(team);
        if let Err(err) = self.members.save(member) {
            member.team = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn members_by_age(&self, age: i64, request: &PageRequest) -> RepoResult<Page<Member>> {
        self.members.find_by_age(age, request)
    }

    /// Ages every member at or above `threshold` by one year.
    pub fn age_up(&self, threshold: i64) -> RepoResult<usize> {
        self.members.bulk_age_plus(threshold)
    }

    pub fn roster_with_teams(&self) -> RepoResult<Vec<MemberDto>> {
        self.members.find_member_dtos()
    }

    /// Lists the members currently in `team`.
    pub fn team_roster(&self, team: &Team) -> RepoResult<Vec<Member>> {
        let team_id = team.id.ok_or(RepoError::TransientEntity("team"))?;
        self.teams.list_members(team_id)
    }
}
