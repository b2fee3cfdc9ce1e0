//! Lazy resolution of a member's team.
//!
//! # Responsibility
//! - Turn `TeamRef::Lazy` into a team row on first access.
//! - Count the lookups it performs so callers can compare lazy loading
//!   against `find_members_fetch_join`.
//!
//! # Invariants
//! - `TeamRef::Loaded` never triggers a lookup.
//! - A reference to a missing row is reported, never silently dropped.

use super::error::{RepoError, RepoResult};
use super::team_repo::find_team;
use crate::model::member::{Member, TeamRef};
use crate::model::team::{Team, TeamId};
use log::debug;
use rusqlite::Connection;
use std::cell::Cell;

/// Resolves member→team references against one connection.
pub struct TeamResolver<'conn> {
    conn: &'conn Connection,
    lookups: Cell<u64>,
}

impl<'conn> TeamResolver<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            lookups: Cell::new(0),
        }
    }

    /// Returns the member's team, querying the store only for lazy refs.
    ///
    /// # Errors
    /// - `DanglingTeam` when the referenced row no longer exists.
    pub fn resolve_team(&self, member: &Member) -> RepoResult<Option<Team>> {
        match &member.team {
            TeamRef::Unassigned => Ok(None),
            TeamRef::Loaded { team } => Ok(Some(team.clone())),
            TeamRef::Lazy { team_id } => self.lookup(member, *team_id).map(Some),
        }
    }

    /// Upgrades a lazy reference in place to `TeamRef::Loaded`.
    pub fn load_team(&self, member: &mut Member) -> RepoResult<()> {
        if let TeamRef::Lazy { team_id } = member.team {
            let team = self.lookup(member, team_id)?;
            member.team = TeamRef::Loaded { team };
        }
        Ok(())
    }

    /// Number of team lookups issued so far.
    pub fn lookups(&self) -> u64 {
        self.lookups.get()
    }

    fn lookup(&self, member: &Member, team_id: TeamId) -> RepoResult<Team> {
        self.lookups.set(self.lookups.get() + 1);
        debug!(
            "event=team_lookup module=repo status=start member_id={:?} team_id={}",
            member.id, team_id
        );
        find_team(self.conn, team_id)?.ok_or(RepoError::DanglingTeam {
            member_id: member.id,
            team_id,
        })
    }
}
