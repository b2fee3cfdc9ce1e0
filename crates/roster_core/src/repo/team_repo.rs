//! Team repository contract and SQLite implementation.
//!
//! # Invariants
//! - Teams never own members: deleting a team does not touch member rows,
//!   and SQLite rejects the delete while members still reference it.

use super::error::{RepoError, RepoResult};
use super::member_repo::query_members;
use super::readiness::ensure_connection_ready;
use crate::model::member::Member;
use crate::model::team::{Team, TeamId};
use crate::query::page::Sort;
use crate::query::spec::MemberSpec;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for team persistence.
pub trait TeamRepository {
    /// Inserts a transient team or renames a persisted one.
    fn save(&self, team: &mut Team) -> RepoResult<TeamId>;
    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>>;
    fn find_all(&self) -> RepoResult<Vec<Team>>;
    fn count(&self) -> RepoResult<u64>;
    /// Transient or already-removed teams are a silent no-op.
    ///
    /// # Errors
    /// - `ConstraintViolation` while members still reference the team.
    fn delete(&self, team: &Team) -> RepoResult<()>;
    /// Reverse side of the member→team association, in insertion order.
    fn list_members(&self, team_id: TeamId) -> RepoResult<Vec<Member>>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Binds to a connection whose readiness was already checked.
    pub(crate) fn bound_to(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn save(&self, team: &mut Team) -> RepoResult<TeamId> {
        team.validate()?;

        let Some(id) = team.id else {
            self.conn.execute(
                "INSERT INTO teams (name) VALUES (?1);",
                [team.name.as_str()],
            )?;
            let id = self.conn.last_insert_rowid();
            team.id = Some(id);
            return Ok(id);
        };

        let changed = self.conn.execute(
            "UPDATE teams SET name = ?1 WHERE team_id = ?2;",
            params![team.name.as_str(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::TeamNotFound(id));
        }
        Ok(id)
    }

    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>> {
        find_team(self.conn, id)
    }

    fn find_all(&self) -> RepoResult<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare("SELECT team_id, name FROM teams ORDER BY team_id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut teams = Vec::new();
        while let Some(row) = rows.next()? {
            teams.push(parse_team_row(row)?);
        }
        Ok(teams)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM teams;", [], |row| row.get(0))?;
        u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative count {count}")))
    }

    fn delete(&self, team: &Team) -> RepoResult<()> {
        if let Some(id) = team.id {
            self.conn
                .execute("DELETE FROM teams WHERE team_id = ?1;", [id])?;
        }
        Ok(())
    }

    fn list_members(&self, team_id: TeamId) -> RepoResult<Vec<Member>> {
        query_members(
            self.conn,
            &MemberSpec::team_is(team_id),
            &Sort::unsorted(),
            None,
        )
    }
}

/// Loads one team row; shared with the lazy resolver.
pub(crate) fn find_team(conn: &Connection, id: TeamId) -> RepoResult<Option<Team>> {
    let team = conn
        .query_row(
            "SELECT team_id, name FROM teams WHERE team_id = ?1;",
            [id],
            |row| Ok((row.get::<_, TeamId>("team_id")?, row.get::<_, String>("name")?)),
        )
        .optional()?;

    match team {
        Some((id, name)) => {
            let team = Team { id: Some(id), name };
            team.validate()?;
            Ok(Some(team))
        }
        None => Ok(None),
    }
}

fn parse_team_row(row: &Row<'_>) -> RepoResult<Team> {
    let team = Team {
        id: Some(row.get("team_id")?),
        name: row.get("name")?,
    };
    team.validate()?;
    Ok(team)
}
