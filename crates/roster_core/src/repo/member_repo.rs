//! Member repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, predicate queries, paging and bulk updates over `members`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Member::validate()` before any SQL mutation.
//! - Ids come from `AUTOINCREMENT` and are never handed out twice.
//! - Bulk updates run as one statement; entities loaded earlier are stale
//!   until `refresh` is called.

use super::error::{RepoError, RepoResult};
use super::readiness::ensure_connection_ready;
use crate::model::member::{Member, MemberDto, MemberId, TeamRef};
use crate::model::team::{Team, TeamId};
use crate::query::page::{Direction, MemberProperty, Page, PageRequest, Sort};
use crate::query::spec::MemberSpec;
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::time::Instant;

const MEMBER_SELECT_SQL: &str = "SELECT
    m.member_id AS member_id,
    m.username AS username,
    m.age AS age,
    m.team_id AS team_id
FROM members m";

const MEMBER_FETCH_JOIN_SQL: &str = "SELECT
    m.member_id AS member_id,
    m.username AS username,
    m.age AS age,
    m.team_id AS team_id,
    t.team_id AS joined_team_id,
    t.name AS team_name
FROM members m
LEFT JOIN teams t ON t.team_id = m.team_id
ORDER BY m.member_id ASC;";

const MEMBER_DTO_SQL: &str = "SELECT
    m.member_id AS member_id,
    m.username AS username,
    t.name AS team_name
FROM members m
INNER JOIN teams t ON t.team_id = m.team_id
ORDER BY m.member_id ASC;";

/// Repository interface for member persistence and queries.
///
/// The `find_by_*` helpers are thin presets over [`MemberSpec`]; anything
/// they do not cover goes through `find_matching` / `find_page`.
pub trait MemberRepository {
    /// Inserts a transient member or updates a persisted one.
    ///
    /// The assigned id is written back into `member`.
    ///
    /// # Errors
    /// - `MemberNotFound` when a persisted member's row is gone.
    /// - `ConstraintViolation` when the team reference does not exist.
    fn save(&self, member: &mut Member) -> RepoResult<MemberId>;
    /// Always inserts, keeping a caller-forced id when present.
    fn persist(&self, member: &mut Member) -> RepoResult<MemberId>;
    /// Missing ids yield `Ok(None)`.
    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>>;
    fn find_all(&self) -> RepoResult<Vec<Member>>;
    fn count(&self) -> RepoResult<u64>;
    /// Removes the member row. Transient or already-removed members are a
    /// silent no-op.
    fn delete(&self, member: &Member) -> RepoResult<()>;
    /// Returns whether a row was removed.
    fn delete_by_id(&self, id: MemberId) -> RepoResult<bool>;
    /// Overwrites `member` with the current stored state.
    fn refresh(&self, member: &mut Member) -> RepoResult<()>;
    fn find_matching(&self, spec: &MemberSpec, sort: &Sort) -> RepoResult<Vec<Member>>;
    /// Raw offset/limit window, no totals.
    fn find_window(
        &self,
        spec: &MemberSpec,
        sort: &Sort,
        offset: u64,
        limit: u32,
    ) -> RepoResult<Vec<Member>>;
    fn count_matching(&self, spec: &MemberSpec) -> RepoResult<u64>;
    /// Sorted page window plus totals, read from one snapshot.
    fn find_page(&self, spec: &MemberSpec, request: &PageRequest) -> RepoResult<Page<Member>>;
    /// Members with their team name; members without a team are skipped.
    fn find_member_dtos(&self) -> RepoResult<Vec<MemberDto>>;
    /// Members with `TeamRef::Loaded` teams, fetched in one joined query.
    fn find_members_fetch_join(&self) -> RepoResult<Vec<Member>>;
    /// Adds `delta` to the age of every matching member in one statement.
    fn bulk_add_age(&self, spec: &MemberSpec, delta: i64) -> RepoResult<usize>;

    fn find_by_username_and_age(&self, username: &str, age: i64) -> RepoResult<Vec<Member>> {
        let spec = MemberSpec::username_eq(username).and(MemberSpec::age_eq(age));
        self.find_matching(&spec, &Sort::unsorted())
    }

    fn find_by_username_in(&self, usernames: &[&str]) -> RepoResult<Vec<Member>> {
        let spec = MemberSpec::username_in(usernames.iter().copied());
        self.find_matching(&spec, &Sort::unsorted())
    }

    fn find_by_age(&self, age: i64, request: &PageRequest) -> RepoResult<Page<Member>> {
        self.find_page(&MemberSpec::age_eq(age), request)
    }

    /// Offset/limit slice of members with `age`, usernames descending.
    fn find_by_age_window(&self, age: i64, offset: u64, limit: u32) -> RepoResult<Vec<Member>> {
        let sort = Sort::by(Direction::Desc, MemberProperty::Username);
        self.find_window(&MemberSpec::age_eq(age), &sort, offset, limit)
    }

    fn count_by_age(&self, age: i64) -> RepoResult<u64> {
        self.count_matching(&MemberSpec::age_eq(age))
    }

    /// Increments by one the age of every member at or above `threshold`.
    ///
    /// Returns the number of members changed; 0 when none match.
    fn bulk_age_plus(&self, threshold: i64) -> RepoResult<usize> {
        self.bulk_add_age(&MemberSpec::age_gte(threshold), 1)
    }
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Binds to a connection whose readiness was already checked.
    pub(crate) fn bound_to(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert(&self, member: &mut Member, forced_id: Option<MemberId>) -> RepoResult<MemberId> {
        self.conn.execute(
            "INSERT INTO members (member_id, username, age, team_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                forced_id,
                member.username.as_str(),
                member.age,
                member.team_id(),
            ],
        )?;

        let id = forced_id.unwrap_or_else(|| self.conn.last_insert_rowid());
        member.id = Some(id);
        Ok(id)
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn save(&self, member: &mut Member) -> RepoResult<MemberId> {
        member.validate()?;

        let Some(id) = member.id else {
            return self.insert(member, None);
        };

        let changed = self.conn.execute(
            "UPDATE members
             SET
                username = ?1,
                age = ?2,
                team_id = ?3
             WHERE member_id = ?4;",
            params![member.username.as_str(), member.age, member.team_id(), id],
        )?;

        if changed == 0 {
            return Err(RepoError::MemberNotFound(id));
        }

        Ok(id)
    }

    fn persist(&self, member: &mut Member) -> RepoResult<MemberId> {
        member.validate()?;
        let forced_id = member.id;
        self.insert(member, forced_id)
    }

    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE m.member_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn find_all(&self) -> RepoResult<Vec<Member>> {
        query_members(self.conn, &MemberSpec::All, &Sort::unsorted(), None)
    }

    fn count(&self) -> RepoResult<u64> {
        count_members(self.conn, &MemberSpec::All)
    }

    fn delete(&self, member: &Member) -> RepoResult<()> {
        if let Some(id) = member.id {
            self.delete_by_id(id)?;
        }
        Ok(())
    }

    fn delete_by_id(&self, id: MemberId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM members WHERE member_id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn refresh(&self, member: &mut Member) -> RepoResult<()> {
        let id = member.id.ok_or(RepoError::TransientEntity("member"))?;
        let current = self
            .find_by_id(id)?
            .ok_or(RepoError::MemberNotFound(id))?;
        *member = current;
        Ok(())
    }

    fn find_matching(&self, spec: &MemberSpec, sort: &Sort) -> RepoResult<Vec<Member>> {
        query_members(self.conn, spec, sort, None)
    }

    fn find_window(
        &self,
        spec: &MemberSpec,
        sort: &Sort,
        offset: u64,
        limit: u32,
    ) -> RepoResult<Vec<Member>> {
        query_members(self.conn, spec, sort, Some(Window { offset, limit }))
    }

    fn count_matching(&self, spec: &MemberSpec) -> RepoResult<u64> {
        count_members(self.conn, spec)
    }

    fn find_page(&self, spec: &MemberSpec, request: &PageRequest) -> RepoResult<Page<Member>> {
        with_read_snapshot(self.conn, |conn| {
            let total = count_members(conn, spec)?;
            let content = if request.offset() >= total {
                Vec::new()
            } else {
                let window = Window {
                    offset: request.offset(),
                    limit: request.size(),
                };
                query_members(conn, spec, request.sort(), Some(window))?
            };
            Ok(Page::new(content, request, total))
        })
    }

    fn find_member_dtos(&self) -> RepoResult<Vec<MemberDto>> {
        let mut stmt = self.conn.prepare(MEMBER_DTO_SQL)?;
        let mut rows = stmt.query([])?;
        let mut dtos = Vec::new();
        while let Some(row) = rows.next()? {
            dtos.push(MemberDto {
                id: row.get("member_id")?,
                username: row.get("username")?,
                team_name: row.get("team_name")?,
            });
        }
        Ok(dtos)
    }

    fn find_members_fetch_join(&self) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(MEMBER_FETCH_JOIN_SQL)?;
        let mut rows = stmt.query([])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_fetched_member_row(row)?);
        }
        Ok(members)
    }

    fn bulk_add_age(&self, spec: &MemberSpec, delta: i64) -> RepoResult<usize> {
        let started_at = Instant::now();
        let (where_sql, spec_binds) = spec.to_sql();
        let mut bind_values = Vec::with_capacity(spec_binds.len() + 1);
        bind_values.push(Value::Integer(delta));
        bind_values.extend(spec_binds);

        // The subquery is evaluated once against the pre-update rows.
        let sql = format!(
            "UPDATE members
             SET age = age + ?
             WHERE member_id IN (SELECT m.member_id FROM members m WHERE {where_sql});"
        );

        match self.conn.execute(&sql, params_from_iter(bind_values)) {
            Ok(changed) => {
                info!(
                    "event=bulk_update module=repo status=ok entity=member field=age delta={} affected={} duration_ms={}",
                    delta,
                    changed,
                    started_at.elapsed().as_millis()
                );
                Ok(changed)
            }
            Err(err) => {
                let err = RepoError::from(err);
                warn!(
                    "event=bulk_update module=repo status=error entity=member field=age delta={} duration_ms={} error={}",
                    delta,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Window {
    offset: u64,
    limit: u32,
}

pub(crate) fn query_members(
    conn: &Connection,
    spec: &MemberSpec,
    sort: &Sort,
    window: Option<Window>,
) -> RepoResult<Vec<Member>> {
    let (where_sql, mut bind_values) = spec.to_sql();
    let mut sql = format!("{MEMBER_SELECT_SQL} WHERE {where_sql}");
    sql.push_str(&sort.to_order_by());

    if let Some(window) = window {
        sql.push_str(" LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(window.limit)));
        let offset = i64::try_from(window.offset).map_err(|_| {
            RepoError::InvalidData(format!("page offset {} exceeds i64", window.offset))
        })?;
        bind_values.push(Value::Integer(offset));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut members = Vec::new();
    while let Some(row) = rows.next()? {
        members.push(parse_member_row(row)?);
    }
    Ok(members)
}

fn count_members(conn: &Connection, spec: &MemberSpec) -> RepoResult<u64> {
    let (where_sql, bind_values) = spec.to_sql();
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM members m WHERE {where_sql};"),
        params_from_iter(bind_values),
        |row| row.get(0),
    )?;
    u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative count {count}")))
}

/// Runs `read` inside one deferred transaction unless the caller already
/// holds one, so multi-statement reads see a single snapshot.
fn with_read_snapshot<T, F>(conn: &Connection, read: F) -> RepoResult<T>
where
    F: FnOnce(&Connection) -> RepoResult<T>,
{
    if !conn.is_autocommit() {
        return read(conn);
    }

    let tx = conn.unchecked_transaction()?;
    let value = read(&*tx)?;
    tx.commit()?;
    Ok(value)
}

pub(crate) fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let team = match row.get::<_, Option<TeamId>>("team_id")? {
        Some(team_id) => TeamRef::Lazy { team_id },
        None => TeamRef::Unassigned,
    };

    let member = Member {
        id: Some(row.get("member_id")?),
        username: row.get("username")?,
        age: row.get("age")?,
        team,
    };
    member.validate()?;
    Ok(member)
}

fn parse_fetched_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let mut member = parse_member_row(row)?;
    let Some(team_id) = member.team_id() else {
        return Ok(member);
    };

    if row.get::<_, Option<TeamId>>("joined_team_id")?.is_none() {
        return Err(RepoError::DanglingTeam {
            member_id: member.id,
            team_id,
        });
    }

    member.team = TeamRef::Loaded {
        team: Team {
            id: Some(team_id),
            name: row.get("team_name")?,
        },
    };
    Ok(member)
}
