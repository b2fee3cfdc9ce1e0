//! Repository error type shared by member and team persistence.

use crate::db::DbError;
use crate::model::member::MemberId;
use crate::model::team::TeamId;
use crate::model::validation::ValidationError;
use crate::query::page::InvalidPageRequest;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for roster persistence and query operations.
///
/// Every variant is local to the failing call; nothing is retried.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    MemberNotFound(MemberId),
    TeamNotFound(TeamId),
    /// The operation needs a persisted entity but got a transient one.
    TransientEntity(&'static str),
    /// SQLite rejected the write: duplicate forced id, foreign key, check.
    ConstraintViolation(String),
    /// A member points at a team row that no longer exists.
    DanglingTeam {
        member_id: Option<MemberId>,
        team_id: TeamId,
    },
    InvalidPageRequest(InvalidPageRequest),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::TeamNotFound(id) => write!(f, "team not found: {id}"),
            Self::TransientEntity(entity) => {
                write!(f, "{entity} has not been saved and has no id")
            }
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::DanglingTeam { member_id, team_id } => match member_id {
                Some(member_id) => write!(
                    f,
                    "member {member_id} references missing team {team_id}"
                ),
                None => write!(f, "member references missing team {team_id}"),
            },
            Self::InvalidPageRequest(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "roster repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "roster repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "roster repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidPageRequest(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<InvalidPageRequest> for RepoError {
    fn from(value: InvalidPageRequest) -> Self {
        Self::InvalidPageRequest(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(err, message) = &value {
            if err.code == ErrorCode::ConstraintViolation {
                let message = message.clone().unwrap_or_else(|| err.to_string());
                return Self::ConstraintViolation(message);
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}
