//! Member entity and its team association.
//!
//! # Responsibility
//! - Define the member record and how it points at a team.
//! - Provide lifecycle helpers for joining and leaving teams.
//!
//! # Invariants
//! - `age` defaults to 0 and is never negative once validated.
//! - Persisted members compare by id only; field drift between two copies
//!   of the same row does not make them unequal.
//! - A `TeamRef::Loaded` team must carry an id before the member is saved.

use crate::model::team::{Team, TeamId};
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Store-assigned member identity. Monotonic, never reused.
pub type MemberId = i64;

/// How a member currently holds its team association.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TeamRef {
    /// The member belongs to no team.
    #[default]
    Unassigned,
    /// Only the team id is known; the row is loaded on first access.
    Lazy { team_id: TeamId },
    /// The team row was fetched together with the member.
    Loaded { team: Team },
}

impl TeamRef {
    /// Returns the referenced team id, if any.
    pub fn team_id(&self) -> Option<TeamId> {
        match self {
            Self::Unassigned => None,
            Self::Lazy { team_id } => Some(*team_id),
            Self::Loaded { team } => team.id,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// A person on the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// `None` until the member is saved.
    pub id: Option<MemberId>,
    pub username: String,
    pub age: i64,
    pub team: TeamRef,
}

impl Member {
    /// Creates a transient member with age 0 and no team.
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_age(username, 0)
    }

    pub fn with_age(username: impl Into<String>, age: i64) -> Self {
        Self {
            id: None,
            username: username.into(),
            age,
            team: TeamRef::Unassigned,
        }
    }

    /// Creates a transient member already pointing at `team`.
    pub fn with_team(username: impl Into<String>, age: i64, team: &Team) -> Self {
        let mut member = Self::with_age(username, age);
        member.change_team(team);
        member
    }

    /// Moves this member to `team`. Takes effect in the store on next save.
    pub fn change_team(&mut self, team: &Team) {
        self.team = TeamRef::Loaded { team: team.clone() };
    }

    pub fn leave_team(&mut self) {
        self.team = TeamRef::Unassigned;
    }

    pub fn team_id(&self) -> Option<TeamId> {
        self.team.team_id()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks write-time invariants.
    ///
    /// # Errors
    /// - `BlankUsername` / `NegativeAge` for invalid scalar fields.
    /// - `TeamNotPersisted` when the loaded team has no id yet.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::BlankUsername);
        }
        if self.age < 0 {
            return Err(ValidationError::NegativeAge(self.age));
        }
        if let TeamRef::Loaded { team } = &self.team {
            if team.id.is_none() {
                return Err(ValidationError::TeamNotPersisted {
                    team_name: team.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(left), Some(right)) => left == right,
            (None, None) => {
                self.username == other.username
                    && self.age == other.age
                    && self.team == other.team
            }
            _ => false,
        }
    }
}

impl Eq for Member {}

/// Read-only projection of a member joined with its team name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub id: MemberId,
    pub username: String,
    pub team_name: String,
}
