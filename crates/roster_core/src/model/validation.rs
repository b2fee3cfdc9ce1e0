//! Write-time validation errors shared by member and team entities.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected entity state, detected before any SQL runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `Member::username` is empty or whitespace only.
    BlankUsername,
    /// `Member::age` is below zero.
    NegativeAge(i64),
    /// `Team::name` is empty or whitespace only.
    BlankTeamName,
    /// The member points at a team that was never saved.
    TeamNotPersisted { team_name: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUsername => write!(f, "member username cannot be blank"),
            Self::NegativeAge(age) => write!(f, "member age cannot be negative, got {age}"),
            Self::BlankTeamName => write!(f, "team name cannot be blank"),
            Self::TeamNotPersisted { team_name } => write!(
                f,
                "team `{team_name}` must be saved before members can reference it"
            ),
        }
    }
}

impl Error for ValidationError {}
