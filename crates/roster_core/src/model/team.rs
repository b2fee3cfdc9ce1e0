//! Team entity.
//!
//! # Invariants
//! - `name` is never blank once validated.
//! - Persisted teams compare by id only.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Store-assigned team identity.
pub type TeamId = i64;

/// A named group members can join.
///
/// The reverse member collection is a query
/// (`TeamRepository::list_members`), not owned state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// `None` until the team is saved.
    pub id: Option<TeamId>,
    pub name: String,
}

impl Team {
    /// Creates a transient team.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks write-time invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankTeamName);
        }
        Ok(())
    }
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(left), Some(right)) => left == right,
            (None, None) => self.name == other.name,
            _ => false,
        }
    }
}

impl Eq for Team {}

#[cfg(test)]
mod tests {
    use super::Team;
    use crate::model::validation::ValidationError;

    #[test]
    fn persisted_teams_compare_by_id() {
        let mut left = Team::new("Team A");
        let mut right = Team::new("renamed");
        left.id = Some(7);
        right.id = Some(7);
        assert_eq!(left, right);

        right.id = Some(8);
        assert_ne!(left, right);
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(
            Team::new("  ").validate(),
            Err(ValidationError::BlankTeamName)
        );
    }
}
