//! Composable member predicates.
//!
//! `MemberSpec` values form a small expression tree. Repositories compile the
//! tree into a `WHERE` fragment plus bind values, always against the
//! `members` table aliased as `m`.

use crate::model::team::TeamId;
use rusqlite::types::Value;

/// Predicate over persisted members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberSpec {
    /// Matches every member.
    All,
    UsernameEq(String),
    /// Matches members whose username is one of the values. An empty list
    /// matches nothing.
    UsernameIn(Vec<String>),
    AgeEq(i64),
    /// `age >= value`.
    AgeGte(i64),
    /// `age <= value`.
    AgeLte(i64),
    TeamIs(TeamId),
    /// Matches members whose team currently has this exact name.
    TeamNameEq(String),
    /// Conjunction. Empty matches everything.
    And(Vec<MemberSpec>),
    /// Disjunction. Empty matches nothing.
    Or(Vec<MemberSpec>),
    Not(Box<MemberSpec>),
}

impl MemberSpec {
    pub fn all() -> Self {
        Self::All
    }

    pub fn username_eq(username: impl Into<String>) -> Self {
        Self::UsernameEq(username.into())
    }

    pub fn username_in<I, S>(usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::UsernameIn(usernames.into_iter().map(Into::into).collect())
    }

    pub fn age_eq(age: i64) -> Self {
        Self::AgeEq(age)
    }

    pub fn age_gte(age: i64) -> Self {
        Self::AgeGte(age)
    }

    pub fn age_lte(age: i64) -> Self {
        Self::AgeLte(age)
    }

    pub fn team_is(team_id: TeamId) -> Self {
        Self::TeamIs(team_id)
    }

    pub fn team_name_eq(name: impl Into<String>) -> Self {
        Self::TeamNameEq(name.into())
    }

    /// Combines two predicates conjunctively, flattening nested `And`s.
    pub fn and(self, other: MemberSpec) -> Self {
        match (self, other) {
            (Self::All, spec) | (spec, Self::All) => spec,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), spec) => {
                left.push(spec);
                Self::And(left)
            }
            (spec, Self::And(mut right)) => {
                right.insert(0, spec);
                Self::And(right)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }

    /// Combines two predicates disjunctively, flattening nested `Or`s.
    pub fn or(self, other: MemberSpec) -> Self {
        match (self, other) {
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), spec) => {
                left.push(spec);
                Self::Or(left)
            }
            (spec, Self::Or(mut right)) => {
                right.insert(0, spec);
                Self::Or(right)
            }
            (left, right) => Self::Or(vec![left, right]),
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            spec => Self::Not(Box::new(spec)),
        }
    }

    /// Compiles the predicate into a SQL boolean expression and its bind
    /// values, in positional order.
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut binds = Vec::new();
        self.write_sql(&mut sql, &mut binds);
        (sql, binds)
    }

    fn write_sql(&self, sql: &mut String, binds: &mut Vec<Value>) {
        match self {
            Self::All => sql.push_str("1 = 1"),
            Self::UsernameEq(username) => {
                sql.push_str("m.username = ?");
                binds.push(Value::Text(username.clone()));
            }
            Self::UsernameIn(usernames) if usernames.is_empty() => sql.push_str("0 = 1"),
            Self::UsernameIn(usernames) => {
                let placeholders = vec!["?"; usernames.len()].join(", ");
                sql.push_str(&format!("m.username IN ({placeholders})"));
                binds.extend(usernames.iter().cloned().map(Value::Text));
            }
            Self::AgeEq(age) => {
                sql.push_str("m.age = ?");
                binds.push(Value::Integer(*age));
            }
            Self::AgeGte(age) => {
                sql.push_str("m.age >= ?");
                binds.push(Value::Integer(*age));
            }
            Self::AgeLte(age) => {
                sql.push_str("m.age <= ?");
                binds.push(Value::Integer(*age));
            }
            Self::TeamIs(team_id) => {
                sql.push_str("m.team_id = ?");
                binds.push(Value::Integer(*team_id));
            }
            Self::TeamNameEq(name) => {
                sql.push_str("m.team_id IN (SELECT t_sub.team_id FROM teams t_sub WHERE t_sub.name = ?)");
                binds.push(Value::Text(name.clone()));
            }
            Self::And(specs) => write_joined(specs, " AND ", "1 = 1", sql, binds),
            Self::Or(specs) => write_joined(specs, " OR ", "0 = 1", sql, binds),
            Self::Not(inner) => {
                sql.push_str("NOT (");
                inner.write_sql(sql, binds);
                sql.push(')');
            }
        }
    }
}

fn write_joined(
    specs: &[MemberSpec],
    separator: &str,
    empty: &str,
    sql: &mut String,
    binds: &mut Vec<Value>,
) {
    if specs.is_empty() {
        sql.push_str(empty);
        return;
    }

    sql.push('(');
    for (index, spec) in specs.iter().enumerate() {
        if index > 0 {
            sql.push_str(separator);
        }
        spec.write_sql(sql, binds);
    }
    sql.push(')');
}

#[cfg(test)]
mod tests {
    use super::MemberSpec;
    use rusqlite::types::Value;

    #[test]
    fn username_and_age_compile_to_conjunction() {
        let spec = MemberSpec::username_eq("Member 1").and(MemberSpec::age_eq(11));
        let (sql, binds) = spec.to_sql();
        assert_eq!(sql, "(m.username = ? AND m.age = ?)");
        assert_eq!(
            binds,
            vec![Value::Text("Member 1".to_string()), Value::Integer(11)]
        );
    }

    #[test]
    fn and_flattens_nested_conjunctions_and_drops_all() {
        let spec = MemberSpec::all()
            .and(MemberSpec::age_gte(10))
            .and(MemberSpec::age_lte(20))
            .and(MemberSpec::team_is(1));
        match spec {
            MemberSpec::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("unexpected spec: {other:?}"),
        }
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let (sql, binds) = MemberSpec::username_in(Vec::<String>::new()).to_sql();
        assert_eq!(sql, "0 = 1");
        assert!(binds.is_empty());
    }

    #[test]
    fn in_list_binds_every_value_in_order() {
        let (sql, binds) = MemberSpec::username_in(["a", "b", "c"]).to_sql();
        assert_eq!(sql, "m.username IN (?, ?, ?)");
        assert_eq!(binds.len(), 3);
        assert_eq!(binds[2], Value::Text("c".to_string()));
    }

    #[test]
    fn double_negation_cancels_out() {
        let spec = MemberSpec::age_eq(3).negate().negate();
        assert_eq!(spec, MemberSpec::AgeEq(3));
    }

    #[test]
    fn disjunction_wraps_in_parentheses() {
        let spec = MemberSpec::username_eq("a").or(MemberSpec::age_gte(30));
        let (sql, _) = spec.negate().to_sql();
        assert_eq!(sql, "NOT ((m.username = ? OR m.age >= ?))");
    }
}
