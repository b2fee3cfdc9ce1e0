//! Member query building blocks.
//!
//! # Responsibility
//! - Describe member predicates as data (`MemberSpec`) instead of
//!   method-name conventions.
//! - Describe ordering and page windows (`Sort`, `PageRequest`, `Page`).
//!
//! # Invariants
//! - Predicates compile to parameterized SQL; user values never reach the
//!   SQL text.
//! - Every ordering ends with `member_id ASC`, so ties follow insertion order.

pub mod page;
pub mod spec;
