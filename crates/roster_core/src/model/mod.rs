//! Domain model for the member/team roster.
//!
//! # Responsibility
//! - Define the entities persisted by the repository layer.
//! - Keep validation rules next to the data they guard.
//!
//! # Invariants
//! - An entity without an id is transient; an id is assigned exactly once,
//!   by the store, and never reused.
//! - A member references at most one team; the team does not own it.

pub mod member;
pub mod team;
pub mod validation;
