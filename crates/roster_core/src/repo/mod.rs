//! Repository layer contracts and SQLite persistence implementations.
//!
//! # Responsibility
//! - Define entity store, query, bulk-update and association contracts.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - Repositories only accept connections migrated to the latest schema.
//! - Missing rows on lookup are `Ok(None)`, never an error.

pub mod error;
pub mod member_repo;
mod readiness;
pub mod resolver;
pub mod team_repo;
pub mod unit_of_work;
