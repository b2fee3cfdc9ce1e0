//! Explicit unit of work over one SQLite write transaction.
//!
//! # Responsibility
//! - Group several repository calls so they become visible together.
//! - Make commit an explicit caller decision.
//!
//! # Invariants
//! - The transaction is `IMMEDIATE`: the write lock is taken at `begin`.
//! - Dropping an uncommitted unit of work rolls every change back.
//! - Repository calls write straight into the transaction; there is no
//!   buffered state to flush.

use super::error::RepoResult;
use super::member_repo::SqliteMemberRepository;
use super::readiness::ensure_connection_ready;
use super::resolver::TeamResolver;
use super::team_repo::SqliteTeamRepository;
use log::{info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

/// Scope that commits or discards a batch of repository calls atomically.
pub struct UnitOfWork<'conn> {
    tx: Transaction<'conn>,
    started_at: Instant,
}

impl<'conn> UnitOfWork<'conn> {
    /// Opens a write transaction on a migrated connection.
    pub fn begin(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        info!("event=uow_begin module=repo status=ok");
        Ok(Self {
            tx,
            started_at: Instant::now(),
        })
    }

    pub fn members(&self) -> SqliteMemberRepository<'_> {
        SqliteMemberRepository::bound_to(&self.tx)
    }

    pub fn teams(&self) -> SqliteTeamRepository<'_> {
        SqliteTeamRepository::bound_to(&self.tx)
    }

    pub fn resolver(&self) -> TeamResolver<'_> {
        TeamResolver::new(&self.tx)
    }

    /// Makes every change in this scope visible to other connections.
    pub fn commit(self) -> RepoResult<()> {
        let elapsed = self.started_at.elapsed().as_millis();
        match self.tx.commit() {
            Ok(()) => {
                info!("event=uow_commit module=repo status=ok duration_ms={elapsed}");
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=uow_commit module=repo status=error duration_ms={elapsed} error={err}"
                );
                Err(err.into())
            }
        }
    }

    /// Discards every change made in this scope.
    pub fn rollback(self) -> RepoResult<()> {
        let elapsed = self.started_at.elapsed().as_millis();
        self.tx.rollback()?;
        info!("event=uow_rollback module=repo status=ok duration_ms={elapsed}");
        Ok(())
    }
}
