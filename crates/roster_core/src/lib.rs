//! Core persistence layer for the member/team roster.
//! This crate is the single source of truth for entity and query invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::migrations::latest_version as schema_version;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::member::{Member, MemberDto, MemberId, TeamRef};
pub use model::team::{Team, TeamId};
pub use model::validation::ValidationError;
pub use query::page::{Direction, InvalidPageRequest, MemberProperty, Order, Page, PageRequest, Sort};
pub use query::spec::MemberSpec;
pub use repo::error::{RepoError, RepoResult};
pub use repo::member_repo::{MemberRepository, SqliteMemberRepository};
pub use repo::resolver::TeamResolver;
pub use repo::team_repo::{SqliteTeamRepository, TeamRepository};
pub use repo::unit_of_work::UnitOfWork;
pub use service::roster_service::RosterService;
