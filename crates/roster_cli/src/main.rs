//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `roster_core` wiring end to end against the configured store.
//! - Keep output deterministic `key=value` lines for quick sanity checks.

use roster_core::{
    CoreConfig, Direction, MemberProperty, PageRequest, RosterService, Sort,
    SqliteMemberRepository, SqliteTeamRepository,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("roster_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    config.init_logging()?;

    println!(
        "roster_cli version={} schema_version={}",
        env!("CARGO_PKG_VERSION"),
        roster_core::schema_version()
    );

    let conn = config.open_store()?;
    let service = RosterService::new(
        SqliteMemberRepository::try_new(&conn)?,
        SqliteTeamRepository::try_new(&conn)?,
    );

    let team = service.found_team("Team A")?;
    for (index, age) in [11, 12, 24, 42, 31].into_iter().enumerate() {
        let mut member = service.register_member(format!("Member {}", index + 1), age)?;
        if age >= 20 {
            service.join_team(&mut member, &team)?;
        }
    }

    let request = PageRequest::sorted(0, 3, Sort::by(Direction::Desc, MemberProperty::Age))?;
    let page = service.members_by_age(24, &request)?;
    println!(
        "page number={} size={} total_elements={} total_pages={}",
        page.number,
        page.size,
        page.total_elements,
        page.total_pages()
    );

    let aged = service.age_up(20)?;
    println!("bulk_age_plus threshold=20 affected={aged}");

    for dto in service.roster_with_teams()? {
        println!("member id={} username={} team={}", dto.id, dto.username, dto.team_name);
    }

    log::info!("event=cli_run module=cli status=ok affected={aged}");
    Ok(())
}
