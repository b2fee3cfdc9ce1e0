use roster_core::db::open_db_in_memory;
use roster_core::{
    Direction, MemberProperty, PageRequest, RepoError, RosterService, Sort,
    SqliteMemberRepository, SqliteTeamRepository, Team,
};
use rusqlite::Connection;

fn service(
    conn: &Connection,
) -> RosterService<SqliteMemberRepository<'_>, SqliteTeamRepository<'_>> {
    RosterService::new(
        SqliteMemberRepository::try_new(conn).unwrap(),
        SqliteTeamRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn register_and_join_team_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let team = service.found_team("Team A").unwrap();
    let mut member = service.register_member("Member 1", 11).unwrap();
    assert!(member.id.is_some());

    service.join_team(&mut member, &team).unwrap();
    assert_eq!(member.team_id(), team.id);

    let roster = service.team_roster(&team).unwrap();
    assert_eq!(roster, vec![member]);

    let dtos = service.roster_with_teams().unwrap();
    assert_eq!(dtos.len(), 1);
    assert_eq!(dtos[0].team_name, "Team A");
}

#[test]
fn join_unsaved_team_keeps_previous_reference() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut member = service.register_member("Member 1", 11).unwrap();
    let err = service
        .join_team(&mut member, &Team::new("draft"))
        .unwrap_err();

    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(member.team_id(), None);
}

#[test]
fn team_roster_requires_saved_team() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.team_roster(&Team::new("draft")).unwrap_err();
    assert!(matches!(err, RepoError::TransientEntity("team")));
}

#[test]
fn age_up_and_paging_through_service() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    for (name, age) in [("a", 19), ("b", 20), ("c", 20), ("d", 45)] {
        service.register_member(name, age).unwrap();
    }

    assert_eq!(service.age_up(20).unwrap(), 3);

    let request =
        PageRequest::sorted(0, 5, Sort::by(Direction::Asc, MemberProperty::Username)).unwrap();
    let page = service.members_by_age(21, &request).unwrap();
    let names: Vec<_> = page.content.iter().map(|m| m.username.as_str()).collect();
    assert_eq!(names, vec!["b", "c"]);
    assert_eq!(page.total_pages(), 1);
}
