use roster_core::db::open_db_in_memory;
use roster_core::{
    Direction, Member, MemberProperty, MemberRepository, MemberSpec, PageRequest, Sort,
    SqliteMemberRepository, SqliteTeamRepository, Team, TeamRepository,
};
use rusqlite::Connection;

fn seed(conn: &Connection, rows: &[(&str, i64)]) {
    let repo = SqliteMemberRepository::try_new(conn).unwrap();
    for (username, age) in rows {
        repo.save(&mut Member::with_age(*username, *age)).unwrap();
    }
}

fn usernames(members: &[Member]) -> Vec<&str> {
    members.iter().map(|m| m.username.as_str()).collect()
}

fn seed_ten_aged_ten(conn: &Connection) {
    let repo = SqliteMemberRepository::try_new(conn).unwrap();
    for i in 1..=10 {
        repo.save(&mut Member::with_age(format!("Member {i}"), 10))
            .unwrap();
    }
}

#[test]
fn find_by_username_and_age_is_conjunctive() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, &[("Member 1", 11), ("Member 2", 12), ("Member 1", 30)]);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let found = repo.find_by_username_and_age("Member 1", 11).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "Member 1");
    assert_eq!(found[0].age, 11);

    assert!(repo
        .find_by_username_and_age("Member 2", 11)
        .unwrap()
        .is_empty());
}

#[test]
fn find_by_username_in_returns_exact_matches_without_duplicates() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, &[("Member 1", 11), ("Member 2", 12), ("Member 3", 13)]);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let found = repo
        .find_by_username_in(&["Member 1", "Member 2", "Member 1", "nobody"])
        .unwrap();
    assert_eq!(usernames(&found), vec!["Member 1", "Member 2"]);

    assert!(repo.find_by_username_in(&[]).unwrap().is_empty());
}

#[test]
fn paging_reports_totals_for_whole_predicate() {
    let conn = open_db_in_memory().unwrap();
    seed_ten_aged_ten(&conn);
    seed(&conn, &[("outsider", 11)]);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let request =
        PageRequest::sorted(0, 3, Sort::by(Direction::Desc, MemberProperty::Username)).unwrap();
    let page = repo.find_by_age(10, &request).unwrap();

    assert_eq!(page.content.len(), 3);
    assert_eq!(page.total_elements, 10);
    assert_eq!(page.number, 0);
    assert_eq!(page.total_pages(), 4);
    assert!(page.is_first());
    assert!(page.has_next());
    assert_eq!(
        usernames(&page.content),
        vec!["Member 9", "Member 8", "Member 7"]
    );
}

#[test]
fn last_page_holds_remainder() {
    let conn = open_db_in_memory().unwrap();
    seed_ten_aged_ten(&conn);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let request = PageRequest::of(3, 3).unwrap();
    let page = repo.find_by_age(10, &request).unwrap();

    assert_eq!(usernames(&page.content), vec!["Member 10"]);
    assert!(page.is_last());
    assert!(!page.has_next());
    assert!(page.has_previous());
}

#[test]
fn page_beyond_total_is_empty_with_correct_totals() {
    let conn = open_db_in_memory().unwrap();
    seed_ten_aged_ten(&conn);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let page = repo
        .find_by_age(10, &PageRequest::of(7, 3).unwrap())
        .unwrap();
    assert!(page.content.is_empty());
    assert_eq!(page.total_elements, 10);
    assert_eq!(page.total_pages(), 4);
    assert!(!page.has_next());
}

#[test]
fn equal_sort_keys_fall_back_to_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, &[("carol", 30), ("alice", 20), ("bob", 30), ("dave", 20)]);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let sort = Sort::by(Direction::Desc, MemberProperty::Age);
    let found = repo.find_matching(&MemberSpec::all(), &sort).unwrap();
    assert_eq!(usernames(&found), vec!["carol", "bob", "alice", "dave"]);

    let page = repo
        .find_page(
            &MemberSpec::all(),
            &PageRequest::sorted(1, 2, sort).unwrap(),
        )
        .unwrap();
    assert_eq!(usernames(&page.content), vec!["alice", "dave"]);
}

#[test]
fn window_query_and_count_by_age() {
    let conn = open_db_in_memory().unwrap();
    seed_ten_aged_ten(&conn);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let members = repo.find_by_age_window(10, 3, 3).unwrap();
    assert_eq!(members.len(), 3);
    // "Member 9" > "Member 8" > ... > "Member 10" > "Member 1" in text order.
    assert_eq!(usernames(&members), vec!["Member 6", "Member 5", "Member 4"]);
    assert_eq!(repo.count_by_age(10).unwrap(), 10);
    assert_eq!(repo.count_by_age(99).unwrap(), 0);
}

#[test]
fn composite_specs_combine_and_or_not() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[("a", 10), ("b", 20), ("c", 30), ("d", 40), ("e", 50)],
    );
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let middle = MemberSpec::age_gte(20).and(MemberSpec::age_lte(40));
    let found = repo.find_matching(&middle, &Sort::unsorted()).unwrap();
    assert_eq!(usernames(&found), vec!["b", "c", "d"]);

    let edges = middle.clone().negate();
    let found = repo.find_matching(&edges, &Sort::unsorted()).unwrap();
    assert_eq!(usernames(&found), vec!["a", "e"]);

    let either = MemberSpec::username_eq("a").or(MemberSpec::age_gte(50));
    assert_eq!(repo.count_matching(&either).unwrap(), 2);

    let nothing = MemberSpec::Or(Vec::new());
    assert_eq!(repo.count_matching(&nothing).unwrap(), 0);
    assert_eq!(repo.count_matching(&MemberSpec::And(Vec::new())).unwrap(), 5);
}

#[test]
fn team_specs_filter_by_id_and_name() {
    let conn = open_db_in_memory().unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();

    let mut team_a = Team::new("Team A");
    let mut team_b = Team::new("Team B");
    teams.save(&mut team_a).unwrap();
    teams.save(&mut team_b).unwrap();
    members
        .save(&mut Member::with_team("m1", 11, &team_a))
        .unwrap();
    members
        .save(&mut Member::with_team("m2", 21, &team_b))
        .unwrap();
    members.save(&mut Member::with_age("m3", 31)).unwrap();

    let by_id = members
        .find_matching(&MemberSpec::team_is(team_b.id.unwrap()), &Sort::unsorted())
        .unwrap();
    assert_eq!(usernames(&by_id), vec!["m2"]);

    let by_name = MemberSpec::team_name_eq("Team A").or(MemberSpec::team_name_eq("Team B"));
    let sort = Sort::by(Direction::Desc, MemberProperty::Age);
    let found = members.find_matching(&by_name, &sort).unwrap();
    assert_eq!(usernames(&found), vec!["m2", "m1"]);
}

#[test]
fn page_serializes_for_transport() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, &[("solo", 5)]);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let page = repo
        .find_by_age(5, &PageRequest::of(0, 10).unwrap())
        .unwrap();
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["total_elements"], 1);
    assert_eq!(json["content"][0]["username"], "solo");
    assert_eq!(json["content"][0]["team"]["state"], "unassigned");
}
