use cubestat_core::{Country, Event, EventFormat, Gender, Mark, Person, Ranks};
use cubestat_db::*;

fn person(id: &str, name: &str, country: &str) -> Person {
    Person {
        wca_id: id.to_string(),
        name: name.to_string(),
        country_id: country.to_string(),
        continent_id: Some("_Asia".to_string()),
        gender: Some(Gender::Male),
    }
}

fn setup_db() -> rusqlite::Connection {
    let conn = open_memory().unwrap();
    insert_continent(&conn, "_Asia", "Asia").unwrap();
    insert_country(
        &conn,
        &Country {
            id: "China".to_string(),
            name: "China".to_string(),
            continent_id: "_Asia".to_string(),
            iso2: "CN".to_string(),
        },
    )
    .unwrap();
    insert_event(
        &conn,
        &Event {
            id: "333".to_string(),
            name: "3x3x3 Cube".to_string(),
            rank: 10,
            format: EventFormat::Time,
        },
    )
    .unwrap();
    insert_event(
        &conn,
        &Event {
            id: "222".to_string(),
            name: "2x2x2 Cube".to_string(),
            rank: 20,
            format: EventFormat::Time,
        },
    )
    .unwrap();

    insert_person(&conn, &person("2008DONG06", "Yu Dong (董宇)", "China")).unwrap();
    insert_person(&conn, &person("2012WANG11", "Wei Wang (王伟)", "China")).unwrap();
    insert_person(&conn, &person("2015WANG02", "Wei Wang (王伟)", "China")).unwrap();
    insert_person(&conn, &person("2019LIXX01", "Xin Li", "China")).unwrap();

    let ranks = Ranks {
        world: Some(150),
        continent: Some(40),
        country: Some(5),
    };
    upsert_single(&conn, "2008DONG06", "333", Some(Mark::Finite(650)), ranks).unwrap();
    upsert_average(&conn, "2008DONG06", "333", Some(Mark::Finite(790)), ranks).unwrap();
    upsert_single(&conn, "2008DONG06", "222", Some(Mark::Finite(150)), Ranks::default()).unwrap();
    upsert_single(&conn, "2012WANG11", "333", Some(Mark::Finite(600)), Ranks::default()).unwrap();
    upsert_single(&conn, "2015WANG02", "333", Some(Mark::Finite(900)), Ranks::default()).unwrap();
    upsert_single(&conn, "2019LIXX01", "333", Some(Mark::Dnf), Ranks::default()).unwrap();
    conn
}

#[test]
fn find_by_id_is_case_insensitive() {
    let conn = setup_db();
    let p = find_person_by_id(&conn, " 2008dong06 ").unwrap().unwrap();
    assert_eq!(p.name, "Yu Dong (董宇)");
    assert!(find_person_by_id(&conn, "2000NONE01").unwrap().is_none());
}

#[test]
fn find_by_latin_name_ignores_case() {
    let conn = setup_db();
    let found = find_persons_by_name(&conn, "yu dong").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].wca_id, "2008DONG06");
}

#[test]
fn find_by_local_name() {
    let conn = setup_db();
    let found = find_persons_by_name(&conn, "董宇").unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn shared_name_returns_all_in_id_order() {
    let conn = setup_db();
    let found = find_persons_by_name(&conn, "Wei Wang").unwrap();
    let ids: Vec<_> = found.iter().map(|p| p.wca_id.as_str()).collect();
    assert_eq!(ids, ["2012WANG11", "2015WANG02"]);
}

#[test]
fn full_display_name_matches() {
    let conn = setup_db();
    assert_eq!(find_persons_by_name(&conn, "Xin Li").unwrap().len(), 1);
    assert_eq!(find_persons_by_name(&conn, "Yu Dong (董宇)").unwrap().len(), 1);
}

#[test]
fn results_follow_event_order() {
    let conn = setup_db();
    let results = results_for_person(&conn, "2008DONG06").unwrap();
    let events: Vec<_> = results.iter().map(|r| r.event_id.as_str()).collect();
    assert_eq!(events, ["333", "222"]);
    assert_eq!(results[0].single, Some(Mark::Finite(650)));
    assert_eq!(results[0].average, Some(Mark::Finite(790)));
    assert_eq!(results[0].single_ranks.world, Some(150));
    assert_eq!(results[1].average, None);
}

#[test]
fn dnf_round_trips_through_store() {
    let conn = setup_db();
    let results = results_for_person(&conn, "2019LIXX01").unwrap();
    assert_eq!(results[0].single, Some(Mark::Dnf));
}

#[test]
fn upsert_merges_single_and_average() {
    let conn = setup_db();
    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM results WHERE person_id = '2008DONG06' AND event_id = '333'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);
}

fn ids(persons: &[Person]) -> Vec<&str> {
    persons.iter().map(|p| p.wca_id.as_str()).collect()
}

#[test]
fn nemeses_beat_every_shared_event() {
    let conn = setup_db();
    // 2015WANG02 only has 333 at 9.00; the DNF holder never beats anyone.
    let found = nemeses_of(&conn, "2015WANG02").unwrap();
    assert_eq!(ids(&found), ["2008DONG06", "2012WANG11"]);
    assert!(nemeses_of(&conn, "2008DONG06").unwrap().is_empty());
}

#[test]
fn nemesis_needs_better_average_when_either_has_one() {
    let conn = setup_db();
    // 2012WANG11 beats 2008DONG06 on single but has no average against 7.90.
    assert!(!ids(&nemeses_of(&conn, "2008DONG06").unwrap()).contains(&"2012WANG11"));

    upsert_average(&conn, "2012WANG11", "333", Some(Mark::Finite(780)), Ranks::default()).unwrap();
    // 222 is not shared, and 333 is now won on both metrics.
    assert_eq!(ids(&nemeses_of(&conn, "2008DONG06").unwrap()), ["2012WANG11"]);
}

#[test]
fn finite_single_beats_dnf_subject() {
    let conn = setup_db();
    let found = nemeses_of(&conn, "2019LIXX01").unwrap();
    assert_eq!(ids(&found), ["2008DONG06", "2012WANG11", "2015WANG02"]);
}

#[test]
fn unknown_subject_has_no_nemeses() {
    let conn = setup_db();
    assert!(nemeses_of(&conn, "1999NOPE01").unwrap().is_empty());
}

#[test]
fn gender_round_trips_through_store() {
    let conn = setup_db();
    let p = find_person_by_id(&conn, "2008DONG06").unwrap().unwrap();
    assert_eq!(p.gender, Some(Gender::Male));
}

#[test]
fn persons_by_ids_skips_unknown() {
    let conn = setup_db();
    let ids = vec![
        "2015WANG02".to_string(),
        "1999NOPE01".to_string(),
        "2008DONG06".to_string(),
    ];
    let found = persons_by_ids(&conn, &ids).unwrap();
    let got: Vec<_> = found.iter().map(|p| p.wca_id.as_str()).collect();
    assert_eq!(got, ["2008DONG06", "2015WANG02"]);
}

#[test]
fn duplicate_person_keeps_first_row() {
    let conn = setup_db();
    let inserted = insert_person(&conn, &person("2008DONG06", "Someone Else", "China")).unwrap();
    assert!(!inserted);
    let p = find_person_by_id(&conn, "2008DONG06").unwrap().unwrap();
    assert_eq!(p.name, "Yu Dong (董宇)");
}

#[test]
fn listings_and_stats() {
    let conn = setup_db();
    set_metadata(&conn, "export_date", "2026-10-01T00:00:00Z").unwrap();

    let events = list_events(&conn).unwrap();
    assert_eq!(events[0].id, "333");
    let countries = list_countries(&conn).unwrap();
    assert_eq!(countries[0].iso2, "CN");
    let meta = metadata(&conn).unwrap();
    assert_eq!(meta.get("export_date").unwrap(), "2026-10-01T00:00:00Z");

    let stats = store_stats(&conn).unwrap();
    assert_eq!(stats.persons, 4);
    assert_eq!(stats.events, 2);
    assert_eq!(stats.countries, 1);
    assert_eq!(stats.results, 5);
}
