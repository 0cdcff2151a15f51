use rusqlite::Connection;
use std::collections::BTreeSet;
use wordle_people_core::db::open_db_in_memory;
use wordle_people_core::{
    Color, FilterState, Gender, NewPerson, PageRequest, PersonRepository, QuerySelector,
    RepoError, SqlitePersonRepository,
};

fn person(name: &str, gender: Gender, color: Color) -> NewPerson {
    NewPerson {
        first_name: name.to_string(),
        middle_name: "mid".to_string(),
        last_name: "last".to_string(),
        gender,
        color,
    }
}

/// One row for every gender/color pair, 12 rows in total.
fn seed_grid(repo: &SqlitePersonRepository<'_>) {
    let batch: Vec<NewPerson> = Gender::ALL
        .into_iter()
        .flat_map(|gender| {
            Color::ALL
                .into_iter()
                .map(move |color| person(&format!("{gender}-{color}"), gender, color))
        })
        .collect();
    assert_eq!(repo.insert_batch(&batch).unwrap(), 12);
}

#[test]
fn insert_batch_assigns_increasing_ids_and_roundtrips_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let inserted = repo
        .insert_batch(&[
            person("crane", Gender::North, Color::Red),
            person("slate", Gender::West, Color::Blue),
        ])
        .unwrap();
    assert_eq!(inserted, 2);

    let people = repo
        .list_people(&QuerySelector::Unfiltered, PageRequest::default())
        .unwrap();
    assert_eq!(people.len(), 2);
    assert!(people[0].id < people[1].id);
    assert_eq!(people[0].first_name, "crane");
    assert_eq!(people[1].gender, Gender::West);
    assert_eq!(people[1].color, Color::Blue);

    let loaded = repo.get_person(people[1].id).unwrap().unwrap();
    assert_eq!(loaded, people[1]);
}

#[test]
fn empty_batch_is_a_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    assert_eq!(repo.insert_batch(&[]).unwrap(), 0);
    assert_eq!(repo.count_all().unwrap(), 0);
}

#[test]
fn each_selector_variant_returns_only_matching_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    seed_grid(&repo);

    let cases = [
        (BTreeSet::new(), BTreeSet::new(), 12),
        (BTreeSet::new(), [Gender::North].into_iter().collect(), 3),
        ([Color::Red, Color::Blue].into_iter().collect(), BTreeSet::new(), 8),
        (
            [Color::Green].into_iter().collect(),
            [Gender::South, Gender::East].into_iter().collect(),
            2,
        ),
    ];

    for (colors, genders, expected) in cases {
        let selector = FilterState { colors, genders }.selector();
        let people = repo
            .list_people(&selector, PageRequest::default())
            .unwrap();

        assert_eq!(people.len(), expected, "selector {selector:?}");
        assert_eq!(repo.count_for(&selector).unwrap(), expected as u64);
        assert!(people
            .iter()
            .all(|person| selector.matches(person.gender, person.color)));
        assert!(people.windows(2).all(|pair| pair[0].id < pair[1].id));
    }
}

#[test]
fn count_pair_reads_filtered_and_total_together() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    seed_grid(&repo);

    let selectors = [
        QuerySelector::Unfiltered,
        QuerySelector::ByGender([Gender::West].into_iter().collect()),
        QuerySelector::ByColor([Color::Red, Color::Green].into_iter().collect()),
        QuerySelector::ByGenderAndColor {
            genders: [Gender::North, Gender::South].into_iter().collect(),
            colors: [Color::Blue].into_iter().collect(),
        },
    ];

    for selector in selectors {
        let counts = repo.count_pair(&selector).unwrap();
        assert_eq!(counts.total, repo.count_all().unwrap());
        assert_eq!(counts.filtered, repo.count_for(&selector).unwrap());
        assert!(counts.filtered <= counts.total, "selector {selector:?}");
    }
    assert!(conn.is_autocommit());
}

#[test]
fn list_people_pages_with_limit_and_offset() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    seed_grid(&repo);

    let first = repo
        .list_people(&QuerySelector::Unfiltered, PageRequest::nth(0, 5))
        .unwrap();
    let third = repo
        .list_people(&QuerySelector::Unfiltered, PageRequest::nth(2, 5))
        .unwrap();

    assert_eq!(first.len(), 5);
    assert_eq!(third.len(), 2);
    assert!(first[4].id < third[0].id);
}

#[test]
fn delete_person_removes_exactly_one_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    seed_grid(&repo);

    let victim = repo
        .list_people(&QuerySelector::Unfiltered, PageRequest::nth(0, 1))
        .unwrap()
        .remove(0);
    repo.delete_person(victim.id).unwrap();

    assert_eq!(repo.count_all().unwrap(), 11);
    assert!(repo.get_person(victim.id).unwrap().is_none());

    let err = repo.delete_person(victim.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == victim.id));
    assert_eq!(repo.count_all().unwrap(), 11);
}

#[test]
fn delete_all_clears_table() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    seed_grid(&repo);

    assert_eq!(repo.delete_all().unwrap(), 12);
    assert_eq!(repo.count_all().unwrap(), 0);
    assert_eq!(repo.delete_all().unwrap(), 0);
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqlitePersonRepository::try_new(&conn)
        .err()
        .expect("unmigrated connection must be rejected");
    assert!(matches!(err, RepoError::SchemaNotReady { found: 0, .. }));
}

#[test]
fn unknown_enum_text_in_storage_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO wordle_people (first_name, middle_name, last_name, gender, color)
         VALUES ('a', 'b', 'c', 'Sideways', 'Red');",
    )
    .unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let err = repo
        .list_people(&QuerySelector::Unfiltered, PageRequest::default())
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("Sideways")));
}
