use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wordle_people_core::db::open_db_in_memory;
use wordle_people_core::{
    Color, FilterCounts, FilterEngine, FilterState, Gender, ImportConfig, PeopleService,
    QuerySelector, SqlitePersonRepository,
};

fn seeded_service(
    conn: &rusqlite::Connection,
    count: u64,
) -> PeopleService<SqlitePersonRepository<'_>> {
    let service = PeopleService::new(SqlitePersonRepository::try_new(conn).unwrap());
    let words = vec!["crane".to_string(), "slate".to_string(), "adieu".to_string()];
    for item in service.import_with_rng(
        words,
        ChaCha8Rng::seed_from_u64(99),
        ImportConfig::new(count, 100).unwrap(),
    ) {
        item.unwrap();
    }
    service
}

#[test]
fn counts_pair_filtered_rows_with_grand_total() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded_service(&conn, 600);
    let mut engine = FilterEngine::new();

    assert_eq!(
        service.counts(&engine.current_selector()).unwrap(),
        FilterCounts {
            filtered: 600,
            total: 600
        }
    );

    engine.toggle_color(Color::Red, true);
    engine.toggle_gender(Gender::North, true);
    let counts = service.counts(&engine.current_selector()).unwrap();
    assert_eq!(counts.total, 600);
    assert!(counts.filtered < 600);
    assert!(counts.title().contains(" of "));

    let matching = service
        .pager(engine.current_selector())
        .map(Result::unwrap)
        .flatten()
        .inspect(|person| {
            assert_eq!(person.color, Color::Red);
            assert_eq!(person.gender, Gender::North);
        })
        .count() as u64;
    assert_eq!(matching, counts.filtered);
}

#[test]
fn pager_walks_every_row_once_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded_service(&conn, 173);

    let pages: Vec<_> = service
        .pager(QuerySelector::Unfiltered)
        .map(Result::unwrap)
        .collect();
    assert_eq!(pages.len(), 4);
    assert!(pages[..3].iter().all(|page| page.len() == 50));
    assert_eq!(pages[3].len(), 23);

    let ids: Vec<_> = pages.iter().flatten().map(|person| person.id).collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn pager_on_exact_page_multiple_ends_without_empty_page() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded_service(&conn, 100);

    let sizes: Vec<_> = service
        .pager(QuerySelector::Unfiltered)
        .map(|page| page.unwrap().len())
        .collect();
    assert_eq!(sizes, vec![50, 50]);
}

#[test]
fn deleting_a_person_drops_both_counts_by_one() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded_service(&conn, 200);
    let selector = QuerySelector::ByColor([Color::Blue].into_iter().collect());
    let before = service.counts(&selector).unwrap();

    let victim = service
        .pager(selector.clone())
        .next()
        .unwrap()
        .unwrap()
        .remove(0);
    service.delete_person(victim.id).unwrap();

    let after = service.counts(&selector).unwrap();
    assert_eq!(after.total, before.total - 1);
    assert_eq!(after.filtered, before.filtered - 1);
    assert!(service.get_person(victim.id).unwrap().is_none());
}

#[test]
fn clear_all_empties_store() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded_service(&conn, 120);

    assert_eq!(service.clear_all().unwrap(), 120);
    assert_eq!(
        service.counts(&QuerySelector::Unfiltered).unwrap(),
        FilterCounts::default()
    );
    assert!(service.pager(QuerySelector::Unfiltered).next().is_none());
}

#[test]
fn snapshot_survives_json_roundtrip_and_restores_selector() {
    let mut engine = FilterEngine::new();
    engine.toggle_color(Color::Green, true);
    engine.toggle_gender(Gender::East, true);
    engine.toggle_gender(Gender::West, true);

    let saved = serde_json::to_string(&engine.snapshot()).unwrap();
    drop(engine);

    let restored: FilterState = serde_json::from_str(&saved).unwrap();
    let engine = FilterEngine::restore(restored);
    assert_eq!(
        engine.current_selector(),
        QuerySelector::ByGenderAndColor {
            genders: [Gender::East, Gender::West].into_iter().collect(),
            colors: [Color::Green].into_iter().collect(),
        }
    );
}

#[test]
fn subscriber_on_worker_thread_ends_on_latest_selector() {
    let mut engine = FilterEngine::new();
    let mut subscriber = engine.subscribe();

    let worker = std::thread::spawn(move || {
        let mut last = None;
        while let Some(selector) = subscriber.recv() {
            last = Some(selector);
        }
        last
    });

    engine.toggle_color(Color::Red, true);
    engine.toggle_color(Color::Blue, true);
    engine.toggle_gender(Gender::South, true);
    let expected = engine.current_selector();
    drop(engine);

    assert_eq!(worker.join().unwrap(), Some(expected));
}
