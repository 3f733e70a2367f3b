use poolpass_engine::{
    Catalog, Claim, EngineConfig, FixedClock, Location, MemoryStore, StampSession, VisitLedger,
    clamp_page, decode_ledger, encode_ledger, page_count, visible_slice,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn abc() -> Catalog {
    Catalog::new(vec![
        Location::new("A", "Alpha Lido", 51.50, -0.12),
        Location::new("B", "Brockwell Lido", 51.45, -0.10),
        Location::new("C", "Charlton Lido", 51.48, 0.04),
    ])
    .unwrap()
}

fn open(store: &MemoryStore, clock: &FixedClock) -> StampSession<MemoryStore, FixedClock> {
    StampSession::open(store.clone(), clock.clone(), abc(), EngineConfig::default())
}

fn visible_ids(session: &StampSession<MemoryStore, FixedClock>) -> Vec<String> {
    session
        .visible_stamps()
        .iter()
        .map(|entry| entry.location.id.clone())
        .collect()
}

#[test]
fn three_pool_walkthrough() {
    let store = MemoryStore::new();
    let clock = FixedClock::new("02/01/2025");
    let mut session = open(&store, &clock);

    session.claim("B").unwrap();
    assert_eq!(session.visited_count(), 1);
    assert_eq!(visible_ids(&session), vec!["B"]);

    clock.set("01/01/2025");
    session.claim("A").unwrap();
    assert_eq!(visible_ids(&session), vec!["A", "B"]);
    assert!(!session.completion_reached());

    clock.set("03/01/2025");
    let claim = session.claim("C").unwrap();
    assert!(claim.is_new());
    assert_eq!(session.page_count(), 2);
    assert_eq!(session.next_page().unwrap(), 1);
    assert_eq!(visible_ids(&session), vec!["C"]);
    assert!(session.completion_reached());
    assert!(session.completion_reached(), "query leaves state unchanged");

    let projection = session.projection();
    assert_eq!(projection.badge, "3 / 3");
    assert_eq!(projection.page_label, "Page 2 of 2");
    assert!(projection.nav.can_retreat);
    assert!(!projection.nav.can_advance);
}

#[test]
fn reload_resumes_where_the_user_left_off() {
    let store = MemoryStore::new();
    let clock = FixedClock::new("10/03/2025");
    {
        let mut session = open(&store, &clock);
        session.claim("A").unwrap();
        session.claim("B").unwrap();
        session.claim("C").unwrap();
        session.next_page().unwrap();
        session.previous_location().unwrap();
    }

    let session = open(&store, &clock);
    assert_eq!(session.visited_count(), 3);
    assert_eq!(session.page(), 1);
    assert_eq!(session.selected_index(), 2);
}

#[test]
fn repeated_claims_leave_storage_byte_identical() {
    let store = MemoryStore::new();
    let clock = FixedClock::new("01/01/2025");
    let mut session = open(&store, &clock);
    session.claim("A").unwrap();
    let after_first = store.raw("poolpass.visited");

    for day in 2..10 {
        clock.set(format!("{day:02}/01/2025"));
        assert!(matches!(
            session.claim("A").unwrap(),
            Claim::AlreadyStamped(_)
        ));
        assert_eq!(store.raw("poolpass.visited"), after_first);
    }
}

#[test]
fn reset_is_total() {
    let store = MemoryStore::new();
    let mut session = open(&store, &FixedClock::new("01/01/2025"));
    for id in ["A", "B", "C"] {
        session.claim(id).unwrap();
    }
    session.next_page().unwrap();
    session.reset().unwrap();

    assert_eq!(session.visited_count(), 0);
    assert_eq!(session.page_count(), 1);
    assert_eq!(session.page(), 0);
    for id in ["A", "B", "C"] {
        assert!(!session.is_visited(id));
    }
    let reopened = open(&store, &FixedClock::new("x"));
    assert_eq!(reopened.visited_count(), 0);
    assert_eq!(clamp_page(5, reopened.visited_count(), 2), 0);
}

#[test]
fn corrupt_storage_opens_with_defaults() {
    let store = MemoryStore::with_slots([
        ("poolpass.visited", "{\"A\": {\"done\": tru"),
        ("poolpass.selected", "seven"),
        ("poolpass.stampPage", "[]"),
    ]);
    let session = open(&store, &FixedClock::new("01/01/2025"));
    assert_eq!(session.visited_count(), 0);
    assert_eq!(session.selected_index(), 0);
    assert_eq!(session.page(), 0);
}

#[test]
fn legacy_iso_ledger_sorts_with_new_claims() {
    let store = MemoryStore::with_slots([(
        "poolpass.visited",
        r#"{"C":{"done":true,"date":"2025-01-05"},"A":{"done":true}}"#,
    )]);
    let mut session = open(&store, &FixedClock::new("06/01/2025"));
    assert!(session.is_visited("A"));
    assert!(session.is_visited("C"));
    session.claim("B").unwrap();

    let projection = session.projection();
    assert_eq!(projection.stamps.len(), 2);
    assert_eq!(projection.stamps[0].id, "A");
    assert_eq!(projection.stamps[0].date, "");
    assert_eq!(projection.stamps[1].id, "C");
    assert_eq!(projection.stamps[1].date, "05/01/2025");
    session.next_page().unwrap();
    assert_eq!(visible_ids(&session), vec!["B"]);
}

#[test]
fn mixed_format_round_trip() {
    let mut ledger = VisitLedger::new();
    for (id, date) in [
        ("a", "2025-01-05"),
        ("b", "06/01/2025"),
        ("c", "7/1/2025"),
        ("d", "2024-12-31T10:00:00Z"),
        ("e", "01.02.2025"),
    ] {
        ledger.claim(id, date);
    }
    let restored = decode_ledger(&encode_ledger(&ledger));
    assert_eq!(restored, ledger);
    for (id, record) in ledger.iter() {
        assert_eq!(restored.get(id), Some(record));
    }
}

#[test]
fn shrunken_catalog_ignores_stale_stamps_until_they_return() {
    let store = MemoryStore::new();
    let clock = FixedClock::new("01/01/2025");
    let mut full = open(&store, &clock);
    for id in ["B", "C"] {
        full.claim(id).unwrap();
    }

    let shrunk = Catalog::new(vec![Location::new("A", "Alpha Lido", 51.50, -0.12)]).unwrap();
    let mut session = StampSession::open(
        store.clone(),
        clock.clone(),
        shrunk,
        EngineConfig::default(),
    );
    let projection = session.projection();
    assert_eq!(projection.badge, "0 / 1");
    assert!(!projection.completed);
    assert!(projection.stamps.is_empty());
    assert!(!projection.nav.can_advance);
    assert_eq!(session.next_page().unwrap(), 0);

    assert!(session.claim("A").unwrap().is_new());
    assert!(session.completion_reached());
    assert_eq!(session.projection().badge, "1 / 1");

    let reopened = open(&store, &clock);
    assert_eq!(reopened.visited_count(), 3);
    assert!(reopened.completion_reached());
}

#[test]
fn random_operation_walks_hold_invariants() {
    let catalog = Catalog::new(
        (0..7)
            .map(|i| Location::new(format!("p{i}"), format!("Pool {i}"), 0.0, 0.0))
            .collect(),
    )
    .unwrap();

    for seed in [1_u64, 7, 1337, 0xDEAD_BEEF] {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let store = MemoryStore::new();
        let clock = FixedClock::new("01/01/2025");
        let config = EngineConfig::default().with_page_size(rng.gen_range(1..4));
        let mut session =
            StampSession::open(store.clone(), clock.clone(), catalog.clone(), config.clone());
        let mut ever_visited: Vec<String> = Vec::new();

        for step in 0..300 {
            clock.set(format!("{:02}/{:02}/2025", rng.gen_range(1..29), rng.gen_range(1..13)));
            match rng.gen_range(0..8) {
                0 | 1 => {
                    let id = format!("p{}", rng.gen_range(0..9));
                    session.claim(&id).unwrap();
                    if session.is_visited(&id) && !ever_visited.contains(&id) {
                        ever_visited.push(id);
                    }
                }
                2 => {
                    session.next_location().unwrap();
                }
                3 => {
                    session.previous_location().unwrap();
                }
                4 => {
                    session.next_page().unwrap();
                }
                5 => {
                    session.previous_page().unwrap();
                }
                6 if step % 50 == 0 => {
                    session.reset().unwrap();
                    ever_visited.clear();
                }
                _ => {
                    session.claim_selected().unwrap();
                    if let Some(location) = session.selected_location() {
                        let id = location.id.clone();
                        if !ever_visited.contains(&id) {
                            ever_visited.push(id);
                        }
                    }
                }
            }

            for id in &ever_visited {
                assert!(session.is_visited(id), "seed {seed}: {id} lost its stamp");
            }
            assert!(session.selected_index() < catalog.len());
            assert!(session.page() < session.page_count());
            assert_eq!(
                session.page_count(),
                page_count(session.visited_count(), config.page_size)
            );
            let window = visible_slice(session.ledger(), &catalog, session.page(), config.page_size);
            assert!(window.len() <= config.page_size);
        }

        let reopened =
            StampSession::open(store.clone(), FixedClock::new("x"), catalog.clone(), config);
        assert_eq!(reopened.ledger(), session.ledger());
        assert_eq!(reopened.page(), session.page());
        assert_eq!(reopened.selected_index(), session.selected_index());
    }
}
