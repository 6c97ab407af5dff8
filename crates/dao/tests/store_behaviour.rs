use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use simpledao_core::{Entity, SampleEntity};
use simpledao_dao::{Dao, DaoError, FieldValue, SpaceDao, StoreConfig};

fn dao() -> SpaceDao<SampleEntity> {
    simpledao_observability::tracing::init_for_tests();
    SpaceDao::default()
}

fn text(s: &str) -> SampleEntity {
    SampleEntity::with_text(s)
}

fn wait_for_waiters(dao: &SpaceDao<SampleEntity>, n: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while dao.store().waiting().unwrap() < n {
        assert!(Instant::now() < deadline, "pollers never blocked");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn write_then_read_by_id_round_trips() {
    let dao = dao();
    let stored = dao.write(text("round trip")).unwrap();
    let id = stored.id().unwrap();
    assert_eq!(dao.read_by_id(id).unwrap(), Some(stored));
}

#[test]
fn rewrite_keeps_create_time_and_bumps_update_time() {
    let dao = dao();
    let first = dao.write(text("v1")).unwrap();
    thread::sleep(Duration::from_millis(2));

    let mut next = first.clone();
    next.text = Some("v2".into());
    let second = dao.write(next).unwrap();

    assert_eq!(second.id(), first.id());
    assert_eq!(second.base.create_time, first.base.create_time);
    assert!(second.base.update_time > first.base.update_time);
}

#[test]
fn push_then_peek_leaves_object_in_place() {
    let dao = dao();
    let pushed = dao.push(text("x")).unwrap();

    let seen = dao.peek(text("x"), Duration::from_secs(1)).unwrap();
    assert_eq!(seen, Some(pushed.clone()));
    assert_eq!(dao.read(text("x")).unwrap(), Some(pushed.clone()));
    assert_eq!(dao.take(text("x")).unwrap(), Some(pushed));
}

#[test]
fn second_poll_times_out() {
    let dao = dao();
    let pushed = dao.push(text("x")).unwrap();

    assert_eq!(dao.poll(text("x"), Duration::from_millis(20)).unwrap(), Some(pushed));

    let start = Instant::now();
    assert!(dao.poll(text("x"), Duration::from_millis(30)).unwrap().is_none());
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn two_pollers_one_push_exactly_one_receives() {
    let dao = Arc::new(dao());
    let pollers: Vec<_> = (0..2)
        .map(|_| {
            let dao = Arc::clone(&dao);
            thread::spawn(move || dao.poll(text("job"), Duration::from_millis(300)).unwrap())
        })
        .collect();

    wait_for_waiters(&dao, 2);
    let pushed = dao.push(text("job")).unwrap();

    let results: Vec<_> = pollers.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<_> = results.into_iter().flatten().collect();
    assert_eq!(winners, vec![pushed]);
    assert_eq!(dao.count(SampleEntity::default()).unwrap(), 0);
    assert_eq!(dao.takes(), 1);
}

#[test]
fn blocked_peekers_all_see_one_push() {
    let dao = Arc::new(dao());
    let peekers: Vec<_> = (0..3)
        .map(|_| {
            let dao = Arc::clone(&dao);
            thread::spawn(move || dao.peek(text("news"), Duration::from_secs(5)).unwrap())
        })
        .collect();

    wait_for_waiters(&dao, 3);
    let pushed = dao.push(text("news")).unwrap();

    for handle in peekers {
        assert_eq!(handle.join().unwrap(), Some(pushed.clone()));
    }
    assert_eq!(dao.count(text("news")).unwrap(), 1);
}

#[test]
fn non_matching_push_does_not_wake_poller() {
    let dao = Arc::new(dao());
    let poller = {
        let dao = Arc::clone(&dao);
        thread::spawn(move || dao.poll(text("wanted"), Duration::from_millis(100)).unwrap())
    };

    wait_for_waiters(&dao, 1);
    dao.push(text("unwanted")).unwrap();

    assert!(poller.join().unwrap().is_none());
    assert_eq!(dao.count(text("unwanted")).unwrap(), 1);
}

#[test]
fn reset_zeroes_counters() {
    let dao = dao();
    dao.write(text("a")).unwrap();
    dao.write(text("a")).unwrap();
    dao.read_multiple(text("a")).unwrap();
    dao.take(text("a")).unwrap();

    assert_eq!((dao.reads(), dao.writes(), dao.takes()), (2, 2, 1));

    dao.reset();
    assert_eq!((dao.reads(), dao.writes(), dao.takes()), (0, 0, 0));

    dao.read(text("a")).unwrap();
    assert_eq!((dao.reads(), dao.writes(), dao.takes()), (1, 0, 0));
}

#[test]
fn single_result_reads_count_once_even_when_absent() {
    let dao = dao();
    dao.read(text("missing")).unwrap();
    dao.read_by_id("missing").unwrap();
    dao.read_by_query("text = ?", &["missing".into()]).unwrap();
    dao.peek(text("missing"), Duration::ZERO).unwrap();
    assert_eq!(dao.reads(), 4);

    let stats = dao.stats().unwrap();
    assert_eq!(stats.reads, 4);
    assert_eq!(stats.size, 0);
}

#[test]
fn update_of_unknown_id_inserts() {
    let dao = dao();
    let mut fresh = text("never written");
    fresh.base.id = Some("custom-id".into());

    let stored = dao.update(fresh).unwrap();
    assert_eq!(stored.id(), Some("custom-id"));
    assert!(stored.base.create_time.is_some());
    assert_eq!(dao.read_by_id("custom-id").unwrap(), Some(stored));
    assert_eq!(dao.writes(), 1);
}

#[test]
fn malformed_queries_are_rejected() {
    let dao = dao();
    dao.write(text("a")).unwrap();

    let cases: &[(&str, usize)] = &[
        ("text = ?", 0),
        ("text = 'a'", 1),
        ("text = = 'a'", 0),
        ("colour = 'red'", 0),
        ("text like 5", 0),
        ("text = 'unterminated", 0),
    ];
    for (query, param_count) in cases {
        let params = vec![FieldValue::from("a"); *param_count];
        let err = dao.read_by_query(query, &params).unwrap_err();
        assert!(matches!(err, DaoError::MalformedQuery(_)), "{query}: {err:?}");
    }
    // Rejected queries touch nothing.
    assert_eq!(dao.reads(), 0);
}

#[test]
fn bounded_store_write_fails_after_timeout() {
    let dao = SpaceDao::<SampleEntity>::with_config(StoreConfig::bounded(2)).unwrap();
    dao.write(text("a")).unwrap();
    dao.write(text("b")).unwrap();

    let start = Instant::now();
    let err = dao
        .write_with_timeout(text("c"), Duration::from_millis(30))
        .unwrap_err();
    assert_eq!(err, DaoError::CapacityExceeded { capacity: 2 });
    assert!(start.elapsed() >= Duration::from_millis(30));
    assert_eq!(dao.writes(), 2);
}

#[test]
fn bounded_store_push_waits_for_space() {
    let dao = Arc::new(SpaceDao::<SampleEntity>::with_config(StoreConfig::bounded(1)).unwrap());
    dao.push(text("first")).unwrap();

    let producer = {
        let dao = Arc::clone(&dao);
        thread::spawn(move || dao.push_with_timeout(text("second"), Duration::from_secs(5)))
    };

    thread::sleep(Duration::from_millis(20));
    assert!(dao.poll(text("first"), Duration::from_secs(1)).unwrap().is_some());

    assert!(producer.join().unwrap().is_ok());
    assert_eq!(dao.read(SampleEntity::default()).unwrap().and_then(|e| e.text), Some("second".into()));
}

#[test]
fn push_into_full_store_reaches_blocked_poller() {
    let dao = Arc::new(SpaceDao::<SampleEntity>::with_config(StoreConfig::bounded(1)).unwrap());
    dao.write(text("filler")).unwrap();

    let poller = {
        let dao = Arc::clone(&dao);
        thread::spawn(move || dao.poll(text("job"), Duration::from_secs(5)).unwrap())
    };
    wait_for_waiters(&dao, 1);

    let pushed = dao.push(text("job")).unwrap();
    assert_eq!(poller.join().unwrap(), Some(pushed));
    assert_eq!(dao.count(SampleEntity::default()).unwrap(), 1);
    assert_eq!(dao.takes(), 1);
}

#[test]
fn deeply_nested_query_fails_only_the_call() {
    let dao = dao();
    dao.write(text("a")).unwrap();

    let nested = format!("{}text = 'a'{}", "(".repeat(5_000), ")".repeat(5_000));
    let err = dao.read_by_query(&nested, &[]).unwrap_err();
    assert!(matches!(err, DaoError::MalformedQuery(_)));

    let negated = format!("{}text = 'a'", "not ".repeat(5_000));
    assert!(matches!(dao.take_by_query(&negated, &[]), Err(DaoError::MalformedQuery(_))));

    assert!(dao.read_by_query("((text = 'a'))", &[]).unwrap().is_some());
}

#[test]
fn configured_default_timeout_applies_to_plain_writes() {
    let config = StoreConfig::bounded(1).with_default_timeout(Duration::from_millis(25));
    let dao = SpaceDao::<SampleEntity>::with_config(config).unwrap();
    dao.write(text("a")).unwrap();

    let start = Instant::now();
    assert!(dao.write(text("b")).is_err());
    assert!(start.elapsed() >= Duration::from_millis(25));
}

#[test]
fn daos_sharing_a_store_see_each_other() {
    let first = dao();
    let second = SpaceDao::new(Arc::clone(first.store()));
    let stored = first.write(text("shared")).unwrap();
    assert_eq!(second.take(text("shared")).unwrap(), Some(stored));
    assert_eq!(first.takes(), 1);
}

fn texts() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..20)
        .prop_map(|v| v.into_iter().map(String::from).collect())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, ..ProptestConfig::default() })]

    #[test]
    fn read_multiple_returns_exact_subset(values in texts(), wanted in "[abc]") {
        let dao = SpaceDao::<SampleEntity>::default();
        for v in &values {
            dao.write(text(v)).unwrap();
        }

        prop_assert_eq!(dao.read_multiple(SampleEntity::default()).unwrap().len(), values.len());

        let hits = dao.read_multiple(text(&wanted)).unwrap();
        let expected = values.iter().filter(|v| **v == wanted).count();
        prop_assert_eq!(hits.len(), expected);
        prop_assert!(hits.iter().all(|e| e.text() == Some(wanted.as_str())));
    }

    #[test]
    fn take_removes_min_of_count_and_matches(values in texts(), wanted in "[abc]", count in 0usize..10) {
        let dao = SpaceDao::<SampleEntity>::default();
        for v in &values {
            dao.write(text(v)).unwrap();
        }
        let matches = values.iter().filter(|v| **v == wanted).count();

        let taken = dao.take_multiple_limit(text(&wanted), count).unwrap();
        prop_assert_eq!(taken.len(), count.min(matches));
        prop_assert_eq!(dao.count(text(&wanted)).unwrap(), matches - taken.len());
        prop_assert_eq!(dao.takes(), taken.len() as u64);

        // A single take removes at most one.
        let before = dao.count(SampleEntity::default()).unwrap();
        let one = dao.take(text(&wanted)).unwrap();
        let after = dao.count(SampleEntity::default()).unwrap();
        prop_assert_eq!(before - after, usize::from(one.is_some()));
    }

    #[test]
    fn write_always_assigns_identity(body in ".*") {
        let dao = SpaceDao::<SampleEntity>::default();
        let stored = dao.write(text(&body)).unwrap();
        prop_assert!(stored.base.id.is_some());
        prop_assert!(stored.base.create_time.is_some());
        prop_assert!(stored.base.update_time.is_some());
        prop_assert_eq!(dao.read_by_id(stored.id().unwrap()).unwrap(), Some(stored.clone()));
    }
}
