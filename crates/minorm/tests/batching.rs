//! Batch writer and key generation properties, asserted through the store's
//! round-trip counter rather than wall time.

mod common;

use common::{Analytic, Apple, Basket, Contractor, Document, factory};
use minorm::{Error, MemoryStore, SessionConfig, SessionFactory, Value};

fn analytic(n: usize) -> Analytic {
    Analytic {
        id: None,
        dim: format!("dim-{n}"),
        val: format!("val-{n}"),
    }
}

fn flush_trips(factory: &SessionFactory<MemoryStore>, rows: usize, batch_size: usize) -> u64 {
    let mut session = factory.open_session().unwrap();
    session.set_batch_size(batch_size).unwrap();
    for n in 0..rows {
        let mut row = analytic(n);
        session.save(&mut row).unwrap();
    }
    let before = session.round_trips();
    let report = session.flush().unwrap();
    assert_eq!(report.inserted, rows as u64);
    session.round_trips() - before
}

#[test]
fn larger_batches_cost_fewer_round_trips() {
    const ROWS: usize = 10_000;
    let mut previous = u64::MAX;
    for batch_size in [1, 10, 100, 500] {
        // fresh heap per run so content-derived keys never collide across runs
        let trips = flush_trips(&factory(), ROWS, batch_size);
        let expected = (ROWS as u64).div_ceil(batch_size as u64);
        assert_eq!(trips, expected);
        assert!(trips < previous);
        previous = trips;
    }
}

#[test]
fn zero_batch_size_is_rejected() {
    let factory = factory();
    let mut session = factory.open_session().unwrap();
    let err = session.set_batch_size(0).unwrap_err();
    assert!(matches!(err, Error::InvalidBatchSize { requested: 0 }));
    // the configured size is untouched
    assert_eq!(session.batch_size(), 1);

    let config = SessionConfig { batch_size: 0 };
    let factory = SessionFactory::with_config(MemoryStore::new(), common::registry(), config);
    assert!(matches!(
        factory.open_session(),
        Err(Error::InvalidBatchSize { requested: 0 })
    ));
}

#[test]
fn hi_lo_reserves_one_block_for_many_keys() {
    let factory = factory();
    let mut session = factory.open_session().unwrap();
    let before = session.round_trips();
    let mut keys = Vec::new();
    for n in 0..10 {
        let mut doc = Document::numbered(&format!("{n}/2016"));
        keys.push(session.save(&mut doc).unwrap());
    }
    // ten keys out of one reserved block of 32
    assert_eq!(session.round_trips() - before, 1);
    let ids: Vec<i64> = keys.iter().filter_map(Value::as_i64).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<i64>>());
}

#[test]
fn native_keys_cost_one_round_trip_each() {
    let factory = factory();
    let mut session = factory.open_session().unwrap();
    let before = session.round_trips();
    for n in 0..5 {
        let mut c = Contractor {
            id: None,
            name: format!("contractor {n}"),
        };
        session.save(&mut c).unwrap();
    }
    assert_eq!(session.round_trips() - before, 5);
}

#[test]
fn content_derived_keys_need_no_store_access() {
    let factory = factory();
    let mut session = factory.open_session().unwrap();
    let before = session.round_trips();
    let mut first = analytic(1);
    let key = session.save(&mut first).unwrap();
    assert_eq!(session.round_trips(), before);

    // identical content derives the identical key
    let mut twin = analytic(1);
    let err = session.save(&mut twin).unwrap_err();
    assert!(matches!(err, Error::DuplicateIdentity { .. }));
    assert_eq!(Value::from(twin.id), key);

    // and survives a round trip through the store
    session.flush().unwrap();
    let mut other = factory.open_session().unwrap();
    let loaded = other.get::<Analytic>(&key).unwrap().expect("stored row");
    assert_eq!(loaded.read().unwrap().dim, "dim-1");
}

#[test]
fn collection_inserts_flow_through_the_same_batches() {
    let factory = factory();
    let mut session = factory.open_session().unwrap();
    session.set_batch_size(50).unwrap();
    let mut basket = Basket::labeled("orchard run");
    for n in 0..100 {
        basket.apples.push(Apple::of(&format!("variety {n}")));
    }
    session.save(&mut basket).unwrap();
    let report = session.flush().unwrap();
    assert_eq!(report.inserted, 101);
}
