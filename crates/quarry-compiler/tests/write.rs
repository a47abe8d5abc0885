mod common;
use common::*;

use bson::{Bson, doc, oid::ObjectId};
use quarry_compiler::{CompileError, InsertCompiler, UpdateCompiler};
use quarry_query::{InsertQuery, SelectQuery, UpdateQuery, WhereGroup};
use quarry_store::{MemoryStore, Store};

// ── Insert ──────────────────────────────────────────────────────

#[test]
fn insert_without_pk_gets_object_id() {
    let store = MemoryStore::new();
    let query = InsertQuery::new(artist())
        .value("name", "Bruce Springsteen")
        .value("good", true);
    let id = InsertCompiler::new(&query).insert(&store, true).unwrap().unwrap();
    assert!(matches!(id, Bson::ObjectId(_)));

    let stored: Vec<_> = store
        .find("artist", &doc! {})
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(stored, vec![doc! { "_id": id, "name": "Bruce Springsteen", "good": true }]);
}

#[test]
fn insert_with_pk_keeps_it() {
    let store = MemoryStore::new();
    let query = InsertQuery::new(artist())
        .value("id", 5)
        .value("name", "Bruce Springsteen")
        .value("good", true);
    let id = InsertCompiler::new(&query).insert(&store, true).unwrap();
    assert_eq!(id, Some(Bson::Int32(5)));
    assert_eq!(store.count("artist", &doc! { "_id": 5 }).unwrap(), 1);
}

#[test]
fn insert_without_return_id() {
    let store = RecordingStore::new();
    let query = InsertQuery::new(artist()).value("name", "Brian May");
    assert_eq!(InsertCompiler::new(&query).insert(&store, false).unwrap(), None);
    assert_eq!(store.calls(), 1);
}

#[test]
fn insert_duplicate_pk_fails() {
    let store = MemoryStore::new();
    let query = InsertQuery::new(artist()).value("id", 5).value("name", "a");
    InsertCompiler::new(&query).insert(&store, false).unwrap();
    assert!(matches!(
        InsertCompiler::new(&query).insert(&store, false),
        Err(CompileError::Store(_))
    ));
}

#[test]
fn insert_store_failure_surfaces() {
    let query = InsertQuery::new(artist()).value("name", "a");
    assert!(matches!(
        InsertCompiler::new(&query).insert(&DownStore, true),
        Err(CompileError::Store(_))
    ));
}

// ── Update ──────────────────────────────────────────────────────

#[test]
fn update_all_matching_rows() {
    let store = MemoryStore::new();
    let model = artist();
    for name in ["Billy Joel", "Warren Zevon"] {
        create(&store, &model, &[("name", name.into()), ("good", true.into())]);
    }
    create(&store, &model, &[("name", "Bon Iver".into()), ("good", false.into())]);

    let query = UpdateQuery::new(model.clone())
        .filter(WhereGroup::and(vec![eq(&model, "good", true)]))
        .set("good", false);
    assert_eq!(UpdateCompiler::new(&query).update(&store).unwrap(), 2);

    let all = SelectQuery::new(model.clone());
    assert_eq!(column(&store, &all, "good"), vec![Bson::Boolean(false); 3]);
}

#[test]
fn update_reports_only_modified_rows() {
    let store = MemoryStore::new();
    let model = artist();
    create(&store, &model, &[("name", "a".into()), ("good", true.into())]);
    create(&store, &model, &[("name", "b".into()), ("good", false.into())]);

    let query = UpdateQuery::new(model).set("good", false);
    assert_eq!(UpdateCompiler::new(&query).update(&store).unwrap(), 1);
}

#[test]
fn update_by_pk() {
    let store = MemoryStore::new();
    let model = artist();
    let pk = create(&store, &model, &[("name", "Lady Gaga".into()), ("good", true.into())]);
    create(&store, &model, &[("name", "Lorde".into()), ("good", true.into())]);

    let query = UpdateQuery::new(model.clone())
        .filter(WhereGroup::and(vec![eq(&model, "id", pk.clone())]))
        .set("good", false);
    assert_eq!(UpdateCompiler::new(&query).update(&store).unwrap(), 1);

    let lady = select(&model, WhereGroup::and(vec![eq(&model, "id", pk)]));
    assert_eq!(column(&store, &lady, "good"), vec![Bson::Boolean(false)]);
}

#[test]
fn update_without_values_skips_store() {
    let store = RecordingStore::new();
    let query = UpdateQuery::new(artist());
    assert_eq!(UpdateCompiler::new(&query).update(&store).unwrap(), 0);
    assert_eq!(store.calls(), 0);
}

#[test]
fn update_pk_rejected_before_store() {
    let store = RecordingStore::new();
    let query = UpdateQuery::new(artist()).set("id", ObjectId::new());
    assert!(matches!(
        UpdateCompiler::new(&query).update(&store),
        Err(CompileError::UnsupportedQueryShape(_))
    ));
    assert_eq!(store.calls(), 0);
}

#[test]
fn update_store_failure_surfaces() {
    let query = UpdateQuery::new(artist()).set("good", true);
    assert!(matches!(
        UpdateCompiler::new(&query).update(&DownStore),
        Err(CompileError::Store(_))
    ));
}
