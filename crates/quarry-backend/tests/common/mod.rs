#![allow(dead_code)]

use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use bson::Bson;
use quarry_backend::{Connector, DatabaseWrapper, Settings};
use quarry_query::{Atom, FieldKind, InsertQuery, Model, SelectQuery, WhereGroup, WhereNode};
use quarry_store::{MemoryStore, StoreError};

static INIT: Once = Once::new();

/// Install a subscriber for test output. `RUST_LOG` overrides the level.
pub fn init_tracing() {
    INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Connector that hands out memory stores and counts connects.
#[derive(Default)]
pub struct CountingConnector {
    connects: AtomicUsize,
    refuse: bool,
}

impl CountingConnector {
    /// Every connect attempt fails.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connector for &CountingConnector {
    type Store = MemoryStore;

    fn connect(&self, _settings: &Settings) -> Result<MemoryStore, StoreError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            return Err(StoreError::Storage("connection refused".into()));
        }
        Ok(MemoryStore::new())
    }
}

pub fn wrapper(connector: &CountingConnector) -> DatabaseWrapper<&CountingConnector> {
    init_tracing();
    DatabaseWrapper::new(Settings::default(), connector)
}

pub fn group() -> Model {
    Model::new("group")
        .primary_key("id")
        .column("name", FieldKind::Text)
        .column("year_formed", FieldKind::Integer)
}

pub fn eq(model: &Model, column: &str, value: impl Into<Bson>) -> WhereNode {
    Atom::exact(model.field(column).unwrap(), value).into()
}

pub fn insert_group(db: &DatabaseWrapper<&CountingConnector>, name: &str, year: Option<i32>) -> Bson {
    let query = InsertQuery::new(group())
        .value("id", Bson::Null)
        .value("name", name)
        .value("year_formed", year.map(Bson::from).unwrap_or(Bson::Null));
    db.insert(&query).unwrap()
}

pub fn select(model: &Model, where_: WhereGroup) -> SelectQuery {
    SelectQuery::new(model.clone()).filter(where_)
}
