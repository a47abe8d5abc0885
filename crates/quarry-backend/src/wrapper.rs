use std::sync::{Mutex, OnceLock, PoisonError};

use bson::Bson;
use quarry_compiler::{CompileError, InsertCompiler, Rows, SelectCompiler, UpdateCompiler};
use quarry_query::{Aggregate, InsertQuery, SelectQuery, UpdateQuery, WriteIntent};
use quarry_store::Store;

use crate::connector::Connector;
use crate::error::BackendError;
use crate::operations::{CompilerKind, DatabaseFeatures, DatabaseOperations};
use crate::settings::Settings;

/// Rows streamed from a connection's store.
pub type StoreRows<'a, C> = Rows<'a, <<C as Connector>::Store as Store>::Cursor<'a>>;

/// Result of a [`WriteIntent`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The `_id` the store assigned or kept.
    Inserted(Bson),
    /// Rows modified.
    Updated(u64),
}

/// One logical database connection.
///
/// The store handle is opened on first use and shared by every query issued
/// through this wrapper.
pub struct DatabaseWrapper<C: Connector> {
    settings: Settings,
    connector: C,
    store: OnceLock<C::Store>,
    connecting: Mutex<()>,
    pub features: DatabaseFeatures,
    pub ops: DatabaseOperations,
}

impl<C: Connector> DatabaseWrapper<C> {
    pub fn new(settings: Settings, connector: C) -> Self {
        Self {
            settings,
            connector,
            store: OnceLock::new(),
            connecting: Mutex::new(()),
            features: DatabaseFeatures::default(),
            ops: DatabaseOperations::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_connected(&self) -> bool {
        self.store.get().is_some()
    }

    /// The store handle, connecting on first call.
    pub fn connection(&self) -> Result<&C::Store, BackendError> {
        if let Some(store) = self.store.get() {
            return Ok(store);
        }

        // the guard only serializes first use; a panicked connect leaves
        // nothing behind to repair
        let _guard = self.connecting.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = self.store.get() {
            return Ok(store);
        }

        let store = self.connector.connect(&self.settings)?;
        tracing::info!(
            host = %self.settings.host,
            port = ?self.settings.port,
            name = %self.settings.name,
            "store connected"
        );
        Ok(self.store.get_or_init(|| store))
    }

    /// Drop the store handle. The next query reconnects.
    pub fn close(&mut self) {
        if self.store.take().is_some() {
            tracing::info!(name = %self.settings.name, "store closed");
        }
    }

    // ── Reads ──────────────────────────────────────────────────

    /// Stream the rows matching `query`.
    pub fn select<'a>(&'a self, query: &'a SelectQuery) -> Result<StoreRows<'a, C>, BackendError> {
        self.ops.compiler(CompilerKind::Select.name())?;
        let collection = query.model.db_table.as_str();
        let compiler = SelectCompiler::new(query);
        self.checked(collection, compiler.build_filter(false))?;

        let store = self.connection()?;
        self.checked(collection, compiler.results_iter(store))
    }

    /// Whether any row matches `query`.
    pub fn exists(&self, query: &SelectQuery) -> Result<bool, BackendError> {
        self.ops.compiler(CompilerKind::Select.name())?;
        let collection = query.model.db_table.as_str();
        let compiler = SelectCompiler::new(query);
        self.checked(collection, compiler.build_filter(false))?;

        let store = self.connection()?;
        self.checked(collection, compiler.has_results(store))
    }

    /// Number of rows matching `query`. Ordering is irrelevant to a count and
    /// is dropped; the query's own aggregates are replaced by `Count(*)`.
    pub fn count(&self, query: &SelectQuery) -> Result<u64, BackendError> {
        let mut counted = query.clone();
        counted.order_by.clear();
        counted.aggregates = vec![Aggregate::count_star()];

        let values = self.aggregate(&counted)?;
        Ok(values.first().copied().unwrap_or(0))
    }

    /// Evaluate the query's aggregates.
    pub fn aggregate(&self, query: &SelectQuery) -> Result<Vec<u64>, BackendError> {
        self.ops.compiler(CompilerKind::Select.name())?;
        let collection = query.model.db_table.as_str();
        if let Some(agg) = query
            .aggregates
            .iter()
            .find(|a| !self.ops.check_aggregate_support(a))
        {
            let err = CompileError::UnsupportedAggregate(agg.name().to_string());
            return self.checked(collection, Err(err));
        }

        let compiler = SelectCompiler::new(query);
        self.checked(collection, compiler.build_count_filter())?;

        let store = self.connection()?;
        self.checked(collection, compiler.get_aggregates(store))
    }

    // ── Writes ─────────────────────────────────────────────────

    /// Insert one row and return its `_id`. Every insert is expressible, so
    /// there is nothing to validate before connecting.
    pub fn insert(&self, query: &InsertQuery) -> Result<Bson, BackendError> {
        self.ops.compiler(CompilerKind::Insert.name())?;
        let store = self.connection()?;
        let id = InsertCompiler::new(query).insert(store, true);
        let id = self.checked(query.model.db_table.as_str(), id)?;
        Ok(id.unwrap_or(Bson::Null))
    }

    /// Update every matching row; returns the number modified.
    pub fn update(&self, query: &UpdateQuery) -> Result<u64, BackendError> {
        self.ops.compiler(CompilerKind::Update.name())?;
        let collection = query.model.db_table.as_str();
        let compiler = UpdateCompiler::new(query);
        self.checked(collection, compiler.build())?;
        if query.values.is_empty() {
            return Ok(0);
        }

        let store = self.connection()?;
        self.checked(collection, compiler.update(store))
    }

    pub fn execute(&self, intent: &WriteIntent) -> Result<WriteOutcome, BackendError> {
        match intent {
            WriteIntent::Insert(query) => self.insert(query).map(WriteOutcome::Inserted),
            WriteIntent::Update(query) => self.update(query).map(WriteOutcome::Updated),
        }
    }

    // ── Schema ─────────────────────────────────────────────────

    /// Drop every collection.
    pub fn flush(&self) -> Result<(), BackendError> {
        self.ops.flush(self.connection()?)
    }

    fn checked<T>(&self, collection: &str, result: Result<T, CompileError>) -> Result<T, BackendError> {
        result.map_err(BackendError::from).inspect_err(|e| {
            if e.is_unsupported() {
                tracing::warn!(collection, error = %e, "query rejected");
            }
        })
    }
}
