use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use quarry_query::Aggregate;
use quarry_store::Store;

use crate::error::BackendError;

/// Which compiler handles a query, by the name the query layer asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompilerKind {
    Select,
    Insert,
    Update,
}

impl CompilerKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SQLCompiler" => Some(CompilerKind::Select),
            "SQLInsertCompiler" => Some(CompilerKind::Insert),
            "SQLUpdateCompiler" => Some(CompilerKind::Update),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompilerKind::Select => "SQLCompiler",
            CompilerKind::Insert => "SQLInsertCompiler",
            CompilerKind::Update => "SQLUpdateCompiler",
        }
    }
}

/// Capabilities the query layer consults before building a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatabaseFeatures {
    pub interprets_empty_strings_as_nulls: bool,
    pub sql_nulls: bool,
    pub related_fields_match_type: bool,
    pub supports_transactions: bool,
}

/// Backend-specific operations, including the per-connection compiler cache.
#[derive(Debug, Default)]
pub struct DatabaseOperations {
    compilers: RwLock<HashMap<String, CompilerKind>>,
}

impl DatabaseOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Longest collection or field name the store accepts.
    pub fn max_name_length(&self) -> usize {
        254
    }

    /// Resolve a compiler by name, caching the result.
    ///
    /// The cache only ever holds complete name/kind pairs, so a poisoned lock
    /// is recovered rather than reported.
    pub fn compiler(&self, name: &str) -> Result<CompilerKind, BackendError> {
        {
            let cache = self.compilers.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(kind) = cache.get(name) {
                return Ok(*kind);
            }
        }

        let kind = CompilerKind::from_name(name)
            .ok_or_else(|| BackendError::UnknownCompiler(name.to_string()))?;
        let mut cache = self.compilers.write().unwrap_or_else(PoisonError::into_inner);
        if cache.insert(name.to_string(), kind).is_none() {
            tracing::info!(name, ?kind, "compiler resolved");
        }
        Ok(kind)
    }

    /// Number of compiler names resolved so far.
    pub fn cached_compilers(&self) -> usize {
        self.compilers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Only row counts are evaluated by the store.
    pub fn check_aggregate_support(&self, aggregate: &Aggregate) -> bool {
        matches!(aggregate, Aggregate::Count { .. })
    }

    /// Drop every collection in the store.
    pub fn flush<S: Store>(&self, store: &S) -> Result<(), BackendError> {
        for name in store.list_collections()? {
            tracing::debug!(collection = %name, "drop collection");
            store.drop_collection(&name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_query::ColumnRef;

    #[test]
    fn resolves_known_names() {
        let ops = DatabaseOperations::new();
        for kind in [CompilerKind::Select, CompilerKind::Insert, CompilerKind::Update] {
            assert_eq!(ops.compiler(kind.name()).unwrap(), kind);
        }
        assert_eq!(ops.cached_compilers(), 3);
    }

    #[test]
    fn caches_once() {
        let ops = DatabaseOperations::new();
        ops.compiler("SQLCompiler").unwrap();
        ops.compiler("SQLCompiler").unwrap();
        assert_eq!(ops.cached_compilers(), 1);
    }

    #[test]
    fn unknown_name() {
        let ops = DatabaseOperations::new();
        let err = ops.compiler("SQLDeleteCompiler").unwrap_err();
        assert!(matches!(err, BackendError::UnknownCompiler(ref n) if n == "SQLDeleteCompiler"));
        assert_eq!(ops.cached_compilers(), 0);
    }

    #[test]
    fn poisoned_cache_still_resolves() {
        let ops = DatabaseOperations::new();
        ops.compiler("SQLCompiler").unwrap();

        std::thread::scope(|s| {
            let handle = s.spawn(|| {
                let _guard = ops.compilers.write().unwrap();
                panic!("poison the cache");
            });
            assert!(handle.join().is_err());
        });
        assert!(ops.compilers.is_poisoned());

        assert_eq!(ops.cached_compilers(), 1);
        assert_eq!(ops.compiler("SQLCompiler").unwrap(), CompilerKind::Select);
        assert_eq!(ops.compiler("SQLUpdateCompiler").unwrap(), CompilerKind::Update);
        assert_eq!(ops.cached_compilers(), 2);
    }

    #[test]
    fn aggregate_support() {
        let ops = DatabaseOperations::new();
        assert!(ops.check_aggregate_support(&Aggregate::count_star()));
        assert!(!ops.check_aggregate_support(&Aggregate::Sum(ColumnRef::new("group", "year_formed"))));
    }

    #[test]
    fn limits_and_features() {
        assert_eq!(DatabaseOperations::new().max_name_length(), 254);
        let features = DatabaseFeatures::default();
        assert!(!features.sql_nulls);
        assert!(!features.interprets_empty_strings_as_nulls);
    }
}
