use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::field::ColumnRef;
use crate::model::Model;
use crate::node::WhereGroup;

/// A table alias in the query's FROM list. Aliases with a zero refcount are
/// leftovers of the query layer and are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAlias {
    pub alias: String,
    pub table: String,
    pub refcount: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateTarget {
    Star,
    Column(ColumnRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    Count {
        target: AggregateTarget,
        #[serde(default)]
        distinct: bool,
    },
    Sum(ColumnRef),
    Avg(ColumnRef),
    Min(ColumnRef),
    Max(ColumnRef),
}

impl Aggregate {
    pub fn count_star() -> Self {
        Aggregate::Count {
            target: AggregateTarget::Star,
            distinct: false,
        }
    }

    pub fn count(column: ColumnRef) -> Self {
        Aggregate::Count {
            target: AggregateTarget::Column(column),
            distinct: false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Aggregate::Count { .. } => "Count",
            Aggregate::Sum(_) => "Sum",
            Aggregate::Avg(_) => "Avg",
            Aggregate::Min(_) => "Min",
            Aggregate::Max(_) => "Max",
        }
    }
}

/// A read query against one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    pub model: Model,
    #[serde(default)]
    pub aliases: Vec<TableAlias>,
    #[serde(default)]
    pub where_: WhereGroup,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub extra: Vec<String>,
    #[serde(default)]
    pub having: Option<WhereGroup>,
    #[serde(default)]
    pub low_mark: usize,
    #[serde(default)]
    pub high_mark: Option<usize>,
    #[serde(default)]
    pub order_by: Vec<String>,
    #[serde(default = "default_cols")]
    pub default_cols: bool,
    #[serde(default)]
    pub aggregates: Vec<Aggregate>,
}

fn default_cols() -> bool {
    true
}

impl SelectQuery {
    pub fn new(model: Model) -> Self {
        let aliases = vec![TableAlias {
            alias: model.db_table.clone(),
            table: model.db_table.clone(),
            refcount: 1,
        }];
        Self {
            model,
            aliases,
            where_: WhereGroup::default(),
            distinct: false,
            extra: Vec::new(),
            having: None,
            low_mark: 0,
            high_mark: None,
            order_by: Vec::new(),
            default_cols: true,
            aggregates: Vec::new(),
        }
    }

    pub fn filter(mut self, where_: WhereGroup) -> Self {
        self.where_ = where_;
        self
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregates.push(aggregate);
        self
    }

    /// Aliases that are actually referenced.
    pub fn active_aliases(&self) -> impl Iterator<Item = &TableAlias> {
        self.aliases.iter().filter(|a| a.refcount > 0)
    }
}

/// Insert of a single row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertQuery {
    pub model: Model,
    pub values: Vec<(String, Bson)>,
}

impl InsertQuery {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            values: Vec::new(),
        }
    }

    pub fn value(mut self, column: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }
}

/// Update of every row matching `where_`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateQuery {
    pub model: Model,
    #[serde(default)]
    pub where_: WhereGroup,
    pub values: Vec<(String, Bson)>,
}

impl UpdateQuery {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            where_: WhereGroup::default(),
            values: Vec::new(),
        }
    }

    pub fn filter(mut self, where_: WhereGroup) -> Self {
        self.where_ = where_;
        self
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }
}

/// A row mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteIntent {
    Insert(InsertQuery),
    Update(UpdateQuery),
}
