use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::field::Lhs;
use crate::lookup::Lookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// A leaf comparison.
///
/// `annotation` only matters for [`Lookup::IsNull`]: `false` reads
/// `IS NULL`, `true` reads `IS NOT NULL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub lhs: Lhs,
    pub lookup: Lookup,
    #[serde(default)]
    pub annotation: bool,
    pub value: Bson,
    #[serde(default)]
    pub negated: bool,
}

impl Atom {
    pub fn new(lhs: impl Into<Lhs>, lookup: Lookup, value: impl Into<Bson>) -> Self {
        Self {
            lhs: lhs.into(),
            lookup,
            annotation: false,
            value: value.into(),
            negated: false,
        }
    }

    pub fn exact(lhs: impl Into<Lhs>, value: impl Into<Bson>) -> Self {
        Self::new(lhs, Lookup::Exact, value)
    }

    /// `IS NULL` when `is_null` is true, `IS NOT NULL` otherwise.
    pub fn is_null(lhs: impl Into<Lhs>, is_null: bool) -> Self {
        Self {
            annotation: !is_null,
            ..Self::new(lhs, Lookup::IsNull, is_null)
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhereNode {
    Atom(Atom),
    Group(WhereGroup),
}

impl From<Atom> for WhereNode {
    fn from(atom: Atom) -> Self {
        WhereNode::Atom(atom)
    }
}

impl From<WhereGroup> for WhereNode {
    fn from(group: WhereGroup) -> Self {
        WhereNode::Group(group)
    }
}

/// An AND/OR group of predicates. Negation applies to the group as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereGroup {
    pub connector: Connector,
    #[serde(default)]
    pub negated: bool,
    pub children: Vec<WhereNode>,
}

impl Default for WhereGroup {
    fn default() -> Self {
        Self::and(Vec::new())
    }
}

impl WhereGroup {
    pub fn and(children: Vec<WhereNode>) -> Self {
        Self {
            connector: Connector::And,
            negated: false,
            children,
        }
    }

    pub fn or(children: Vec<WhereNode>) -> Self {
        Self {
            connector: Connector::Or,
            negated: false,
            children,
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn push(&mut self, child: impl Into<WhereNode>) {
        self.children.push(child.into());
    }

    /// `filter(...)`: AND the condition into this group.
    pub fn filter(mut self, child: impl Into<WhereNode>) -> Self {
        self.push(child);
        self
    }

    /// `exclude(...)`: AND the negation of the given conditions.
    pub fn exclude(mut self, children: Vec<WhereNode>) -> Self {
        self.push(WhereGroup::and(children).negate());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ColumnRef;

    #[test]
    fn is_null_sets_annotation() {
        let atom = Atom::is_null(ColumnRef::new("group", "year_formed"), true);
        assert!(!atom.annotation);
        let atom = Atom::is_null(ColumnRef::new("group", "year_formed"), false);
        assert!(atom.annotation);
    }

    #[test]
    fn exclude_appends_negated_group() {
        let tree = WhereGroup::default()
            .exclude(vec![Atom::exact(ColumnRef::new("group", "year_formed"), 1972).into()]);
        match &tree.children[0] {
            WhereNode::Group(g) => {
                assert!(g.negated);
                assert_eq!(g.connector, Connector::And);
                assert_eq!(g.children.len(), 1);
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn tree_serializes_snake_case() {
        let tree = WhereGroup::and(vec![Atom::exact(ColumnRef::new("a", "b"), 1).into()]);
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["connector"], "and");
        assert_eq!(json["children"][0]["atom"]["lookup"], "exact");
    }
}
