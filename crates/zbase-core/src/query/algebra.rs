//! Typed query nodes and their compilation to the wire tree

use crate::wire::{Comparison, LogicalOperator, QueryOperator, QueryOrdering, SubQuery};

use super::QueryValue;

/// A filter over the records of one table
///
/// Build trees with the constructor functions:
///
/// ```
/// use zbase_core::Query;
///
/// let q = Query::and(
///     Query::or(Query::eq("uid", "jason"), Query::eq("uid", "charlotte")),
///     Query::eq("type", 1),
/// );
/// let wire = q.compile("owner", "table");
/// assert!(wire.is_compound);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    And(Box<Query>, Box<Query>),
    Or(Box<Query>, Box<Query>),
    Eq(String, QueryValue),
    NotEq(String, QueryValue),
    Gt(String, QueryValue),
    Gte(String, QueryValue),
    Lt(String, QueryValue),
    Lte(String, QueryValue),
    TextSearch(String, QueryValue),
}

impl Query {
    pub fn and(left: Query, right: Query) -> Self {
        Query::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Query, right: Query) -> Self {
        Query::Or(Box::new(left), Box::new(right))
    }

    pub fn eq(field: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Query::Eq(field.into(), value.into())
    }

    pub fn not_eq(field: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Query::NotEq(field.into(), value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Query::Gt(field.into(), value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Query::Gte(field.into(), value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Query::Lt(field.into(), value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Query::Lte(field.into(), value.into())
    }

    pub fn text(field: impl Into<String>, text: impl Into<QueryValue>) -> Self {
        Query::TextSearch(field.into(), text.into())
    }

    /// Build a leaf from an operator; used by the filter language
    pub(crate) fn comparison(op: QueryOperator, field: String, value: QueryValue) -> Self {
        match op {
            QueryOperator::Equals => Query::Eq(field, value),
            QueryOperator::NotEquals => Query::NotEq(field, value),
            QueryOperator::GreaterThan => Query::Gt(field, value),
            QueryOperator::GreaterThanEq => Query::Gte(field, value),
            QueryOperator::LessThan => Query::Lt(field, value),
            QueryOperator::LessThanEq => Query::Lte(field, value),
            QueryOperator::TextSearch => Query::TextSearch(field, value),
        }
    }

    /// Compile to the wire tree
    ///
    /// `owner_id` and `table_id` identify the table the query runs against.
    /// Compilation itself does not depend on them; they are accepted so that
    /// algebra-built and parsed queries go through the same entry point.
    pub fn compile(&self, owner_id: &str, table_id: &str) -> SubQuery {
        match self {
            Query::And(l, r) => SubQuery::compound(
                LogicalOperator::And,
                l.compile(owner_id, table_id),
                r.compile(owner_id, table_id),
            ),
            Query::Or(l, r) => SubQuery::compound(
                LogicalOperator::Or,
                l.compile(owner_id, table_id),
                r.compile(owner_id, table_id),
            ),
            Query::Eq(field, value) => leaf(QueryOperator::Equals, field, value),
            Query::NotEq(field, value) => leaf(QueryOperator::NotEquals, field, value),
            Query::Gt(field, value) => leaf(QueryOperator::GreaterThan, field, value),
            Query::Gte(field, value) => leaf(QueryOperator::GreaterThanEq, field, value),
            Query::Lt(field, value) => leaf(QueryOperator::LessThan, field, value),
            Query::Lte(field, value) => leaf(QueryOperator::LessThanEq, field, value),
            Query::TextSearch(field, value) => {
                let (value, _) = value.typify();
                SubQuery::leaf(Comparison {
                    operator: QueryOperator::TextSearch,
                    field: field.clone(),
                    value,
                    ordering: QueryOrdering::FullText,
                })
            }
        }
    }
}

fn leaf(operator: QueryOperator, field: &str, value: &QueryValue) -> SubQuery {
    let (value, ordering) = value.typify();
    SubQuery::leaf(Comparison {
        operator,
        field: field.to_string(),
        value,
        ordering,
    })
}

/// Free-standing form of [`Query::compile`]
pub fn compile(query: &Query, owner_id: &str, table_id: &str) -> SubQuery {
    query.compile(owner_id, table_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(node: &SubQuery) -> &Comparison {
        node.comparison.as_ref().expect("leaf should carry a comparison")
    }

    #[test]
    fn test_compound_tree_shape() {
        let q = Query::and(
            Query::or(Query::eq("uid", "jason"), Query::eq("uid", "charlotte")),
            Query::eq("type", 1),
        );
        let root = q.compile("usr", "table");

        assert!(root.is_compound);
        assert_eq!(root.compound_operator, Some(LogicalOperator::And));
        assert!(root.comparison.is_none());

        let left = root.compound_left.as_deref().unwrap();
        assert_eq!(left.compound_operator, Some(LogicalOperator::Or));
        let jason = comparison(left.compound_left.as_deref().unwrap());
        assert_eq!(jason.operator, QueryOperator::Equals);
        assert_eq!(jason.value, "jason");
        assert_eq!(jason.ordering, QueryOrdering::Lexicographic);
        let charlotte = comparison(left.compound_right.as_deref().unwrap());
        assert_eq!(charlotte.value, "charlotte");

        let right = comparison(root.compound_right.as_deref().unwrap());
        assert_eq!(right.field, "type");
        assert_eq!(right.value, "1");
        assert_eq!(right.ordering, QueryOrdering::RealNumbers);

        assert!(root.is_well_formed());
    }

    #[test]
    fn test_text_search_forces_full_text() {
        for q in [
            Query::text("body", "hello"),
            Query::text("body", 12),
            Query::text("body", 1.5),
            Query::text("body", true),
        ] {
            let node = q.compile("o", "t");
            let cmp = comparison(&node);
            assert_eq!(cmp.operator, QueryOperator::TextSearch);
            assert_eq!(cmp.ordering, QueryOrdering::FullText);
        }
    }

    #[test]
    fn test_each_operator_maps() {
        let cases = [
            (Query::eq("f", 1), QueryOperator::Equals),
            (Query::not_eq("f", 1), QueryOperator::NotEquals),
            (Query::gt("f", 1), QueryOperator::GreaterThan),
            (Query::gte("f", 1), QueryOperator::GreaterThanEq),
            (Query::lt("f", 1), QueryOperator::LessThan),
            (Query::lte("f", 1), QueryOperator::LessThanEq),
        ];
        for (q, op) in cases {
            assert_eq!(comparison(&q.compile("o", "t")).operator, op);
        }
    }

    #[test]
    fn test_compile_ignores_table_scope() {
        let q = Query::gte("age", 30);
        assert_eq!(q.compile("a", "b"), compile(&q, "c", "d"));
    }
}
