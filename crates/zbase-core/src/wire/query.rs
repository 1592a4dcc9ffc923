//! Wire-level filter tree

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryOperator {
    #[serde(rename = "EQ")]
    Equals,
    #[serde(rename = "NEQ")]
    NotEquals,
    #[serde(rename = "GT")]
    GreaterThan,
    #[serde(rename = "GTE")]
    GreaterThanEq,
    #[serde(rename = "LT")]
    LessThan,
    #[serde(rename = "LTE")]
    LessThanEq,
    #[serde(rename = "TEXT")]
    TextSearch,
}

impl QueryOperator {
    /// Returns true for the four range operators
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            QueryOperator::GreaterThan
                | QueryOperator::GreaterThanEq
                | QueryOperator::LessThan
                | QueryOperator::LessThanEq
        )
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            QueryOperator::Equals => "=",
            QueryOperator::NotEquals => "!=",
            QueryOperator::GreaterThan => ">",
            QueryOperator::GreaterThanEq => ">=",
            QueryOperator::LessThan => "<",
            QueryOperator::LessThanEq => "<=",
            QueryOperator::TextSearch => "~",
        };
        f.write_str(symbol)
    }
}

/// Operator joining the two children of a compound node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "and"),
            LogicalOperator::Or => write!(f, "or"),
        }
    }
}

/// How the service interprets a comparison value when ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryOrdering {
    #[default]
    Lexicographic,
    RealNumbers,
    IntegralNumbers,
    FullText,
}

/// Leaf comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub operator: QueryOperator,
    pub field: String,
    pub value: String,
    pub ordering: QueryOrdering,
}

/// A node of the filter tree sent to the service
///
/// Exactly one of the compound fields or `comparison` is populated. Build
/// nodes with [`SubQuery::compound`] and [`SubQuery::leaf`] to keep that
/// invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQuery {
    pub is_compound: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compound_operator: Option<LogicalOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compound_left: Option<Box<SubQuery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compound_right: Option<Box<SubQuery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

impl SubQuery {
    pub fn compound(operator: LogicalOperator, left: SubQuery, right: SubQuery) -> Self {
        Self {
            is_compound: true,
            compound_operator: Some(operator),
            compound_left: Some(Box::new(left)),
            compound_right: Some(Box::new(right)),
            comparison: None,
        }
    }

    pub fn leaf(comparison: Comparison) -> Self {
        Self {
            is_compound: false,
            compound_operator: None,
            compound_left: None,
            compound_right: None,
            comparison: Some(comparison),
        }
    }

    /// Check the one-of invariant over the whole tree
    ///
    /// Trees received from elsewhere (deserialized) may violate it; trees
    /// built by compiling a query never do.
    pub fn is_well_formed(&self) -> bool {
        if self.is_compound {
            let children = match (&self.compound_left, &self.compound_right) {
                (Some(left), Some(right)) => left.is_well_formed() && right.is_well_formed(),
                _ => false,
            };
            children && self.compound_operator.is_some() && self.comparison.is_none()
        } else {
            match &self.comparison {
                Some(cmp) => {
                    self.compound_operator.is_none()
                        && self.compound_left.is_none()
                        && self.compound_right.is_none()
                        && (cmp.operator != QueryOperator::TextSearch
                            || cmp.ordering == QueryOrdering::FullText)
                }
                None => false,
            }
        }
    }

    /// Number of leaf comparisons in the tree
    pub fn leaf_count(&self) -> usize {
        if self.is_compound {
            self.compound_left.as_ref().map_or(0, |l| l.leaf_count())
                + self.compound_right.as_ref().map_or(0, |r| r.leaf_count())
        } else {
            usize::from(self.comparison.is_some())
        }
    }
}
