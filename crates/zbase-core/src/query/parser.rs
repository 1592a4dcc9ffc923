//! Text filter language
//!
//! ```text
//! name = "jason" and (age >= 30 or city ~ "paris")
//! ```
//!
//! Conjunctions fold strictly left to right: `a and b or c` is
//! `(a and b) or c`. There is no precedence between `and` and `or`;
//! use parentheses to group.

use pest::error::InputLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::error::Error;
use crate::wire::{LogicalOperator, QueryOperator, SubQuery};
use crate::Result;

use super::{Query, QueryValue};

#[derive(Parser)]
#[grammar = "query/filter.pest"] // relative to src
struct FilterParser;

/// Parsed filter, before semantic checks
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpr {
    pub clause: Clause,
    pub conjunctions: Vec<Conjunction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Subexpression(Box<FilterExpr>),
    Comparison(ComparisonExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonExpr {
    pub field: String,
    pub operator: QueryOperator,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conjunction {
    pub logical: LogicalOperator,
    pub clause: Clause,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Float(f64),
    Integer(i64),
}

impl Literal {
    fn is_string(&self) -> bool {
        matches!(self, Literal::String(_))
    }

    fn to_value(&self) -> QueryValue {
        match self {
            Literal::String(s) => QueryValue::Text(s.clone()),
            Literal::Float(f) => QueryValue::Float(*f),
            Literal::Integer(i) => QueryValue::Int(*i),
        }
    }
}

/// Parse filter text
///
/// Syntax errors carry the byte offset of the offending token. The parser
/// holds no state between calls.
pub fn parse_filter(input: &str) -> Result<FilterExpr> {
    let mut pairs = FilterParser::parse(Rule::filter, input).map_err(|e| {
        let position = match e.location {
            InputLocation::Pos(p) => p,
            InputLocation::Span((start, _)) => start,
        };
        Error::Parse {
            position,
            message: format!(
                "{} (found {:?})",
                e.variant.message(),
                token_at(input, position)
            ),
        }
    })?;

    let filter = next_pair(&mut pairs, 0)?;
    let position = filter.as_span().start();
    let root = next_pair(&mut filter.into_inner(), position)?;
    build_root(root)
}

impl FilterExpr {
    /// Fold into a [`Query`], rejecting operator/value kind mismatches
    pub fn to_query(&self) -> Result<Query> {
        let mut acc = self.clause.to_query()?;
        for conjunction in &self.conjunctions {
            let right = conjunction.clause.to_query()?;
            acc = match conjunction.logical {
                LogicalOperator::And => Query::and(acc, right),
                LogicalOperator::Or => Query::or(acc, right),
            };
        }
        Ok(acc)
    }

    pub fn compile(&self, owner_id: &str, table_id: &str) -> Result<SubQuery> {
        Ok(self.to_query()?.compile(owner_id, table_id))
    }
}

impl Clause {
    fn to_query(&self) -> Result<Query> {
        match self {
            Clause::Subexpression(expr) => expr.to_query(),
            Clause::Comparison(cmp) => cmp.to_query(),
        }
    }
}

impl ComparisonExpr {
    fn to_query(&self) -> Result<Query> {
        if self.operator.is_relational() && self.value.is_string() {
            return Err(Error::InvalidQuery(format!(
                "operator {} on field {:?} requires a number",
                self.operator, self.field
            )));
        }
        if self.operator == QueryOperator::TextSearch && !self.value.is_string() {
            return Err(Error::InvalidQuery(format!(
                "operator ~ on field {:?} requires a string",
                self.field
            )));
        }
        Ok(Query::comparison(
            self.operator,
            self.field.clone(),
            self.value.to_value(),
        ))
    }
}

fn build_root(pair: Pair<'_, Rule>) -> Result<FilterExpr> {
    let position = pair.as_span().start();
    let mut inner = pair.into_inner();
    let clause = build_clause(next_pair(&mut inner, position)?)?;

    let mut conjunctions = Vec::new();
    for conj in inner {
        let position = conj.as_span().start();
        let mut parts = conj.into_inner();
        let logical = match next_pair(&mut parts, position)?.as_str() {
            "and" => LogicalOperator::And,
            _ => LogicalOperator::Or,
        };
        let clause = build_clause(next_pair(&mut parts, position)?)?;
        conjunctions.push(Conjunction { logical, clause });
    }

    Ok(FilterExpr {
        clause,
        conjunctions,
    })
}

fn build_clause(pair: Pair<'_, Rule>) -> Result<Clause> {
    let position = pair.as_span().start();
    let inner = next_pair(&mut pair.into_inner(), position)?;
    match inner.as_rule() {
        Rule::root => Ok(Clause::Subexpression(Box::new(build_root(inner)?))),
        Rule::comparison => Ok(Clause::Comparison(build_comparison(inner)?)),
        other => Err(unexpected(other, position)),
    }
}

fn build_comparison(pair: Pair<'_, Rule>) -> Result<ComparisonExpr> {
    let position = pair.as_span().start();
    let mut parts = pair.into_inner();
    let field = next_pair(&mut parts, position)?.as_str().to_string();
    let operator = match next_pair(&mut parts, position)?.as_str() {
        "=" => QueryOperator::Equals,
        "!=" | "not" => QueryOperator::NotEquals,
        ">" => QueryOperator::GreaterThan,
        ">=" => QueryOperator::GreaterThanEq,
        "<" => QueryOperator::LessThan,
        "<=" => QueryOperator::LessThanEq,
        _ => QueryOperator::TextSearch,
    };
    let value = build_literal(next_pair(&mut parts, position)?)?;
    Ok(ComparisonExpr {
        field,
        operator,
        value,
    })
}

fn build_literal(pair: Pair<'_, Rule>) -> Result<Literal> {
    let position = pair.as_span().start();
    match pair.as_rule() {
        Rule::string => {
            let inner = next_pair(&mut pair.into_inner(), position)?;
            Ok(Literal::String(unescape(inner.as_str())))
        }
        Rule::float => pair
            .as_str()
            .parse::<f64>()
            .map(Literal::Float)
            .map_err(|e| Error::Parse {
                position,
                message: format!("invalid float {:?}: {}", pair.as_str(), e),
            }),
        Rule::int => pair
            .as_str()
            .parse::<i64>()
            .map(Literal::Integer)
            .map_err(|e| Error::Parse {
                position,
                message: format!("invalid integer {:?}: {}", pair.as_str(), e),
            }),
        other => Err(unexpected(other, position)),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn next_pair<'i>(
    pairs: &mut pest::iterators::Pairs<'i, Rule>,
    position: usize,
) -> Result<Pair<'i, Rule>> {
    pairs.next().ok_or_else(|| Error::Parse {
        position,
        message: "unexpected end of filter".to_string(),
    })
}

fn unexpected(rule: Rule, position: usize) -> Error {
    Error::Parse {
        position,
        message: format!("unexpected {:?}", rule),
    }
}

/// The whitespace-delimited token starting at `position`
fn token_at(input: &str, position: usize) -> &str {
    let rest = input.get(position..).unwrap_or("");
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    &rest[..end]
}
