//! Predicate model
//!
//! Value objects for one builder-declared condition: a leaf condition on a
//! column, or a nested sub-query carrying its own state.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

use super::errors::{QueryError, QueryResult};
use super::state::QueryState;

/// Leaf clause kinds understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Term,
    Terms,
    Match,
    MatchPhrase,
    Range,
    MultiMatch,
    Wildcard,
    Exists,
}

impl LeafKind {
    /// Returns the wire name of the clause
    pub fn as_str(&self) -> &'static str {
        match self {
            LeafKind::Term => "term",
            LeafKind::Terms => "terms",
            LeafKind::Match => "match",
            LeafKind::MatchPhrase => "match_phrase",
            LeafKind::Range => "range",
            LeafKind::MultiMatch => "multi_match",
            LeafKind::Wildcard => "wildcard",
            LeafKind::Exists => "exists",
        }
    }
}

impl FromStr for LeafKind {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        match s {
            "term" => Ok(LeafKind::Term),
            "terms" => Ok(LeafKind::Terms),
            "match" => Ok(LeafKind::Match),
            "match_phrase" => Ok(LeafKind::MatchPhrase),
            "range" => Ok(LeafKind::Range),
            "multi_match" => Ok(LeafKind::MultiMatch),
            "wildcard" => Ok(LeafKind::Wildcard),
            "exists" => Ok(LeafKind::Exists),
            other => Err(QueryError::invalid_argument(other)),
        }
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Comparison operator attached to a leaf predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// field = value
    Eq,
    /// field > value
    Gt,
    /// field >= value
    Gte,
    /// field < value
    Lt,
    /// field <= value
    Lte,
    /// Negated clause, whatever the leaf kind
    Ne,
}

impl Operator {
    /// Parses a caller-facing comparison symbol (`=`, `>`, `>=`, `<`, `<=`, `!=`)
    pub fn from_symbol(symbol: &str) -> QueryResult<Self> {
        match symbol {
            "=" => Ok(Operator::Eq),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            "!=" => Ok(Operator::Ne),
            other => Err(QueryError::invalid_argument(other)),
        }
    }

    /// Returns the wire name (`eq`, `gt`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Ne => "ne",
        }
    }

    /// Returns true for the bound operators usable inside a range clause
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a predicate joins the predicates before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conjunction::And => "and",
            Conjunction::Or => "or",
        }
    }
}

impl FromStr for Conjunction {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        match s {
            "and" => Ok(Conjunction::And),
            "or" => Ok(Conjunction::Or),
            other => Err(QueryError::invalid_argument(other)),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Wire-shaped sort spec for a single field
    pub fn to_spec(self) -> Value {
        json!({ "order": self.as_str() })
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(QueryError::invalid_argument(s)),
        }
    }
}

/// Metric and bucket aggregations declared by field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationKind {
    Terms,
    Avg,
    Sum,
    Min,
    Max,
    Stats,
    Cardinality,
    ValueCount,
}

impl AggregationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationKind::Terms => "terms",
            AggregationKind::Avg => "avg",
            AggregationKind::Sum => "sum",
            AggregationKind::Min => "min",
            AggregationKind::Max => "max",
            AggregationKind::Stats => "stats",
            AggregationKind::Cardinality => "cardinality",
            AggregationKind::ValueCount => "value_count",
        }
    }

    /// Wire-shaped aggregation spec over `field`
    pub fn to_spec(self, field: &str) -> Value {
        let mut spec = Map::new();
        spec.insert(self.as_str().to_string(), json!({ "field": field }));
        Value::Object(spec)
    }
}

impl FromStr for AggregationKind {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        match s {
            "terms" => Ok(AggregationKind::Terms),
            "avg" => Ok(AggregationKind::Avg),
            "sum" => Ok(AggregationKind::Sum),
            "min" => Ok(AggregationKind::Min),
            "max" => Ok(AggregationKind::Max),
            "stats" => Ok(AggregationKind::Stats),
            "cardinality" => Ok(AggregationKind::Cardinality),
            "value_count" => Ok(AggregationKind::ValueCount),
            other => Err(QueryError::invalid_argument(other)),
        }
    }
}

/// One declared condition
///
/// A `Nested` predicate carries a full query state snapshot and is compiled
/// through the whole resolver. A `Basic` predicate whose operator is
/// [`Operator::Ne`] is negated regardless of its leaf kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Basic {
        column: String,
        leaf: LeafKind,
        operator: Option<Operator>,
        value: Value,
        conjunction: Conjunction,
    },
    Nested {
        query: Box<QueryState>,
        conjunction: Conjunction,
    },
}

impl Predicate {
    /// Create a leaf predicate as-is
    pub fn basic(
        column: impl Into<String>,
        leaf: LeafKind,
        operator: Option<Operator>,
        value: Value,
        conjunction: Conjunction,
    ) -> Self {
        Predicate::Basic {
            column: column.into(),
            leaf,
            operator,
            value,
            conjunction,
        }
    }

    /// Create a nested sub-query predicate
    pub fn nested(query: QueryState, conjunction: Conjunction) -> Self {
        Predicate::Nested {
            query: Box::new(query),
            conjunction,
        }
    }

    /// Create a leaf predicate applying the `where` shorthand rules:
    ///
    /// - a bound operator (`gt`, `gte`, `lt`, `lte`) forces a range leaf
    /// - an array value on a range leaf becomes `{gte: v[0], lte: v[1]}`
    pub fn from_where(
        column: impl Into<String>,
        operator: Option<Operator>,
        value: Value,
        leaf: LeafKind,
        conjunction: Conjunction,
    ) -> QueryResult<Self> {
        let column = column.into();
        let leaf = match operator {
            Some(op) if op.is_comparison() => LeafKind::Range,
            _ => leaf,
        };

        let value = match (&value, leaf) {
            (Value::Array(bounds), LeafKind::Range) => {
                if bounds.len() != 2 {
                    return Err(QueryError::invalid_argument(format!(
                        "range bounds for '{}' must have exactly two values",
                        column
                    )));
                }
                let mut range = Map::new();
                range.insert(Operator::Gte.as_str().to_string(), bounds[0].clone());
                range.insert(Operator::Lte.as_str().to_string(), bounds[1].clone());
                Value::Object(range)
            }
            _ => value,
        };

        Ok(Predicate::basic(column, leaf, operator, value, conjunction))
    }

    /// Returns the conjunction tag
    pub fn conjunction(&self) -> Conjunction {
        match self {
            Predicate::Basic { conjunction, .. } | Predicate::Nested { conjunction, .. } => {
                *conjunction
            }
        }
    }

    /// Returns true if this predicate starts a new OR group
    pub fn is_or(&self) -> bool {
        self.conjunction() == Conjunction::Or
    }

    /// Returns true if this predicate compiles into a not-clause
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            Predicate::Basic {
                operator: Some(Operator::Ne),
                ..
            }
        )
    }

    /// Returns true for nested sub-query predicates
    pub fn is_nested(&self) -> bool {
        matches!(self, Predicate::Nested { .. })
    }
}
