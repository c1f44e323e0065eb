//! Fluent predicate declarations
//!
//! Every method appends one predicate to the state returned by
//! [`Filters::filter_state`] and hands `self` back for chaining. The `or_`
//! variants start a new OR group; `not` variants compile into not-clauses.

use serde_json::{Map, Value};

use super::ast::{Conjunction, LeafKind, Operator, Predicate};
use super::errors::QueryResult;
use super::state::QueryState;
use crate::compiler::MULTI_FIELD_SEPARATOR;

pub trait Filters {
    /// The state predicates are appended to
    fn filter_state(&mut self) -> &mut QueryState;

    /// Appends a predicate as-is
    fn filter(&mut self, predicate: Predicate) -> &mut Self {
        self.filter_state().add_predicate(predicate);
        self
    }

    // Term

    fn where_term(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(leaf(column, LeafKind::Term, Operator::Eq, value.into(), Conjunction::And))
    }

    fn or_where_term(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(leaf(column, LeafKind::Term, Operator::Eq, value.into(), Conjunction::Or))
    }

    /// Negated term
    fn where_not(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(leaf(column, LeafKind::Term, Operator::Ne, value.into(), Conjunction::And))
    }

    fn or_where_not(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(leaf(column, LeafKind::Term, Operator::Ne, value.into(), Conjunction::Or))
    }

    // Terms

    fn where_in<I, V>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = to_array(values);
        self.filter(leaf(column, LeafKind::Terms, Operator::Eq, values, Conjunction::And))
    }

    fn or_where_in<I, V>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = to_array(values);
        self.filter(leaf(column, LeafKind::Terms, Operator::Eq, values, Conjunction::Or))
    }

    fn where_not_in<I, V>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = to_array(values);
        self.filter(leaf(column, LeafKind::Terms, Operator::Ne, values, Conjunction::And))
    }

    // Full text

    fn where_match(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(leaf(column, LeafKind::Match, Operator::Eq, value.into(), Conjunction::And))
    }

    fn or_where_match(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(leaf(column, LeafKind::Match, Operator::Eq, value.into(), Conjunction::Or))
    }

    fn where_match_phrase(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(leaf(
            column,
            LeafKind::MatchPhrase,
            Operator::Eq,
            value.into(),
            Conjunction::And,
        ))
    }

    fn or_where_match_phrase(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.filter(leaf(
            column,
            LeafKind::MatchPhrase,
            Operator::Eq,
            value.into(),
            Conjunction::Or,
        ))
    }

    /// Phrase match of `query` across several fields
    fn where_multi_match(&mut self, fields: &[&str], query: impl Into<Value>) -> &mut Self {
        let column = fields.join(MULTI_FIELD_SEPARATOR.to_string().as_str());
        self.filter(leaf(
            &column,
            LeafKind::MultiMatch,
            Operator::Eq,
            query.into(),
            Conjunction::And,
        ))
    }

    /// Substring match: `needle` is wrapped as `*needle*`
    fn where_like(&mut self, column: &str, needle: impl Into<Value>) -> &mut Self {
        self.filter(leaf(
            column,
            LeafKind::Wildcard,
            Operator::Eq,
            needle.into(),
            Conjunction::And,
        ))
    }

    fn or_where_like(&mut self, column: &str, needle: impl Into<Value>) -> &mut Self {
        self.filter(leaf(
            column,
            LeafKind::Wildcard,
            Operator::Eq,
            needle.into(),
            Conjunction::Or,
        ))
    }

    // Range

    /// Single-bound range, e.g. `where_range("age", Operator::Gte, 18)`
    fn where_range(
        &mut self,
        column: &str,
        operator: Operator,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.filter(leaf(column, LeafKind::Range, operator, value.into(), Conjunction::And))
    }

    fn or_where_range(
        &mut self,
        column: &str,
        operator: Operator,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.filter(leaf(column, LeafKind::Range, operator, value.into(), Conjunction::Or))
    }

    /// Inclusive range `low <= column <= high`
    fn where_between(
        &mut self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> &mut Self {
        self.filter(between(column, low.into(), high.into(), None, Conjunction::And))
    }

    fn or_where_between(
        &mut self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> &mut Self {
        self.filter(between(column, low.into(), high.into(), None, Conjunction::Or))
    }

    fn where_not_between(
        &mut self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> &mut Self {
        self.filter(between(
            column,
            low.into(),
            high.into(),
            Some(Operator::Ne),
            Conjunction::And,
        ))
    }

    fn or_where_not_between(
        &mut self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> &mut Self {
        self.filter(between(
            column,
            low.into(),
            high.into(),
            Some(Operator::Ne),
            Conjunction::Or,
        ))
    }

    // Existence

    fn where_exists(&mut self, column: &str) -> &mut Self {
        self.filter(leaf(column, LeafKind::Exists, Operator::Eq, Value::Null, Conjunction::And))
    }

    fn or_where_exists(&mut self, column: &str) -> &mut Self {
        self.filter(leaf(column, LeafKind::Exists, Operator::Eq, Value::Null, Conjunction::Or))
    }

    fn where_not_exists(&mut self, column: &str) -> &mut Self {
        self.filter(leaf(column, LeafKind::Exists, Operator::Ne, Value::Null, Conjunction::And))
    }

    // Generic

    /// Declares a predicate through the `where` shorthand rules: a bound
    /// operator forces a range leaf, and a two-element array on a range
    /// leaf becomes an inclusive bounds object.
    fn where_op(
        &mut self,
        column: &str,
        operator: Operator,
        value: impl Into<Value>,
        leaf_kind: LeafKind,
    ) -> QueryResult<&mut Self> {
        let predicate =
            Predicate::from_where(column, Some(operator), value.into(), leaf_kind, Conjunction::And)?;
        Ok(self.filter(predicate))
    }

    fn or_where_op(
        &mut self,
        column: &str,
        operator: Operator,
        value: impl Into<Value>,
        leaf_kind: LeafKind,
    ) -> QueryResult<&mut Self> {
        let predicate =
            Predicate::from_where(column, Some(operator), value.into(), leaf_kind, Conjunction::Or)?;
        Ok(self.filter(predicate))
    }

    /// `where_op` on a term leaf with an operator symbol: `=`, `!=`, `>`,
    /// `>=`, `<`, `<=`
    fn where_symbol(
        &mut self,
        column: &str,
        symbol: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        let operator = Operator::from_symbol(symbol)?;
        self.where_op(column, operator, value, LeafKind::Term)
    }

    // Nested

    /// Groups the predicates declared in `build` into one sub-query
    fn where_nested<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut QueryState),
    {
        let mut inner = QueryState::new();
        build(&mut inner);
        self.filter(Predicate::nested(inner, Conjunction::And))
    }

    fn or_where_nested<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut QueryState),
    {
        let mut inner = QueryState::new();
        build(&mut inner);
        self.filter(Predicate::nested(inner, Conjunction::Or))
    }
}

impl Filters for QueryState {
    fn filter_state(&mut self) -> &mut QueryState {
        self
    }
}

fn leaf(
    column: &str,
    kind: LeafKind,
    operator: Operator,
    value: Value,
    conjunction: Conjunction,
) -> Predicate {
    Predicate::basic(column, kind, Some(operator), value, conjunction)
}

fn between(
    column: &str,
    low: Value,
    high: Value,
    operator: Option<Operator>,
    conjunction: Conjunction,
) -> Predicate {
    let mut bounds = Map::new();
    bounds.insert(Operator::Gte.as_str().to_string(), low);
    bounds.insert(Operator::Lte.as_str().to_string(), high);
    Predicate::basic(column, LeafKind::Range, operator, Value::Object(bounds), conjunction)
}

fn to_array<I, V>(values: I) -> Value
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Value::Array(values.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Resolver;
    use serde_json::json;

    #[test]
    fn test_term_family() {
        let mut state = QueryState::new();
        state.where_term("status", "active").where_not("role", "guest");

        let predicates = state.predicates();
        assert_eq!(predicates.len(), 2);
        assert!(!predicates[0].is_negated());
        assert!(predicates[1].is_negated());
    }

    #[test]
    fn test_or_variants_start_groups() {
        let mut state = QueryState::new();
        state
            .where_term("a", 1)
            .or_where_term("b", 2)
            .or_where_in("c", vec![3, 4]);

        let tags: Vec<bool> = state.predicates().iter().map(Predicate::is_or).collect();
        assert_eq!(tags, vec![false, true, true]);
    }

    #[test]
    fn test_where_in_collects_array() {
        let mut state = QueryState::new();
        state.where_in("id", ["a", "b"]);

        let query = Resolver::resolve_query(&state).unwrap();
        assert_eq!(query, json!({ "bool": { "must": [{ "terms": { "id": ["a", "b"] } }] } }));
    }

    #[test]
    fn test_where_between_builds_bounds() {
        let mut state = QueryState::new();
        state.where_between("age", 18, 65);

        let query = Resolver::resolve_query(&state).unwrap();
        assert_eq!(
            query,
            json!({ "bool": { "must": [{ "range": { "age": { "gte": 18, "lte": 65 } } }] } })
        );
    }

    #[test]
    fn test_where_not_between_is_negated() {
        let mut state = QueryState::new();
        state.where_not_between("age", 18, 65);

        let query = Resolver::resolve_query(&state).unwrap();
        assert_eq!(
            query,
            json!({ "bool": { "must_not": [{ "range": { "age": { "gte": 18, "lte": 65 } } }] } })
        );
    }

    #[test]
    fn test_where_not_exists() {
        let mut state = QueryState::new();
        state.where_not_exists("deleted_at");

        let query = Resolver::resolve_query(&state).unwrap();
        assert_eq!(
            query,
            json!({ "bool": { "must_not": [{ "exists": { "field": "deleted_at" } }] } })
        );
    }

    #[test]
    fn test_where_multi_match_joins_fields() {
        let mut state = QueryState::new();
        state.where_multi_match(&["title", "body"], "rust");

        let query = Resolver::resolve_query(&state).unwrap();
        assert_eq!(
            query["bool"]["must"][0],
            json!({
                "multi_match": { "query": "rust", "fields": ["title", "body"], "type": "phrase" }
            })
        );
    }

    #[test]
    fn test_where_symbol() {
        let mut state = QueryState::new();
        state.where_symbol("age", ">=", 21).unwrap();
        state.where_symbol("name", "=", "bob").unwrap();

        match &state.predicates()[0] {
            Predicate::Basic { leaf, operator, .. } => {
                assert_eq!(*leaf, LeafKind::Range);
                assert_eq!(*operator, Some(Operator::Gte));
            }
            other => panic!("unexpected predicate {:?}", other),
        }
        match &state.predicates()[1] {
            Predicate::Basic { leaf, .. } => assert_eq!(*leaf, LeafKind::Term),
            other => panic!("unexpected predicate {:?}", other),
        }
    }

    #[test]
    fn test_where_symbol_rejects_unknown() {
        let mut state = QueryState::new();
        let err = state.where_symbol("age", "=>", 21).unwrap_err();
        assert_eq!(err.code(), "ELASTIC_INVALID_ARGUMENT");
        assert!(state.predicates().is_empty());
    }

    #[test]
    fn test_where_op_array_range() {
        let mut state = QueryState::new();
        state
            .where_op("price", Operator::Eq, json!([10, 20]), LeafKind::Range)
            .unwrap();

        match &state.predicates()[0] {
            Predicate::Basic { value, .. } => assert_eq!(*value, json!({ "gte": 10, "lte": 20 })),
            other => panic!("unexpected predicate {:?}", other),
        }
    }

    #[test]
    fn test_where_nested_collects_inner_state() {
        let mut state = QueryState::new();
        state.where_term("a", 1).or_where_nested(|q| {
            q.where_term("b", 2).where_term("c", 3);
        });

        assert_eq!(state.predicates().len(), 2);
        match &state.predicates()[1] {
            Predicate::Nested { query, conjunction } => {
                assert_eq!(*conjunction, Conjunction::Or);
                assert_eq!(query.predicates().len(), 2);
            }
            other => panic!("unexpected predicate {:?}", other),
        }
    }
}
