//! Request resolver
//!
//! Drives a fixed table of aspects over a query state snapshot and shapes
//! the result per operation.
//!
//! Aspect table (strict order):
//! 1. columns      -> `_source`
//! 2. wheres       -> `query`
//! 3. aggregations -> `aggs`
//! 4. orders       -> `sort`
//! 5. limit        -> `size`
//! 6. offset       -> `from`
//! 7. index        -> `index`
//! 8. type         -> `type`
//! 9. scroll       -> `scroll`
//!
//! Absent aspects are omitted. Every operation requires an index.

use serde_json::{json, Map, Value};

use super::errors::{CompileError, CompileResult};
use super::grouper::{group_predicates, Combinator};
use super::leaf::{compile_leaf, single};
use super::request::CompiledRequest;
use crate::observability::{log_event, Event, Logger};
use crate::query::{Attribute, Predicate, QueryState};

type AspectCompiler = fn(&QueryState) -> CompileResult<Value>;

/// One row of the aspect table
struct Aspect {
    attribute: Attribute,
    wire_key: &'static str,
    compile: AspectCompiler,
}

const ASPECTS: [Aspect; 9] = [
    Aspect { attribute: Attribute::Columns, wire_key: "_source", compile: compile_columns },
    Aspect { attribute: Attribute::Wheres, wire_key: "query", compile: compile_wheres },
    Aspect { attribute: Attribute::Aggregations, wire_key: "aggs", compile: compile_aggregations },
    Aspect { attribute: Attribute::Orders, wire_key: "sort", compile: compile_orders },
    Aspect { attribute: Attribute::Limit, wire_key: "size", compile: compile_limit },
    Aspect { attribute: Attribute::Offset, wire_key: "from", compile: compile_offset },
    Aspect { attribute: Attribute::Index, wire_key: "index", compile: compile_index },
    Aspect { attribute: Attribute::DocumentType, wire_key: "type", compile: compile_document_type },
    Aspect { attribute: Attribute::Scroll, wire_key: "scroll", compile: compile_scroll },
];

/// Keys hoisted out of the body for searches and kept on write operations
const TARGET_KEYS: [&str; 2] = ["index", "type"];

/// Compiles query state into wire-shaped requests.
///
/// Resolution is pure: the same snapshot always yields the same request.
pub struct Resolver;

impl Resolver {
    /// Resolves every present aspect into a flat request.
    ///
    /// Fails with [`CompileError::MissingIndex`] when no index is set.
    pub fn resolve(state: &QueryState) -> CompileResult<CompiledRequest> {
        let mut request = CompiledRequest::new();

        for aspect in ASPECTS.iter() {
            if !state.is_set(aspect.attribute) {
                continue;
            }
            request.insert(aspect.wire_key, (aspect.compile)(state)?);
        }

        if !request.contains_key("index") {
            return Err(CompileError::MissingIndex);
        }

        Ok(request)
    }

    /// Search request: `index`/`type` at the top, everything else under `body`
    pub fn resolve_search(state: &QueryState) -> CompileResult<CompiledRequest> {
        let mut resolved = Self::resolve(state)?;
        let mut request = CompiledRequest::new();

        for key in TARGET_KEYS {
            if let Some(value) = resolved.remove(key) {
                request.insert(key, value);
            }
        }
        request.insert("body", resolved.into_value());

        Self::trace("search", &request);
        Ok(request)
    }

    /// Create request: `{id, body: document}` plus the target.
    ///
    /// Without an id the engine assigns one.
    pub fn resolve_create(
        state: &QueryState,
        id: Option<&str>,
        document: Value,
    ) -> CompileResult<CompiledRequest> {
        let mut request = Self::resolve_target(state)?;
        if let Some(id) = id {
            request.insert("id", json!(id));
        }
        request.insert("body", document);

        Self::trace("create", &request);
        Ok(request)
    }

    /// Update request: `{id, body: {doc: partial}}` plus the target
    pub fn resolve_update(
        state: &QueryState,
        id: &str,
        partial: Value,
    ) -> CompileResult<CompiledRequest> {
        let mut request = Self::resolve_target(state)?;
        request.insert("id", json!(id));
        request.insert("body", json!({ "doc": partial }));

        Self::trace("update", &request);
        Ok(request)
    }

    /// Delete request: `{id}` plus the target
    pub fn resolve_delete(state: &QueryState, id: &str) -> CompileResult<CompiledRequest> {
        let mut request = Self::resolve_target(state)?;
        request.insert("id", json!(id));

        Self::trace("delete", &request);
        Ok(request)
    }

    /// Delete-all request: matches every document under the target.
    ///
    /// Predicates set on the state are ignored.
    pub fn resolve_flush(state: &QueryState) -> CompileResult<CompiledRequest> {
        let mut request = Self::resolve_target(state)?;
        request.insert("body", json!({ "query": { "match_all": {} } }));

        Self::trace("flush", &request);
        Ok(request)
    }

    /// Compiles the predicate list of `state` into a boolean query tree.
    ///
    /// A state without predicates matches everything.
    pub fn resolve_query(state: &QueryState) -> CompileResult<Value> {
        if state.predicates().is_empty() {
            return Ok(json!({ "match_all": {} }));
        }
        compile_bool(state.predicates())
    }

    /// Full resolution pass, keeping only the target keys
    fn resolve_target(state: &QueryState) -> CompileResult<CompiledRequest> {
        let resolved = Self::resolve(state)?;
        let mut request = CompiledRequest::new();
        for key in TARGET_KEYS {
            if let Some(value) = resolved.get(key) {
                request.insert(key, value.clone());
            }
        }
        Ok(request)
    }

    fn trace(operation: &str, request: &CompiledRequest) {
        if !Logger::enabled(Event::RequestCompiled.severity()) {
            return;
        }
        let json = request.to_json();
        log_event(
            Event::RequestCompiled,
            &[
                ("index", request.index().unwrap_or("")),
                ("operation", operation),
                ("request", json.as_str()),
            ],
        );
    }
}

/// Assembles `{bool: {...}}` from an ordered predicate list.
///
/// Per group, non-negated and nested predicates form a must-list and
/// negated predicates a must-not-list. With one group the must-not-list
/// becomes the outer `must_not`; with several groups each negated clause is
/// wrapped as `{bool: {must_not: clause}}` inside `should`.
fn compile_bool(predicates: &[Predicate]) -> CompileResult<Value> {
    let groups = group_predicates(predicates);
    let combinator = Combinator::for_groups(groups.len());

    let mut combined: Vec<Value> = Vec::new();
    let mut must_not: Vec<Value> = Vec::new();

    for group in &groups {
        let mut must = Vec::new();
        let mut negated = Vec::new();

        for predicate in group.iter() {
            match predicate {
                Predicate::Nested { query, .. } => must.push(Resolver::resolve_query(query)?),
                Predicate::Basic {
                    column,
                    leaf,
                    operator,
                    value,
                    ..
                } => {
                    let clause = compile_leaf(*leaf, column, value, *operator)?;
                    if predicate.is_negated() {
                        negated.push(clause);
                    } else {
                        must.push(clause);
                    }
                }
            }
        }

        match must.len() {
            0 => {}
            1 => combined.extend(must),
            _ => combined.push(json!({ "bool": { "must": must } })),
        }

        match combinator {
            Combinator::Must => must_not.extend(negated),
            Combinator::Should => combined.extend(
                negated
                    .into_iter()
                    .map(|clause| json!({ "bool": { "must_not": clause } })),
            ),
        }
    }

    let mut tree = Map::new();
    if !combined.is_empty() {
        tree.insert(combinator.as_str().to_string(), Value::Array(combined));
    }
    if !must_not.is_empty() {
        tree.insert("must_not".to_string(), Value::Array(must_not));
    }

    Ok(single("bool", Value::Object(tree)))
}

fn compile_columns(state: &QueryState) -> CompileResult<Value> {
    Ok(json!(state.columns()))
}

fn compile_wheres(state: &QueryState) -> CompileResult<Value> {
    compile_bool(state.predicates())
}

fn compile_aggregations(state: &QueryState) -> CompileResult<Value> {
    let aggs: Map<String, Value> = state
        .aggregations()
        .iter()
        .map(|(name, spec)| (name.clone(), spec.clone()))
        .collect();
    Ok(Value::Object(aggs))
}

/// Sorts compile to an array so declaration order survives on the wire
fn compile_orders(state: &QueryState) -> CompileResult<Value> {
    let sorts: Vec<Value> = state
        .sorts()
        .iter()
        .map(|(field, spec)| single(field, spec.clone()))
        .collect();
    Ok(Value::Array(sorts))
}

fn compile_limit(state: &QueryState) -> CompileResult<Value> {
    Ok(json!(state.limit()))
}

fn compile_offset(state: &QueryState) -> CompileResult<Value> {
    Ok(json!(state.offset()))
}

fn compile_index(state: &QueryState) -> CompileResult<Value> {
    Ok(json!(state.index()))
}

fn compile_document_type(state: &QueryState) -> CompileResult<Value> {
    Ok(json!(state.document_type()))
}

fn compile_scroll(state: &QueryState) -> CompileResult<Value> {
    Ok(json!(state.scroll()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Conjunction, LeafKind, Operator, SortDirection};

    fn term(column: &str, value: Value, conjunction: Conjunction) -> Predicate {
        Predicate::basic(column, LeafKind::Term, Some(Operator::Eq), value, conjunction)
    }

    fn not_term(column: &str, value: Value, conjunction: Conjunction) -> Predicate {
        Predicate::basic(column, LeafKind::Term, Some(Operator::Ne), value, conjunction)
    }

    fn state_with(predicates: Vec<Predicate>) -> QueryState {
        let mut state = QueryState::for_index("users");
        for p in predicates {
            state.add_predicate(p);
        }
        state
    }

    #[test]
    fn test_single_group_negation_is_flat() {
        let state = state_with(vec![
            not_term("status", json!("banned"), Conjunction::And),
            term("role", json!("admin"), Conjunction::And),
        ]);

        let query = Resolver::resolve_query(&state).unwrap();
        assert_eq!(
            query,
            json!({
                "bool": {
                    "must": [{"term": {"role": "admin"}}],
                    "must_not": [{"term": {"status": "banned"}}]
                }
            })
        );
    }

    #[test]
    fn test_multi_group_negation_is_wrapped_in_should() {
        let state = state_with(vec![
            term("role", json!("admin"), Conjunction::And),
            term("role", json!("editor"), Conjunction::Or),
            not_term("status", json!("banned"), Conjunction::And),
        ]);

        let query = Resolver::resolve_query(&state).unwrap();
        assert_eq!(
            query,
            json!({
                "bool": {
                    "should": [
                        {"term": {"role": "admin"}},
                        {"term": {"role": "editor"}},
                        {"bool": {"must_not": {"term": {"status": "banned"}}}}
                    ]
                }
            })
        );
        assert!(query["bool"].get("must_not").is_none());
    }

    #[test]
    fn test_leading_or_compiles_as_single_group() {
        let state = state_with(vec![
            term("a", json!(1), Conjunction::Or),
            not_term("b", json!(2), Conjunction::And),
        ]);

        let query = Resolver::resolve_query(&state).unwrap();
        assert_eq!(
            query,
            json!({
                "bool": {
                    "must": [{"term": {"a": 1}}],
                    "must_not": [{"term": {"b": 2}}]
                }
            })
        );
        assert!(query["bool"].get("should").is_none());
    }

    #[test]
    fn test_group_with_several_clauses_is_bool_must() {
        let state = state_with(vec![
            term("a", json!(1), Conjunction::And),
            term("b", json!(2), Conjunction::Or),
            term("c", json!(3), Conjunction::And),
        ]);

        let query = Resolver::resolve_query(&state).unwrap();
        assert_eq!(
            query,
            json!({
                "bool": {
                    "should": [
                        {"term": {"a": 1}},
                        {"bool": {"must": [{"term": {"b": 2}}, {"term": {"c": 3}}]}}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_nested_predicate_recurses() {
        let mut inner = QueryState::new();
        inner.add_predicate(term("x", json!(1), Conjunction::And));
        inner.add_predicate(term("y", json!(2), Conjunction::Or));

        let state = state_with(vec![
            term("a", json!(1), Conjunction::And),
            Predicate::nested(inner, Conjunction::And),
        ]);

        let query = Resolver::resolve_query(&state).unwrap();
        assert_eq!(
            query,
            json!({
                "bool": {
                    "must": [{
                        "bool": {
                            "must": [
                                {"term": {"a": 1}},
                                {"bool": {"should": [{"term": {"x": 1}}, {"term": {"y": 2}}]}}
                            ]
                        }
                    }]
                }
            })
        );
    }

    #[test]
    fn test_empty_nested_matches_all() {
        let state = state_with(vec![Predicate::nested(QueryState::new(), Conjunction::And)]);
        let query = Resolver::resolve_query(&state).unwrap();
        assert_eq!(query, json!({"bool": {"must": [{"match_all": {}}]}}));
    }

    #[test]
    fn test_missing_index_rejected() {
        let mut state = QueryState::new();
        state.add_predicate(term("a", json!(1), Conjunction::And));

        assert_eq!(Resolver::resolve(&state).unwrap_err(), CompileError::MissingIndex);
        assert_eq!(Resolver::resolve_search(&state).unwrap_err(), CompileError::MissingIndex);
        assert_eq!(Resolver::resolve_flush(&state).unwrap_err(), CompileError::MissingIndex);
        assert_eq!(
            Resolver::resolve_delete(&state, "1").unwrap_err(),
            CompileError::MissingIndex
        );
    }

    #[test]
    fn test_sparse_resolution() {
        let state = QueryState::for_index("users");
        let request = Resolver::resolve(&state).unwrap();
        assert_eq!(request.into_value(), json!({"index": "users"}));
    }

    #[test]
    fn test_full_aspect_table() {
        let mut state = QueryState::for_index("users");
        state.set_document_type("_doc");
        state.add_columns(["name", "age"]);
        state.add_predicate(term("status", json!("active"), Conjunction::And));
        state.add_aggregation("by_status", json!({"terms": {"field": "status"}}));
        state.add_sort("age", SortDirection::Desc.to_spec());
        state.add_sort("name", SortDirection::Asc.to_spec());
        state.set_limit(10);
        state.set_offset(20);
        state.set_scroll("1m");

        let request = Resolver::resolve(&state).unwrap();
        assert_eq!(
            request.into_value(),
            json!({
                "_source": ["name", "age"],
                "query": {"bool": {"must": [{"term": {"status": "active"}}]}},
                "aggs": {"by_status": {"terms": {"field": "status"}}},
                "sort": [{"age": {"order": "desc"}}, {"name": {"order": "asc"}}],
                "size": 10,
                "from": 20,
                "index": "users",
                "type": "_doc",
                "scroll": "1m"
            })
        );
    }

    #[test]
    fn test_search_hoists_target() {
        let mut state = QueryState::for_index("users");
        state.set_document_type("_doc");
        state.set_limit(1);

        let request = Resolver::resolve_search(&state).unwrap();
        assert_eq!(
            request.into_value(),
            json!({"index": "users", "type": "_doc", "body": {"size": 1}})
        );
    }

    #[test]
    fn test_write_operations_shape() {
        let mut state = QueryState::for_index("users");
        state.set_limit(5);

        let create = Resolver::resolve_create(&state, Some("7"), json!({"id": 7})).unwrap();
        assert_eq!(
            create.into_value(),
            json!({"index": "users", "id": "7", "body": {"id": 7}})
        );

        let update = Resolver::resolve_update(&state, "7", json!({"name": "Bob"})).unwrap();
        assert_eq!(
            update.into_value(),
            json!({"index": "users", "id": "7", "body": {"doc": {"name": "Bob"}}})
        );

        let delete = Resolver::resolve_delete(&state, "7").unwrap();
        assert_eq!(delete.into_value(), json!({"index": "users", "id": "7"}));
    }

    #[test]
    fn test_create_without_id() {
        let state = QueryState::for_index("users");
        let create = Resolver::resolve_create(&state, None, json!({"k": "v"})).unwrap();
        assert!(create.id().is_none());
    }

    #[test]
    fn test_flush_ignores_predicates() {
        let state = state_with(vec![term("a", json!(1), Conjunction::And)]);
        let request = Resolver::resolve_flush(&state).unwrap();
        assert_eq!(
            request.into_value(),
            json!({"index": "users", "body": {"query": {"match_all": {}}}})
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let state = state_with(vec![
            term("a", json!(1), Conjunction::And),
            not_term("b", json!(2), Conjunction::Or),
            term("c@d", json!(3), Conjunction::And),
        ]);
        let snapshot = state.snapshot();

        let first = Resolver::resolve_search(&snapshot).unwrap();
        let second = Resolver::resolve_search(&snapshot).unwrap();
        assert_eq!(first.to_json(), second.to_json());
    }

    #[test]
    fn test_invalid_leaf_surfaces() {
        let state = state_with(vec![Predicate::basic(
            "age",
            LeafKind::Range,
            Some(Operator::Eq),
            json!(3),
            Conjunction::And,
        )]);
        assert!(matches!(
            Resolver::resolve(&state),
            Err(CompileError::InvalidPredicate { .. })
        ));
    }
}
