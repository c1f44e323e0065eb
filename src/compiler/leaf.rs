//! Leaf clause compilation
//!
//! Turns one basic predicate into one wire-shaped clause.

use serde_json::{json, Map, Value};

use super::errors::{CompileError, CompileResult};
use crate::query::{LeafKind, Operator};

/// Separates a nested object's name from its inner field: `orders@status`
pub const NESTED_PATH_MARKER: char = '@';

/// Separates the fields of a multi-field column: `title,body`
pub const MULTI_FIELD_SEPARATOR: char = ',';

/// Compiles a single leaf clause.
///
/// A column carrying the nested path marker is compiled against its dotted
/// path and wrapped in a nested envelope scoped to the parent. Deeper
/// markers recurse, producing one envelope per level.
pub fn compile_leaf(
    leaf: LeafKind,
    column: &str,
    value: &Value,
    operator: Option<Operator>,
) -> CompileResult<Value> {
    if let Some((parent, inner)) = column.split_once(NESTED_PATH_MARKER) {
        let path = format!("{}.{}", parent, inner);
        let query = compile_leaf(leaf, &path, value, operator)?;
        return Ok(json!({
            "nested": {
                "path": parent,
                "query": query,
            }
        }));
    }

    match leaf {
        LeafKind::Term | LeafKind::Terms | LeafKind::Match | LeafKind::MatchPhrase => Ok(
            single(leaf.as_str(), single(column, value.clone())),
        ),
        LeafKind::Range => compile_range(column, value, operator),
        LeafKind::MultiMatch => {
            let fields: Vec<&str> = column
                .split(MULTI_FIELD_SEPARATOR)
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .collect();
            Ok(json!({
                "multi_match": {
                    "query": value,
                    "fields": fields,
                    "type": "phrase",
                }
            }))
        }
        LeafKind::Wildcard => {
            let needle = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => {
                    return Err(CompileError::invalid_predicate(
                        column,
                        "wildcard needs a string or number",
                    ))
                }
            };
            Ok(single(
                "wildcard",
                single(column, Value::String(format!("*{}*", needle))),
            ))
        }
        LeafKind::Exists => Ok(json!({ "exists": { "field": column } })),
    }
}

/// Bounds objects pass through untouched; a scalar is wrapped under its
/// bound operator.
fn compile_range(column: &str, value: &Value, operator: Option<Operator>) -> CompileResult<Value> {
    let bound = operator.filter(Operator::is_comparison);

    let body = match (value, bound) {
        (Value::Object(bounds), Some(_)) if bounds.len() >= 2 => value.clone(),
        (Value::Object(_), None) => value.clone(),
        (_, Some(op)) => single(op.as_str(), value.clone()),
        (_, None) => {
            return Err(CompileError::invalid_predicate(
                column,
                "range needs a bound operator or a bounds object",
            ))
        }
    };

    Ok(single("range", single(column, body)))
}

/// A one-key object
pub(crate) fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_clause() {
        let clause = compile_leaf(LeafKind::Term, "status", &json!("active"), Some(Operator::Eq)).unwrap();
        assert_eq!(clause, json!({"term": {"status": "active"}}));
    }

    #[test]
    fn test_terms_match_and_phrase_share_shape() {
        assert_eq!(
            compile_leaf(LeafKind::Terms, "tag", &json!(["a", "b"]), None).unwrap(),
            json!({"terms": {"tag": ["a", "b"]}})
        );
        assert_eq!(
            compile_leaf(LeafKind::Match, "title", &json!("rust"), None).unwrap(),
            json!({"match": {"title": "rust"}})
        );
        assert_eq!(
            compile_leaf(LeafKind::MatchPhrase, "title", &json!("hello world"), None).unwrap(),
            json!({"match_phrase": {"title": "hello world"}})
        );
    }

    #[test]
    fn test_range_scalar_wrapped_with_operator() {
        let clause = compile_leaf(LeafKind::Range, "age", &json!(18), Some(Operator::Gte)).unwrap();
        assert_eq!(clause, json!({"range": {"age": {"gte": 18}}}));
    }

    #[test]
    fn test_range_bounds_pass_through() {
        let bounds = json!({"gte": 18, "lte": 30});
        let clause = compile_leaf(LeafKind::Range, "age", &bounds, None).unwrap();
        assert_eq!(clause, json!({"range": {"age": {"gte": 18, "lte": 30}}}));

        // Negated between keeps its bounds
        let clause = compile_leaf(LeafKind::Range, "age", &bounds, Some(Operator::Ne)).unwrap();
        assert_eq!(clause, json!({"range": {"age": {"gte": 18, "lte": 30}}}));
    }

    #[test]
    fn test_range_without_bound_rejected() {
        let err = compile_leaf(LeafKind::Range, "age", &json!(18), Some(Operator::Eq)).unwrap_err();
        assert_eq!(err.code(), "ELASTIC_INVALID_PREDICATE");
    }

    #[test]
    fn test_multi_match_clause() {
        let clause = compile_leaf(LeafKind::MultiMatch, "title", &json!("rust"), None).unwrap();
        assert_eq!(
            clause,
            json!({"multi_match": {"query": "rust", "fields": ["title"], "type": "phrase"}})
        );

        let clause = compile_leaf(LeafKind::MultiMatch, "title, body", &json!("rust"), None).unwrap();
        assert_eq!(clause["multi_match"]["fields"], json!(["title", "body"]));
    }

    #[test]
    fn test_wildcard_substring() {
        let clause = compile_leaf(LeafKind::Wildcard, "name", &json!("ali"), None).unwrap();
        assert_eq!(clause, json!({"wildcard": {"name": "*ali*"}}));

        assert!(compile_leaf(LeafKind::Wildcard, "name", &json!(null), None).is_err());
    }

    #[test]
    fn test_exists_clause() {
        let clause = compile_leaf(LeafKind::Exists, "email", &Value::Null, None).unwrap();
        assert_eq!(clause, json!({"exists": {"field": "email"}}));
    }

    #[test]
    fn test_nested_path_expansion() {
        let clause = compile_leaf(LeafKind::Term, "orders@status", &json!("paid"), Some(Operator::Eq)).unwrap();
        assert_eq!(
            clause,
            json!({
                "nested": {
                    "path": "orders",
                    "query": {"term": {"orders.status": "paid"}}
                }
            })
        );
    }

    #[test]
    fn test_multi_level_nested_path() {
        let clause = compile_leaf(LeafKind::Exists, "a@b@c", &Value::Null, None).unwrap();
        assert_eq!(
            clause,
            json!({
                "nested": {
                    "path": "a",
                    "query": {
                        "nested": {
                            "path": "a.b",
                            "query": {"exists": {"field": "a.b.c"}}
                        }
                    }
                }
            })
        );
    }
}
