//! Query state accumulated by a builder session
//!
//! A `QueryState` is the "current query under construction". It is owned by
//! exactly one builder and replaced with a fresh state after every terminal
//! operation; only the target index and document type carry over.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::ast::{Conjunction, LeafKind, Operator, Predicate, SortDirection};
use super::errors::{QueryError, QueryResult};

/// The closed set of attributes a query state carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Index,
    DocumentType,
    Limit,
    Offset,
    Columns,
    Wheres,
    Orders,
    Aggregations,
    Scroll,
}

impl Attribute {
    /// All attributes, in declaration order
    pub const ALL: [Attribute; 9] = [
        Attribute::Index,
        Attribute::DocumentType,
        Attribute::Limit,
        Attribute::Offset,
        Attribute::Columns,
        Attribute::Wheres,
        Attribute::Orders,
        Attribute::Aggregations,
        Attribute::Scroll,
    ];

    /// Returns the attribute name used at dynamic call sites
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Index => "index",
            Attribute::DocumentType => "type",
            Attribute::Limit => "limit",
            Attribute::Offset => "offset",
            Attribute::Columns => "columns",
            Attribute::Wheres => "wheres",
            Attribute::Orders => "orders",
            Attribute::Aggregations => "aggs",
            Attribute::Scroll => "scroll",
        }
    }

    /// Resolves an attribute by name; unknown names are rejected
    pub fn from_name(name: &str) -> QueryResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|attr| attr.name() == name)
            .ok_or_else(|| QueryError::invalid_argument(name))
    }
}

impl FromStr for Attribute {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Mutable query state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    index: Option<String>,
    document_type: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    columns: Vec<String>,
    predicates: Vec<Predicate>,
    /// Field to sort spec, in declaration order
    sorts: Vec<(String, Value)>,
    /// Aggregation name to spec, in declaration order
    aggregations: Vec<(String, Value)>,
    scroll: Option<String>,
}

impl QueryState {
    /// Creates an empty query state
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty query state targeting `index`
    pub fn for_index(index: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.set_index(index);
        state
    }

    // Setters

    pub fn set_index(&mut self, index: impl Into<String>) {
        self.index = Some(index.into());
    }

    pub fn set_document_type(&mut self, document_type: impl Into<String>) {
        self.document_type = Some(document_type.into());
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    pub fn set_scroll(&mut self, token: impl Into<String>) {
        self.scroll = Some(token.into());
    }

    /// Adds a projected column; duplicates are ignored
    pub fn add_column(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
    }

    pub fn add_columns<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            self.add_column(column);
        }
    }

    /// Declares a sort on `field`. Re-declaring a field replaces its spec in place.
    pub fn add_sort(&mut self, field: impl Into<String>, spec: Value) {
        upsert(&mut self.sorts, field.into(), spec);
    }

    /// Declares an aggregation under `name`. Re-declaring a name replaces it in place.
    pub fn add_aggregation(&mut self, name: impl Into<String>, spec: Value) {
        upsert(&mut self.aggregations, name.into(), spec);
    }

    pub fn add_predicate(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    // Accessors

    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    pub fn document_type(&self) -> Option<&str> {
        self.document_type.as_deref()
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn scroll(&self) -> Option<&str> {
        self.scroll.as_deref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn sorts(&self) -> &[(String, Value)] {
        &self.sorts
    }

    pub fn aggregations(&self) -> &[(String, Value)] {
        &self.aggregations
    }

    /// Returns true if the attribute carries a non-empty value
    pub fn is_set(&self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::Index => self.index.as_deref().is_some_and(|s| !s.is_empty()),
            Attribute::DocumentType => self
                .document_type
                .as_deref()
                .is_some_and(|s| !s.is_empty()),
            Attribute::Limit => self.limit.is_some_and(|n| n > 0),
            Attribute::Offset => self.offset.is_some_and(|n| n > 0),
            Attribute::Columns => !self.columns.is_empty(),
            Attribute::Wheres => !self.predicates.is_empty(),
            Attribute::Orders => !self.sorts.is_empty(),
            Attribute::Aggregations => !self.aggregations.is_empty(),
            Attribute::Scroll => self.scroll.as_deref().is_some_and(|s| !s.is_empty()),
        }
    }

    /// Sets an attribute from a JSON value, for dynamic call sites such as
    /// query description files. Values of the wrong shape are rejected.
    pub fn set(&mut self, attribute: Attribute, value: &Value) -> QueryResult<()> {
        match attribute {
            Attribute::Index => self.set_index(expect_str(attribute, value)?),
            Attribute::DocumentType => self.set_document_type(expect_str(attribute, value)?),
            Attribute::Scroll => self.set_scroll(expect_str(attribute, value)?),
            Attribute::Limit => self.set_limit(expect_u64(attribute, value)?),
            Attribute::Offset => self.set_offset(expect_u64(attribute, value)?),
            Attribute::Columns => match value {
                Value::String(column) => self.add_column(column.as_str()),
                Value::Array(items) => {
                    for item in items {
                        self.add_column(expect_str(attribute, item)?);
                    }
                }
                _ => return Err(wrong_shape(attribute)),
            },
            Attribute::Orders => {
                let entries = match value {
                    Value::Array(items) => items.iter().collect::<Vec<_>>(),
                    Value::Object(_) => vec![value],
                    _ => return Err(wrong_shape(attribute)),
                };
                for entry in entries {
                    let map = entry.as_object().ok_or_else(|| wrong_shape(attribute))?;
                    for (field, spec) in map {
                        let spec = match spec {
                            Value::String(dir) => dir.parse::<SortDirection>()?.to_spec(),
                            other => other.clone(),
                        };
                        self.add_sort(field.as_str(), spec);
                    }
                }
            }
            Attribute::Aggregations => {
                let map = value.as_object().ok_or_else(|| wrong_shape(attribute))?;
                for (name, spec) in map {
                    self.add_aggregation(name.as_str(), spec.clone());
                }
            }
            Attribute::Wheres => {
                let items = value.as_array().ok_or_else(|| wrong_shape(attribute))?;
                for item in items {
                    let predicate = predicate_from_value(item)?;
                    self.add_predicate(predicate);
                }
            }
        }
        Ok(())
    }

    /// Returns an immutable copy for compilation
    pub fn snapshot(&self) -> QueryState {
        self.clone()
    }

    /// Returns a fresh state carrying only the index and document type forward
    pub fn reset(&self) -> QueryState {
        QueryState {
            index: self.index.clone(),
            document_type: self.document_type.clone(),
            ..QueryState::default()
        }
    }
}

fn upsert(entries: &mut Vec<(String, Value)>, key: String, value: Value) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

fn wrong_shape(attribute: Attribute) -> QueryError {
    QueryError::invalid_argument(format!("{} has an unsupported value", attribute))
}

fn expect_str(attribute: Attribute, value: &Value) -> QueryResult<&str> {
    value.as_str().ok_or_else(|| wrong_shape(attribute))
}

fn expect_u64(attribute: Attribute, value: &Value) -> QueryResult<u64> {
    value.as_u64().ok_or_else(|| wrong_shape(attribute))
}

/// Parses one predicate description:
///
/// ```json
/// {"column": "age", "operator": ">=", "value": 18, "leaf": "term", "boolean": "and"}
/// {"nested": [ ...predicate descriptions... ], "boolean": "or"}
/// ```
fn predicate_from_value(value: &Value) -> QueryResult<Predicate> {
    let map = value
        .as_object()
        .ok_or_else(|| wrong_shape(Attribute::Wheres))?;

    let conjunction = match map.get("boolean") {
        Some(Value::String(s)) => s.parse::<Conjunction>()?,
        Some(_) => return Err(wrong_shape(Attribute::Wheres)),
        None => Conjunction::And,
    };

    if let Some(nested) = map.get("nested") {
        let mut inner = QueryState::new();
        inner.set(Attribute::Wheres, nested)?;
        return Ok(Predicate::nested(inner, conjunction));
    }

    let column = map
        .get("column")
        .and_then(Value::as_str)
        .ok_or_else(|| QueryError::invalid_argument("predicate is missing a column"))?;

    let leaf = match map.get("leaf") {
        Some(Value::String(s)) => s.parse::<LeafKind>()?,
        Some(_) => return Err(wrong_shape(Attribute::Wheres)),
        None => LeafKind::Term,
    };

    let operator = match map.get("operator") {
        Some(Value::String(symbol)) => Some(Operator::from_symbol(symbol)?),
        Some(Value::Null) => None,
        Some(_) => return Err(wrong_shape(Attribute::Wheres)),
        None if leaf == LeafKind::Term => Some(Operator::Eq),
        None => None,
    };

    let value = map.get("value").cloned().unwrap_or(Value::Null);

    Predicate::from_where(column, operator, value, leaf, conjunction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_names() {
        for attr in Attribute::ALL {
            assert_eq!(Attribute::from_name(attr.name()).unwrap(), attr);
        }
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let err = Attribute::from_name("colums").unwrap_err();
        assert_eq!(err, QueryError::InvalidArgument("colums".into()));
    }

    #[test]
    fn test_columns_deduplicated_in_order() {
        let mut state = QueryState::new();
        state.add_columns(["name", "age", "name"]);
        state.add_column("email");
        assert_eq!(state.columns(), &["name", "age", "email"]);
    }

    #[test]
    fn test_sort_redeclaration_keeps_position() {
        let mut state = QueryState::new();
        state.add_sort("created_at", json!({"order": "desc"}));
        state.add_sort("name", json!({"order": "asc"}));
        state.add_sort("created_at", json!({"order": "asc"}));

        let fields: Vec<&str> = state.sorts().iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(fields, vec!["created_at", "name"]);
        assert_eq!(state.sorts()[0].1, json!({"order": "asc"}));
    }

    #[test]
    fn test_is_set_treats_empty_as_absent() {
        let mut state = QueryState::new();
        assert!(!state.is_set(Attribute::Index));

        state.set_index("");
        assert!(!state.is_set(Attribute::Index));

        state.set_index("users");
        assert!(state.is_set(Attribute::Index));

        state.set_offset(0);
        assert!(!state.is_set(Attribute::Offset));
    }

    #[test]
    fn test_reset_carries_index_and_type_only() {
        let mut state = QueryState::for_index("users");
        state.set_document_type("_doc");
        state.set_limit(10);
        state.set_offset(20);
        state.set_scroll("1m");
        state.add_column("name");
        state.add_sort("name", json!("asc"));
        state.add_aggregation("by_status", json!({"terms": {"field": "status"}}));
        state.add_predicate(Predicate::basic(
            "status",
            LeafKind::Term,
            Some(Operator::Eq),
            json!("active"),
            Conjunction::And,
        ));

        let fresh = state.reset();
        assert_eq!(fresh.index(), Some("users"));
        assert_eq!(fresh.document_type(), Some("_doc"));
        assert_eq!(fresh.limit(), None);
        assert_eq!(fresh.offset(), None);
        assert_eq!(fresh.scroll(), None);
        assert!(fresh.columns().is_empty());
        assert!(fresh.predicates().is_empty());
        assert!(fresh.sorts().is_empty());
        assert!(fresh.aggregations().is_empty());
    }

    #[test]
    fn test_set_from_description() {
        let mut state = QueryState::new();
        state.set(Attribute::Index, &json!("users")).unwrap();
        state.set(Attribute::Limit, &json!(5)).unwrap();
        state.set(Attribute::Columns, &json!(["name", "age"])).unwrap();
        state
            .set(Attribute::Orders, &json!([{"age": "desc"}, {"name": "asc"}]))
            .unwrap();
        state
            .set(
                Attribute::Wheres,
                &json!([
                    {"column": "status", "value": "active"},
                    {"column": "age", "operator": ">=", "value": 18, "boolean": "or"},
                    {"nested": [{"column": "role", "value": "admin"}]}
                ]),
            )
            .unwrap();

        assert_eq!(state.index(), Some("users"));
        assert_eq!(state.limit(), Some(5));
        assert_eq!(state.columns(), &["name", "age"]);
        assert_eq!(state.sorts()[0], ("age".to_string(), json!({"order": "desc"})));
        assert_eq!(state.predicates().len(), 3);
        assert!(state.predicates()[1].is_or());
        assert!(state.predicates()[2].is_nested());
    }

    #[test]
    fn test_set_rejects_wrong_shape() {
        let mut state = QueryState::new();
        assert!(state.set(Attribute::Limit, &json!("ten")).is_err());
        assert!(state.set(Attribute::Index, &json!(3)).is_err());
        assert!(state.set(Attribute::Wheres, &json!({"column": "a"})).is_err());
        assert!(state
            .set(Attribute::Wheres, &json!([{"column": "a", "operator": "=~", "value": 1}]))
            .is_err());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut state = QueryState::for_index("users");
        let snapshot = state.snapshot();
        state.set_limit(3);
        assert_eq!(snapshot.limit(), None);
        assert_eq!(state.limit(), Some(3));
    }
}
