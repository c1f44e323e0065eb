//! Decoded search results

use std::time::Duration;

use serde_json::{json, Map, Value};

use super::errors::{DecodeError, DecodeResult};
use crate::compiler::CompiledRequest;

/// A hit's source document with `_id` and `_score` injected
pub type Document = Map<String, Value>;

/// Typed view over one raw search response.
///
/// Built once from the engine's JSON and read-only afterwards.
#[derive(Debug, Clone)]
pub struct SearchResult {
    took: Duration,
    timed_out: bool,
    shards: Value,
    total_hits: u64,
    max_score: Option<f64>,
    hits: Vec<Document>,
    aggregations: Value,
    raw: Value,
    /// The request that produced this response
    request: CompiledRequest,
}

impl SearchResult {
    /// Decodes a raw response produced by `request`
    pub fn decode(raw: Value, request: CompiledRequest) -> DecodeResult<Self> {
        let hits_section = raw
            .get("hits")
            .ok_or_else(|| DecodeError::malformed("missing 'hits' section"))?;

        let max_score = hits_section.get("max_score").and_then(Value::as_f64);

        let hits = match hits_section.get("hits") {
            Some(Value::Array(items)) => items
                .iter()
                .map(merge_hit)
                .collect::<DecodeResult<Vec<_>>>()?,
            Some(_) => return Err(DecodeError::malformed("'hits.hits' is not an array")),
            None => Vec::new(),
        };

        // Engines skip the total when tracking is off; count what came back
        let total_hits = decode_total(hits_section)?.unwrap_or(hits.len() as u64);

        let took = raw
            .get("took")
            .and_then(Value::as_u64)
            .map(Duration::from_millis)
            .unwrap_or_default();

        let timed_out = raw
            .get("timed_out")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let shards = raw.get("_shards").cloned().unwrap_or(Value::Null);

        let aggregations = raw
            .get("aggregations")
            .cloned()
            .unwrap_or_else(|| json!({}));

        Ok(Self {
            took,
            timed_out,
            shards,
            total_hits,
            max_score,
            hits,
            aggregations,
            raw,
            request,
        })
    }

    /// Decodes a raw response with no request attached
    pub fn from_raw(raw: Value) -> DecodeResult<Self> {
        Self::decode(raw, CompiledRequest::new())
    }

    /// Server-side execution time
    pub fn took(&self) -> Duration {
        self.took
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Shard statistics, passed through untouched
    pub fn shards(&self) -> &Value {
        &self.shards
    }

    /// Total matching documents, whatever the engine's `hits.total` shape
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// `None` when the engine did not score (e.g. sorted queries)
    pub fn max_score(&self) -> Option<f64> {
        self.max_score
    }

    pub fn hits(&self) -> &[Document] {
        &self.hits
    }

    pub fn into_hits(self) -> Vec<Document> {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Aggregation results; an empty object when none were requested
    pub fn aggregations(&self) -> &Value {
        &self.aggregations
    }

    pub fn aggregation(&self, name: &str) -> Option<&Value> {
        self.aggregations.get(name)
    }

    /// The engine response as received
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn request(&self) -> &CompiledRequest {
        &self.request
    }

    /// Single-result read: the first hit
    pub fn first(&self) -> DecodeResult<&Document> {
        self.hits.first().ok_or(DecodeError::NoHits)
    }

    pub fn into_first(self) -> DecodeResult<Document> {
        self.hits.into_iter().next().ok_or(DecodeError::NoHits)
    }

    /// The first hit as a JSON value
    pub fn to_value(&self) -> DecodeResult<Value> {
        self.first().map(|doc| Value::Object(doc.clone()))
    }
}

/// `hits.total` is an integer on older engines and `{value, relation}` on
/// newer ones. `None` when the engine did not track it.
fn decode_total(hits_section: &Value) -> DecodeResult<Option<u64>> {
    match hits_section.get("total") {
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| DecodeError::malformed("'hits.total' is not a count")),
        Some(Value::Object(total)) => total
            .get("value")
            .and_then(Value::as_u64)
            .map(Some)
            .ok_or_else(|| DecodeError::malformed("'hits.total.value' is not a count")),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(DecodeError::malformed("'hits.total' has an unknown shape")),
    }
}

/// Source document plus `_id` and `_score`
fn merge_hit(hit: &Value) -> DecodeResult<Document> {
    let mut document = match hit.get("_source") {
        Some(Value::Object(source)) => source.clone(),
        Some(Value::Null) | None => Map::new(),
        Some(_) => return Err(DecodeError::malformed("hit '_source' is not an object")),
    };

    let id = hit
        .get("_id")
        .cloned()
        .ok_or_else(|| DecodeError::malformed("hit is missing '_id'"))?;
    let score = hit.get("_score").cloned().unwrap_or(Value::Null);

    document.insert("_id".to_string(), id);
    document.insert("_score".to_string(), score);

    Ok(document)
}
