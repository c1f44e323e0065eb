//! Listing view over a search result
//!
//! Page position is derived from the `from`/`size` of the request that
//! produced the result.

use std::time::Duration;

use serde_json::{json, Value};

use super::result::{Document, SearchResult};

/// All hits of one page plus totals, shard stats, timing and aggregations
#[derive(Debug, Clone)]
pub struct Paginator {
    result: SearchResult,
    offset: u64,
    per_page: Option<u64>,
}

impl Paginator {
    pub fn new(result: SearchResult) -> Self {
        let body = result.request().body();
        let offset = body
            .and_then(|b| b.get("from"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let per_page = body
            .and_then(|b| b.get("size"))
            .and_then(Value::as_u64)
            .filter(|n| *n > 0);

        Self {
            result,
            offset,
            per_page,
        }
    }

    pub fn hits(&self) -> &[Document] {
        self.result.hits()
    }

    pub fn total_hits(&self) -> u64 {
        self.result.total_hits()
    }

    pub fn took(&self) -> Duration {
        self.result.took()
    }

    pub fn timed_out(&self) -> bool {
        self.result.timed_out()
    }

    pub fn shards(&self) -> &Value {
        self.result.shards()
    }

    pub fn aggregations(&self) -> &Value {
        self.result.aggregations()
    }

    pub fn per_page(&self) -> Option<u64> {
        self.per_page
    }

    /// 1-based page number; an unbounded listing is a single page
    pub fn current_page(&self) -> u64 {
        match self.per_page {
            Some(n) => (self.offset / n).saturating_add(1),
            None => 1,
        }
    }

    /// 1-based number of the last page, never below 1
    pub fn last_page(&self) -> u64 {
        match self.per_page {
            Some(n) => self.total_hits().div_ceil(n).max(1),
            None => 1,
        }
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page() < self.last_page()
    }

    pub fn result(&self) -> &SearchResult {
        &self.result
    }

    pub fn into_result(self) -> SearchResult {
        self.result
    }

    /// `{took, timed_out, shards, hits, total_hits}`
    pub fn to_value(&self) -> Value {
        json!({
            "took": self.took().as_millis() as u64,
            "timed_out": self.timed_out(),
            "shards": self.shards(),
            "hits": self.hits(),
            "total_hits": self.total_hits(),
        })
    }
}

impl IntoIterator for Paginator {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.result.into_hits().into_iter()
    }
}
