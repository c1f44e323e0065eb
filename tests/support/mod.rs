//! Shared test transport
//!
//! - Records every request with the operation it was sent to
//! - Answers from a scripted queue, in order
//! - An exhausted queue answers with a transport failure

#![allow(dead_code)]

use std::collections::VecDeque;

use elasticql::{CompiledRequest, Transport, TransportError, TransportOperation, TransportResult};
use serde_json::{json, Value};

#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub calls: Vec<(TransportOperation, CompiledRequest)>,
    answers: VecDeque<TransportResult<Value>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one answer
    pub fn then(mut self, answer: TransportResult<Value>) -> Self {
        self.answers.push_back(answer);
        self
    }

    pub fn then_ok(self, answer: Value) -> Self {
        self.then(Ok(answer))
    }

    pub fn then_err(self, error: TransportError) -> Self {
        self.then(Err(error))
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    pub fn last(&self) -> Option<&(TransportOperation, CompiledRequest)> {
        self.calls.last()
    }

    fn record(&mut self, op: TransportOperation, request: &CompiledRequest) -> TransportResult<Value> {
        self.calls.push((op, request.clone()));
        self.answers
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Failed("no scripted answer".to_string())))
    }
}

impl Transport for RecordingTransport {
    fn search(&mut self, request: &CompiledRequest) -> TransportResult<Value> {
        self.record(TransportOperation::Search, request)
    }

    fn create(&mut self, request: &CompiledRequest) -> TransportResult<Value> {
        self.record(TransportOperation::Create, request)
    }

    fn update(&mut self, request: &CompiledRequest) -> TransportResult<Value> {
        self.record(TransportOperation::Update, request)
    }

    fn delete(&mut self, request: &CompiledRequest) -> TransportResult<Value> {
        self.record(TransportOperation::Delete, request)
    }

    fn delete_by_query(&mut self, request: &CompiledRequest) -> TransportResult<Value> {
        self.record(TransportOperation::DeleteByQuery, request)
    }
}

/// A search answer with the given hits and total
pub fn search_answer(total: Value, hits: Value) -> Value {
    json!({
        "took": 5,
        "timed_out": false,
        "_shards": { "total": 2, "successful": 2, "skipped": 0, "failed": 0 },
        "hits": {
            "total": total,
            "max_score": 1.5,
            "hits": hits
        }
    })
}

/// One raw engine hit
pub fn hit(id: &str, score: f64, source: Value) -> Value {
    json!({ "_index": "users", "_id": id, "_score": score, "_source": source })
}
