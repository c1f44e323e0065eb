//! Fluent client
//!
//! `Elastic` owns one query state under construction and one transport.
//! Builder calls mutate the state; terminal calls compile a snapshot of
//! it, hand the request to the transport and translate the answer.
//!
//! After a compiled request reaches the transport the state is replaced
//! by a fresh one carrying only the index and document type, whatever
//! the transport returned. A request that fails to compile leaves the
//! state untouched so the caller can fix it.

use serde_json::{json, Map, Value};

use crate::compiler::{CompileResult, CompiledRequest, Resolver};
use crate::observability::{log_event, Event, Logger, ObservationScope};
use crate::query::{AggregationKind, Filters, QueryError, QueryState, SortDirection};
use crate::response::{Document, Paginator, SearchResult};

use super::config::ElasticConfig;
use super::errors::{ElasticError, ElasticResult};
use super::transport::{Transport, TransportError, TransportOperation, TransportResult};

/// Engine `result` values for successful writes
const RESULT_CREATED: &str = "created";
const RESULT_UPDATED: &str = "updated";
const RESULT_NOOP: &str = "noop";
const RESULT_DELETED: &str = "deleted";

/// Default document field holding the id on create
pub const DEFAULT_ID_FIELD: &str = "id";

pub struct Elastic<T: Transport> {
    transport: T,
    state: QueryState,
    last_request: Option<CompiledRequest>,
}

impl<T: Transport> Elastic<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: QueryState::new(),
            last_request: None,
        }
    }

    /// Builds a client targeting the configured default index and applies
    /// the configured log level.
    pub fn from_config(config: &ElasticConfig, transport: T) -> ElasticResult<Self> {
        config.validate()?;
        Logger::set_min_severity(config.severity()?);

        let hosts = config.hosts.join(",");
        let retries = config.retries.to_string();
        log_event(
            Event::ConfigLoaded,
            &[
                ("hosts", hosts.as_str()),
                ("index", config.index.as_str()),
                ("retries", retries.as_str()),
            ],
        );

        Ok(Self {
            transport,
            state: QueryState::for_index(config.index.as_str()),
            last_request: None,
        })
    }

    // ==================
    // Targeting
    // ==================

    pub fn index(&mut self, index: &str) -> &mut Self {
        self.state.set_index(index);
        self
    }

    pub fn doc_type(&mut self, document_type: &str) -> &mut Self {
        self.state.set_document_type(document_type);
        self
    }

    // ==================
    // Paging and projection
    // ==================

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.state.set_limit(limit);
        self
    }

    /// Alias of [`Elastic::limit`]
    pub fn take(&mut self, limit: u64) -> &mut Self {
        self.limit(limit)
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.state.set_offset(offset);
        self
    }

    /// Alias of [`Elastic::offset`]
    pub fn skip(&mut self, offset: u64) -> &mut Self {
        self.offset(offset)
    }

    /// Restricts returned `_source` fields; repeated columns are kept once
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.add_columns(columns);
        self
    }

    pub fn scroll(&mut self, token: &str) -> &mut Self {
        self.state.set_scroll(token);
        self
    }

    // ==================
    // Sorts and aggregations
    // ==================

    pub fn order_by(&mut self, field: &str, direction: SortDirection) -> &mut Self {
        self.state.add_sort(field, direction.to_spec());
        self
    }

    /// Sort with a raw engine spec, e.g. `{"order": "asc", "missing": "_last"}`
    pub fn order_by_spec(&mut self, field: &str, spec: Value) -> &mut Self {
        self.state.add_sort(field, spec);
        self
    }

    /// Aggregation named after `field`
    pub fn agg_by(&mut self, field: &str, kind: AggregationKind) -> &mut Self {
        self.state.add_aggregation(field, kind.to_spec(field));
        self
    }

    pub fn agg(&mut self, name: &str, spec: Value) -> &mut Self {
        self.state.add_aggregation(name, spec);
        self
    }

    // ==================
    // State access
    // ==================

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut QueryState {
        &mut self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The most recent request handed to the transport
    pub fn last_request(&self) -> Option<&CompiledRequest> {
        self.last_request.as_ref()
    }

    // ==================
    // Writes
    // ==================

    /// Creates `document`, taking its id from `id_field` when present.
    ///
    /// Returns the document with `_id` and the raw engine answer under
    /// `_result` injected. Without an id the engine assigns one, which is
    /// read back from its answer.
    pub fn create(&mut self, document: Value, id_field: &str) -> ElasticResult<Value> {
        let document = match document {
            Value::Object(map) => map,
            _ => {
                return Err(QueryError::invalid_argument("create expects a JSON object").into())
            }
        };
        let id = document.get(id_field).and_then(id_string);

        let scope = ObservationScope::with_fields(
            "CREATE",
            &[("id", id.as_deref().unwrap_or(""))],
        );
        let outcome = self.try_create(document, id);
        observe(scope, outcome)
    }

    fn try_create(
        &mut self,
        mut document: Map<String, Value>,
        id: Option<String>,
    ) -> ElasticResult<Value> {
        let body = Value::Object(document.clone());
        let (_, response) = self.execute(TransportOperation::Create, |state| {
            Resolver::resolve_create(state, id.as_deref(), body)
        })?;

        let result = response.map_err(|e| match e {
            TransportError::Conflict(reason) => ElasticError::DocumentExists(reason),
            e => e.into(),
        })?;
        let status = expect_result(&result, &[RESULT_CREATED])?;

        let id = match id {
            Some(id) => Value::String(id),
            None => result.get("_id").cloned().unwrap_or(Value::Null),
        };
        let id_text = id_string(&id).unwrap_or_default();
        log_event(Event::DocumentCreated, &[("id", id_text.as_str()), ("result", status)]);

        document.insert("_id".to_string(), id);
        document.insert("_result".to_string(), result);
        Ok(Value::Object(document))
    }

    /// Partially updates a document. A `noop` answer counts as success.
    pub fn update(&mut self, id: &str, partial: Value) -> ElasticResult<()> {
        let scope = ObservationScope::with_fields("UPDATE", &[("id", id)]);
        let outcome = self.try_update(id, partial);
        observe(scope, outcome)
    }

    fn try_update(&mut self, id: &str, partial: Value) -> ElasticResult<()> {
        let (_, response) = self.execute(TransportOperation::Update, |state| {
            Resolver::resolve_update(state, id, partial)
        })?;

        let result = response.map_err(|e| not_found_document(e, id))?;
        let status = expect_result(&result, &[RESULT_UPDATED, RESULT_NOOP])?;
        log_event(Event::DocumentUpdated, &[("id", id), ("result", status)]);
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> ElasticResult<()> {
        let scope = ObservationScope::with_fields("DELETE", &[("id", id)]);
        let outcome = self.try_delete(id);
        observe(scope, outcome)
    }

    fn try_delete(&mut self, id: &str) -> ElasticResult<()> {
        let (_, response) = self.execute(TransportOperation::Delete, |state| {
            Resolver::resolve_delete(state, id)
        })?;

        let result = response.map_err(|e| not_found_document(e, id))?;
        expect_result(&result, &[RESULT_DELETED])?;
        log_event(Event::DocumentDeleted, &[("id", id)]);
        Ok(())
    }

    /// Deletes every document under the target index. Declared predicates
    /// are discarded.
    pub fn flush(&mut self) -> ElasticResult<Value> {
        let scope = ObservationScope::new("FLUSH");
        let outcome = self
            .execute(TransportOperation::DeleteByQuery, Resolver::resolve_flush)
            .and_then(|(request, response)| {
                let result = response?;
                log_event(Event::IndexFlushed, &[("index", request.index().unwrap_or(""))]);
                Ok(result)
            });
        observe(scope, outcome)
    }

    // ==================
    // Reads
    // ==================

    /// Runs the search and returns the engine's answer undecoded
    pub fn raw_search(&mut self) -> ElasticResult<Value> {
        let (_, raw) = self.search(Resolver::resolve_search)?;
        Ok(raw)
    }

    /// First matching document. Fails with `NoHits` when nothing matches.
    ///
    /// The limit of one applies to this request only; the declared limit
    /// survives a rejected compile.
    pub fn first(&mut self) -> ElasticResult<Document> {
        let (request, raw) = self.search(|state| {
            let mut windowed = state.clone();
            windowed.set_limit(1);
            Resolver::resolve_search(&windowed)
        })?;
        let result = SearchResult::decode(raw, request)?;
        Ok(result.into_first()?)
    }

    /// All hits of the current page plus totals and aggregations
    pub fn list(&mut self) -> ElasticResult<Paginator> {
        let (request, raw) = self.search(Resolver::resolve_search)?;
        let result = SearchResult::decode(raw, request)?;
        Ok(Paginator::new(result))
    }

    /// Fetches one 1-based page of `per_page` hits
    pub fn paginate(&mut self, page: u64, per_page: u64) -> ElasticResult<Paginator> {
        if page == 0 {
            return Err(QueryError::invalid_argument("page must start at 1").into());
        }
        if per_page == 0 {
            return Err(QueryError::invalid_argument("per_page must be > 0").into());
        }
        let offset = (page - 1)
            .checked_mul(per_page)
            .ok_or_else(|| QueryError::invalid_argument("page window overflows"))?;

        let (request, raw) = self.search(|state| {
            let mut windowed = state.clone();
            windowed.set_limit(per_page);
            windowed.set_offset(offset);
            Resolver::resolve_search(&windowed)
        })?;
        let result = SearchResult::decode(raw, request)?;
        Ok(Paginator::new(result))
    }

    fn search<F>(&mut self, compile: F) -> ElasticResult<(CompiledRequest, Value)>
    where
        F: FnOnce(&QueryState) -> CompileResult<CompiledRequest>,
    {
        let scope = ObservationScope::new("SEARCH");
        let outcome = self
            .execute(TransportOperation::Search, compile)
            .and_then(|(request, response)| {
                let raw = response?;
                log_event(Event::SearchCompleted, &[("index", request.index().unwrap_or(""))]);
                Ok((request, raw))
            });
        observe(scope, outcome)
    }

    /// Compiles a snapshot, hands it to the transport and resets the state.
    ///
    /// The outer error is a compilation failure; the inner result is the
    /// transport's answer, left for the caller to translate.
    fn execute<F>(
        &mut self,
        operation: TransportOperation,
        compile: F,
    ) -> ElasticResult<(CompiledRequest, TransportResult<Value>)>
    where
        F: FnOnce(&QueryState) -> CompileResult<CompiledRequest>,
    {
        let snapshot = self.state.snapshot();
        let request = match compile(&snapshot) {
            Ok(request) => request,
            Err(e) => {
                log_event(
                    Event::RequestRejected,
                    &[("code", e.code()), ("operation", operation.as_str())],
                );
                return Err(e.into());
            }
        };

        let index = request.index().unwrap_or("");
        log_event(
            Event::RequestDispatched,
            &[("index", index), ("operation", operation.as_str())],
        );
        let response = self.transport.dispatch(operation, &request);

        self.state = snapshot.reset();
        self.last_request = Some(request.clone());
        log_event(Event::StateReset, &[("index", index)]);

        if let Err(e) = &response {
            let reason = e.to_string();
            log_event(
                Event::TransportFailed,
                &[
                    ("code", e.code()),
                    ("operation", operation.as_str()),
                    ("reason", reason.as_str()),
                ],
            );
        }

        Ok((request, response))
    }
}

impl<T: Transport> Filters for Elastic<T> {
    fn filter_state(&mut self) -> &mut QueryState {
        &mut self.state
    }
}

/// Closes `scope` as completed or failed according to `outcome`
fn observe<R>(scope: ObservationScope, outcome: ElasticResult<R>) -> ElasticResult<R> {
    match &outcome {
        Ok(_) => scope.complete(),
        Err(e) => scope.fail(e.code()),
    }
    outcome
}

fn not_found_document(error: TransportError, id: &str) -> ElasticError {
    match error {
        TransportError::NotFound(_) => ElasticError::NotFoundDocument(id.to_string()),
        e => e.into(),
    }
}

/// Checks the engine's `result` field against the accepted values
fn expect_result<'a>(result: &'a Value, accepted: &[&str]) -> ElasticResult<&'a str> {
    match result.get("result").and_then(Value::as_str) {
        Some(status) if accepted.contains(&status) => Ok(status),
        other => {
            let status = other.map(str::to_string).unwrap_or_else(|| json!(null).to_string());
            log_event(Event::UnexpectedResult, &[("result", status.as_str())]);
            Err(ElasticError::unexpected_result(status))
        }
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
