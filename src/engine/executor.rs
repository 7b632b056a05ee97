//! Query executor
//!
//! Drives a [`Backend`] through the full acquisition sequence for one query:
//! runtime, locator, dispatch, service, result set, enumerator, items.
//! Handles are locals of [`drive`], so they are released in reverse order on
//! every exit path before the runtime lease is given back.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use tracing::{debug, info, info_span, warn, Span};

use crate::engine::backend::{Backend, ConnectionArgs, NamedProperties};
use crate::engine::guard::RuntimeGuard;
use crate::engine::platform::PlatformBackend;
use crate::engine::value::{Record, ResultSet};
use crate::error::{QueryFailure, Result, WmiqError};
use crate::output::OutputFormat;
use crate::parser::{parse_query, ColumnList, ParsedQuery};

/// Runtime configuration for the CLI and batch runner
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub output_format: OutputFormat,
    pub verbose: bool,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Human,
            verbose: false,
        }
    }
}

/// Runs queries against a management backend.
///
/// Every call, on any executor, is serialized through [`RuntimeGuard`] and
/// runs on its own short-lived worker thread.
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor<B = PlatformBackend> {
    backend: B,
}

impl QueryExecutor<PlatformBackend> {
    /// Executor over the host's instrumentation service
    pub fn new() -> Self {
        Self::with_backend(PlatformBackend::default())
    }
}

impl<B> QueryExecutor<B>
where
    B: Backend + Sync,
{
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Execute `query`, returning one record per result item.
    ///
    /// Malformed queries fail before the runtime is touched. On a later
    /// failure the records gathered so far come back in the
    /// [`QueryFailure`].
    pub fn execute(&self, query: &str, args: &ConnectionArgs) -> std::result::Result<ResultSet, QueryFailure> {
        let parsed = parse_query(query)?;
        self.execute_parsed(&parsed, args)
    }

    /// Execute an already parsed query.
    pub fn execute_parsed(
        &self,
        parsed: &ParsedQuery,
        args: &ConnectionArgs,
    ) -> std::result::Result<ResultSet, QueryFailure> {
        let span = info_span!("wmi_query", query = %parsed.text, columns = parsed.columns.len());
        let _entered = span.enter();

        let _lease = RuntimeGuard::acquire();

        // The runtime binds state to the calling thread; give each query a
        // fresh one and join it only after teardown.
        let outcome = std::thread::scope(|scope| {
            let worker_span = Span::current();
            let worker = std::thread::Builder::new()
                .name("wmiq-runtime".to_string())
                .spawn_scoped(scope, move || {
                    let _entered = worker_span.enter();
                    run_pipeline(&self.backend, parsed, args)
                });

            match worker {
                Ok(handle) => handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic)),
                Err(e) => Err(QueryFailure::from(WmiqError::IoError(e))),
            }
        });

        match &outcome {
            Ok(records) => info!(records = records.len(), "query completed"),
            Err(failure) => warn!(
                stage = failure.error.stage(),
                partial = failure.partial.len(),
                error = %failure.error,
                "query failed"
            ),
        }
        outcome
    }

    /// Execute `query` and deserialize each record into `T`.
    ///
    /// Partial records are discarded on failure.
    pub fn query_as<T: DeserializeOwned>(&self, query: &str, args: &ConnectionArgs) -> Result<Vec<T>> {
        let records = self.execute(query, args)?;
        records
            .into_iter()
            .map(|record| {
                let value = serde_json::to_value(record)?;
                Ok(serde_json::from_value(value)?)
            })
            .collect()
    }
}

fn run_pipeline<B: Backend>(
    backend: &B,
    parsed: &ParsedQuery,
    args: &ConnectionArgs,
) -> std::result::Result<ResultSet, QueryFailure> {
    let mut records = ResultSet::new();
    match drive(backend, parsed, args, &mut records) {
        Ok(()) => Ok(records),
        Err(error) => Err(QueryFailure::new(error, records)),
    }
}

fn drive<B: Backend>(
    backend: &B,
    parsed: &ParsedQuery,
    args: &ConnectionArgs,
    records: &mut ResultSet,
) -> Result<()> {
    let runtime = backend.initialize().map_err(WmiqError::RuntimeInit)?;
    debug!("runtime initialized");

    let locator = backend
        .create_locator(&runtime)
        .map_err(WmiqError::ObjectCreation)?
        .ok_or(WmiqError::NilObject)?;
    debug!("locator created");

    let dispatch = backend.dispatch(&locator).map_err(WmiqError::Interface)?;
    debug!("dispatch interface obtained");

    let service = backend.connect(&dispatch, args).map_err(WmiqError::Connection)?;
    debug!(args = args.len(), "connected to management service");

    let mut result_set = backend
        .exec_query(&service, &parsed.text)
        .map_err(WmiqError::QueryExecution)?;
    debug!("query executed");

    let mut enumerator = backend
        .enumerate(&mut result_set)
        .map_err(WmiqError::Enumerator)?
        .ok_or(WmiqError::NilEnumerator)?;

    let mut position = 0;
    while let Some(item) = backend.next_item(&mut enumerator).map_err(WmiqError::Enumerator)? {
        position += 1;
        records.push(read_record(&item, &parsed.columns, position)?);
    }
    debug!(items = position, "enumeration finished");

    Ok(())
}

/// Read every requested column off one item. Any failed read aborts.
fn read_record<P: NamedProperties>(item: &P, columns: &ColumnList, position: usize) -> Result<Record> {
    let names: Cow<'_, [String]> = if columns.is_wildcard() {
        Cow::Owned(item.property_names().map_err(|source| WmiqError::PropertyRead {
            column: "*".to_string(),
            item: position,
            source,
        })?)
    } else {
        Cow::Borrowed(columns.names())
    };

    let mut record = Record::with_capacity(names.len());
    for name in names.iter() {
        let value = item.get(name).map_err(|source| WmiqError::PropertyRead {
            column: name.clone(),
            item: position,
            source,
        })?;
        record.insert(name.clone(), value);
    }
    Ok(record)
}
