//! Batch runner for executing .wql files

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::engine::backend::{Backend, ConnectionArgs};
use crate::engine::value::ResultSet;
use crate::engine::{ExecutionContext, QueryExecutor};
use crate::error::{Result, WmiqError};
use crate::output::format_output;
use crate::parser::{parse_batch, parse_query, Batch};
use crate::script::validator::validate_batch;

/// Records returned by one batch line
#[derive(Debug)]
pub struct StatementResult {
    pub line: usize,
    pub query: String,
    pub records: ResultSet,
}

/// Result of batch execution
#[derive(Debug)]
pub struct BatchResult {
    /// Results of statements that completed
    pub results: Vec<StatementResult>,
    /// Total statements executed successfully
    pub statements_executed: usize,
    /// Whether every statement completed
    pub success: bool,
    /// Error message of the failing statement
    pub error: Option<String>,
    /// Records the failing statement returned before it failed
    pub partial: ResultSet,
}

/// Runs every query of a batch in order, stopping at the first failure
pub struct BatchRunner<'a, B, W> {
    executor: &'a QueryExecutor<B>,
    args: &'a ConnectionArgs,
    exec_ctx: ExecutionContext,
    out: W,
}

impl<'a, B, W> BatchRunner<'a, B, W>
where
    B: Backend + Sync,
    W: Write,
{
    pub fn new(executor: &'a QueryExecutor<B>, args: &'a ConnectionArgs, exec_ctx: ExecutionContext, out: W) -> Self {
        Self {
            executor,
            args,
            exec_ctx,
            out,
        }
    }

    /// Load, validate and run a batch file
    pub fn run_file(&mut self, path: &Path) -> Result<BatchResult> {
        if path.extension().is_none_or(|e| e != "wql") {
            return Err(WmiqError::InvalidBatch(format!(
                "batch file must have .wql extension: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let batch = parse_batch(&content);

        let errors = validate_batch(&batch);
        if !errors.is_empty() {
            let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(WmiqError::InvalidBatch(details.join("; ")));
        }

        self.run_batch(&batch)
    }

    /// Run a parsed batch, writing each statement's output as it completes
    pub fn run_batch(&mut self, batch: &Batch) -> Result<BatchResult> {
        let mut results = Vec::new();

        for stmt in &batch.statements {
            let parsed = parse_query(&stmt.query)?;
            if self.exec_ctx.verbose {
                writeln!(self.out, "-- line {}: {}", stmt.line, stmt.query)?;
            }

            match self.executor.execute_parsed(&parsed, self.args) {
                Ok(records) => {
                    writeln!(
                        self.out,
                        "{}",
                        format_output(&parsed.columns, &records, &self.exec_ctx.output_format)
                    )?;
                    results.push(StatementResult {
                        line: stmt.line,
                        query: stmt.query.clone(),
                        records,
                    });
                }
                Err(failure) => {
                    if !failure.partial.is_empty() {
                        writeln!(
                            self.out,
                            "{}",
                            format_output(&parsed.columns, &failure.partial, &self.exec_ctx.output_format)
                        )?;
                    }
                    return Ok(BatchResult {
                        statements_executed: results.len(),
                        results,
                        success: false,
                        error: Some(format!("line {}: {}", stmt.line, failure.error)),
                        partial: failure.partial,
                    });
                }
            }
        }

        info!(statements = results.len(), "batch completed");
        Ok(BatchResult {
            statements_executed: results.len(),
            results,
            success: true,
            error: None,
            partial: ResultSet::new(),
        })
    }
}
