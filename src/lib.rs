//! wmiq - Query Windows Management Instrumentation with SQL-like strings
//!
//! A query such as `SELECT Name, ProcessId FROM Win32_Process` is sent
//! verbatim to the management service; the columns between `SELECT` and
//! `FROM` decide which properties are read off each result item.
//!
//! All queries in the process are serialized through one runtime lock and
//! run on a dedicated worker thread.
//!
//! # Example
//!
//! ```no_run
//! use wmiq::{ConnectionArgs, QueryExecutor};
//!
//! let executor = QueryExecutor::new();
//! let records = executor
//!     .execute("SELECT Name, ProcessId FROM Win32_Process", &ConnectionArgs::new())
//!     .unwrap();
//! for record in &records {
//!     println!("{} {}", record["ProcessId"], record["Name"]);
//! }
//! ```

pub mod cli;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod parser;
pub mod script;

pub use engine::{
    Backend, BackendError, ConnectArg, ConnectionArgs, ExecutionContext, NamedProperties,
    PlatformBackend, QueryExecutor, Record, ResultSet, RuntimeGuard, Value,
};
pub use error::{QueryFailure, Result, WmiqError};
pub use output::{format_explain, format_output, OutputFormat};
pub use parser::{build_query, parse_batch, parse_query, ColumnList, FilterValue, ParsedQuery};
pub use script::{validate_batch, BatchResult, BatchRunner};
