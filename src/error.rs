//! Error types for wmiq

use thiserror::Error;

use crate::engine::backend::BackendError;
use crate::engine::value::ResultSet;

#[derive(Error, Debug)]
pub enum WmiqError {
    #[error("Invalid query, {0}")]
    MalformedQuery(String),

    #[error("Failed to initialize the automation runtime: {0}")]
    RuntimeInit(#[source] BackendError),

    #[error("Failed to create the locator object: {0}")]
    ObjectCreation(#[source] BackendError),

    #[error("Locator object creation returned an empty handle")]
    NilObject,

    #[error("Failed to obtain the dispatch interface: {0}")]
    Interface(#[source] BackendError),

    #[error("Failed to connect to the management service: {0}")]
    Connection(#[source] BackendError),

    #[error("Query execution failed: {0}")]
    QueryExecution(#[source] BackendError),

    #[error("Failed to enumerate the result set: {0}")]
    Enumerator(#[source] BackendError),

    #[error("Can't get the result enumerator, handle is empty")]
    NilEnumerator,

    #[error("Failed to read property '{column}' on item {item}: {source}")]
    PropertyRead {
        column: String,
        item: usize,
        #[source]
        source: BackendError,
    },

    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WmiqError {
    /// Short name of the pipeline stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            WmiqError::MalformedQuery(_) => "parse",
            WmiqError::RuntimeInit(_) => "initialize",
            WmiqError::ObjectCreation(_) | WmiqError::NilObject => "create_locator",
            WmiqError::Interface(_) => "dispatch",
            WmiqError::Connection(_) => "connect",
            WmiqError::QueryExecution(_) => "exec_query",
            WmiqError::Enumerator(_) | WmiqError::NilEnumerator => "enumerate",
            WmiqError::PropertyRead { .. } => "read_property",
            WmiqError::InvalidBatch(_) => "batch",
            WmiqError::InvalidArgument(_) => "arguments",
            WmiqError::Serialization(_) => "serialize",
            WmiqError::IoError(_) => "io",
        }
    }

    /// Underlying status code, when the backend reported one.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            WmiqError::RuntimeInit(e)
            | WmiqError::ObjectCreation(e)
            | WmiqError::Interface(e)
            | WmiqError::Connection(e)
            | WmiqError::QueryExecution(e)
            | WmiqError::Enumerator(e)
            | WmiqError::PropertyRead { source: e, .. } => e.code,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WmiqError>;

/// A failed query together with the records read before the failure.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct QueryFailure {
    #[source]
    pub error: WmiqError,
    /// Records appended before the failing step, in enumeration order
    pub partial: ResultSet,
}

impl QueryFailure {
    pub fn new(error: WmiqError, partial: ResultSet) -> Self {
        Self { error, partial }
    }
}

impl From<WmiqError> for QueryFailure {
    fn from(error: WmiqError) -> Self {
        Self::new(error, Vec::new())
    }
}

impl From<QueryFailure> for WmiqError {
    fn from(failure: QueryFailure) -> Self {
        failure.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_status_code() {
        let err = WmiqError::Connection(BackendError::with_code(-2147217405, "access denied"));
        assert_eq!(err.stage(), "connect");
        assert_eq!(err.status_code(), Some(-2147217405));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_property_read_message_names_column() {
        let err = WmiqError::PropertyRead {
            column: "Caption".to_string(),
            item: 2,
            source: BackendError::new("not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("'Caption'"));
        assert!(msg.contains("item 2"));
        assert_eq!(err.status_code(), None);
    }
}
