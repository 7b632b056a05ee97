//! Batch execution of query files

pub mod runner;
pub mod validator;

pub use runner::{BatchResult, BatchRunner, StatementResult};
pub use validator::{validate_batch, BatchValidationError};
