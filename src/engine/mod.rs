//! Query execution against the host management service

pub mod backend;
pub mod executor;
pub mod guard;
pub mod mock;
pub mod platform;
pub mod value;

pub use backend::{Backend, BackendError, ConnectArg, ConnectionArgs, NamedProperties};
pub use executor::{ExecutionContext, QueryExecutor};
pub use guard::{RuntimeGuard, RuntimeLease};
pub use platform::PlatformBackend;
pub use value::{Record, ResultSet, Value};
