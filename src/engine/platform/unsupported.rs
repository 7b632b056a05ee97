//! Backend for hosts without management instrumentation

use std::convert::Infallible;

use crate::engine::backend::{Backend, BackendError, ConnectionArgs, NamedProperties};
use crate::engine::value::Value;

/// Fails at runtime initialization; nothing past that step is reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedBackend;

impl NamedProperties for Infallible {
    fn get(&self, _name: &str) -> Result<Value, BackendError> {
        match *self {}
    }

    fn property_names(&self) -> Result<Vec<String>, BackendError> {
        match *self {}
    }
}

impl Backend for UnsupportedBackend {
    type Runtime = Infallible;
    type Locator = Infallible;
    type Dispatch = Infallible;
    type Service = Infallible;
    type ResultSet = Infallible;
    type Enumerator = Infallible;
    type Item = Infallible;

    fn initialize(&self) -> Result<Infallible, BackendError> {
        Err(BackendError::new(format!(
            "management instrumentation is only available on Windows (host: {})",
            std::env::consts::OS
        )))
    }

    fn create_locator(&self, runtime: &Infallible) -> Result<Option<Infallible>, BackendError> {
        match *runtime {}
    }

    fn dispatch(&self, locator: &Infallible) -> Result<Infallible, BackendError> {
        match *locator {}
    }

    fn connect(&self, dispatch: &Infallible, _args: &ConnectionArgs) -> Result<Infallible, BackendError> {
        match *dispatch {}
    }

    fn exec_query(&self, service: &Infallible, _query: &str) -> Result<Infallible, BackendError> {
        match *service {}
    }

    fn enumerate(&self, results: &mut Infallible) -> Result<Option<Infallible>, BackendError> {
        match *results {}
    }

    fn next_item(&self, enumerator: &mut Infallible) -> Result<Option<Infallible>, BackendError> {
        match *enumerator {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::QueryExecutor;
    use crate::error::WmiqError;

    #[test]
    fn test_unsupported_host_fails_at_runtime_init() {
        let executor = QueryExecutor::with_backend(UnsupportedBackend);
        let failure = executor
            .execute("SELECT Name FROM Win32_Process", &ConnectionArgs::new())
            .unwrap_err();
        assert!(matches!(failure.error, WmiqError::RuntimeInit(_)));
        assert!(failure.error.to_string().contains("only available on Windows"));
    }
}
