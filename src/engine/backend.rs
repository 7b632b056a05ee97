//! The seam between the query pipeline and a native automation runtime
//!
//! A [`Backend`] exposes each step of the acquisition sequence as a separate
//! call returning an owned handle. Handles release their native resource on
//! `Drop`, so the executor only has to keep them in scope.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::value::Value;

/// Status returned by a successful runtime initialization.
pub const S_OK: i32 = 0;
/// Runtime was already initialized on this thread; still a success.
pub const S_FALSE: i32 = 1;

/// Whether a runtime initialization status should be treated as success.
pub fn is_tolerated_init_status(code: i32) -> bool {
    code == S_OK || code == S_FALSE
}

/// Failure reported by a native call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}{}", format_code(.code))]
pub struct BackendError {
    /// Native status code (an HRESULT on Windows), when one was reported
    pub code: Option<i32>,
    pub message: String,
}

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" (status 0x{:08X})", *code as u32),
        None => String::new(),
    }
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

/// One positional connect argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConnectArg {
    Null,
    Int(i32),
    Str(String),
}

pub const SLOT_SERVER: usize = 0;
pub const SLOT_NAMESPACE: usize = 1;
pub const SLOT_USER: usize = 2;
pub const SLOT_PASSWORD: usize = 3;
pub const SLOT_LOCALE: usize = 4;
pub const SLOT_AUTHORITY: usize = 5;
pub const SLOT_SECURITY_FLAGS: usize = 6;

/// Ordered values forwarded verbatim to the service connect call.
///
/// Positions follow the locator's connect signature: server, namespace,
/// user, password, locale, authority, security flags. Nothing here is
/// validated; that is the service's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionArgs(Vec<ConnectArg>);

impl ConnectionArgs {
    /// No arguments: local machine, default namespace, current user.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: Vec<ConnectArg>) -> Self {
        Self(values)
    }

    pub fn builder() -> ConnectionArgsBuilder {
        ConnectionArgsBuilder::default()
    }

    pub fn values(&self) -> &[ConnectArg] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// String argument at `slot`, if present and non-empty.
    pub fn str_at(&self, slot: usize) -> Option<&str> {
        match self.0.get(slot) {
            Some(ConnectArg::Str(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn int_at(&self, slot: usize) -> Option<i32> {
        match self.0.get(slot) {
            Some(ConnectArg::Int(n)) => Some(*n),
            _ => None,
        }
    }
}

/// Fills the positional slots of [`ConnectionArgs`] by name.
#[derive(Debug, Clone, Default)]
pub struct ConnectionArgsBuilder {
    slots: [Option<ConnectArg>; 7],
}

impl ConnectionArgsBuilder {
    fn set(mut self, slot: usize, value: Option<ConnectArg>) -> Self {
        self.slots[slot] = value;
        self
    }

    pub fn server(self, server: impl Into<String>) -> Self {
        self.set(SLOT_SERVER, Some(ConnectArg::Str(server.into())))
    }

    pub fn namespace(self, namespace: impl Into<String>) -> Self {
        self.set(SLOT_NAMESPACE, Some(ConnectArg::Str(namespace.into())))
    }

    pub fn user(self, user: impl Into<String>) -> Self {
        self.set(SLOT_USER, Some(ConnectArg::Str(user.into())))
    }

    pub fn password(self, password: impl Into<String>) -> Self {
        self.set(SLOT_PASSWORD, Some(ConnectArg::Str(password.into())))
    }

    pub fn locale(self, locale: impl Into<String>) -> Self {
        self.set(SLOT_LOCALE, Some(ConnectArg::Str(locale.into())))
    }

    pub fn authority(self, authority: impl Into<String>) -> Self {
        self.set(SLOT_AUTHORITY, Some(ConnectArg::Str(authority.into())))
    }

    pub fn security_flags(self, flags: i32) -> Self {
        self.set(SLOT_SECURITY_FLAGS, Some(ConnectArg::Int(flags)))
    }

    /// Unset trailing slots are dropped; unset slots before a set one become
    /// [`ConnectArg::Null`].
    pub fn build(self) -> ConnectionArgs {
        let used = self
            .slots
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |last| last + 1);

        ConnectionArgs(
            self.slots
                .into_iter()
                .take(used)
                .map(|slot| slot.unwrap_or(ConnectArg::Null))
                .collect(),
        )
    }
}

/// Read access to the named properties of a result item.
pub trait NamedProperties {
    fn get(&self, name: &str) -> Result<Value, BackendError>;

    /// Every property name the item exposes, used for `SELECT *`.
    fn property_names(&self) -> Result<Vec<String>, BackendError>;
}

/// A native management runtime, driven one step at a time.
///
/// Each associated type is a handle that releases itself when dropped.
/// All calls for one query happen on a single thread, in the order the
/// methods are declared.
pub trait Backend {
    type Runtime;
    type Locator;
    type Dispatch;
    type Service;
    type ResultSet;
    type Enumerator;
    type Item: NamedProperties;

    /// Initialize the automation runtime for the current thread
    /// (multi-threaded apartment).
    fn initialize(&self) -> Result<Self::Runtime, BackendError>;

    /// Instantiate the locator object. `Ok(None)` is an empty handle.
    fn create_locator(&self, runtime: &Self::Runtime) -> Result<Option<Self::Locator>, BackendError>;

    fn dispatch(&self, locator: &Self::Locator) -> Result<Self::Dispatch, BackendError>;

    fn connect(&self, dispatch: &Self::Dispatch, args: &ConnectionArgs) -> Result<Self::Service, BackendError>;

    fn exec_query(&self, service: &Self::Service, query: &str) -> Result<Self::ResultSet, BackendError>;

    /// Obtain an enumerator over the result set. `Ok(None)` is an empty
    /// handle.
    fn enumerate(&self, results: &mut Self::ResultSet) -> Result<Option<Self::Enumerator>, BackendError>;

    /// Advance by one item; `Ok(None)` once exhausted.
    fn next_item(&self, enumerator: &mut Self::Enumerator) -> Result<Option<Self::Item>, BackendError>;
}
