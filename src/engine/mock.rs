//! Scripted in-memory backend
//!
//! Serves a fixed list of items, can fail at any step, and counts every
//! handle it hands out so callers can check that each one came back.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::engine::backend::{
    is_tolerated_init_status, Backend, BackendError, ConnectionArgs, NamedProperties, S_OK,
};
use crate::engine::value::Value;

/// Pipeline step at which the mock should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockStage {
    Initialize,
    CreateLocator,
    Dispatch,
    Connect,
    ExecQuery,
    Enumerate,
    /// Advancing to the item with this 1-based position
    Next(usize),
}

/// One result object: properties in declaration order
#[derive(Debug, Clone, Default)]
pub struct MockItem {
    properties: Vec<(String, Value)>,
}

impl MockItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }
}

/// Shared instrumentation for every handle a [`MockBackend`] creates
#[derive(Debug, Default)]
pub struct MockCounters {
    acquired: AtomicUsize,
    released: AtomicUsize,
    active_runtimes: AtomicUsize,
    max_active_runtimes: AtomicUsize,
    initializations: AtomicUsize,
    last_query: Mutex<Option<String>>,
    last_args: Mutex<Option<ConnectionArgs>>,
}

impl MockCounters {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Handles currently alive
    pub fn outstanding(&self) -> usize {
        self.acquired().saturating_sub(self.released())
    }

    /// Highest number of runtimes ever alive at the same time
    pub fn max_active_runtimes(&self) -> usize {
        self.max_active_runtimes.load(Ordering::SeqCst)
    }

    /// Times `initialize` was reached
    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().ok().and_then(|q| q.clone())
    }

    pub fn last_args(&self) -> Option<ConnectionArgs> {
        self.last_args.lock().ok().and_then(|a| a.clone())
    }
}

/// A counted native handle
#[derive(Debug)]
pub struct MockHandle {
    kind: &'static str,
    counters: Arc<MockCounters>,
}

impl MockHandle {
    fn acquire(kind: &'static str, counters: &Arc<MockCounters>) -> Self {
        counters.acquired.fetch_add(1, Ordering::SeqCst);
        Self {
            kind,
            counters: Arc::clone(counters),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct MockRuntime {
    _handle: MockHandle,
    counters: Arc<MockCounters>,
}

impl Drop for MockRuntime {
    fn drop(&mut self) {
        self.counters.active_runtimes.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct MockResultSet {
    _handle: MockHandle,
    items: Vec<MockItem>,
}

#[derive(Debug)]
pub struct MockEnumerator {
    _handle: MockHandle,
    items: std::vec::IntoIter<MockItem>,
    position: usize,
}

#[derive(Debug)]
pub struct MockObject {
    _handle: MockHandle,
    item: MockItem,
}

impl NamedProperties for MockObject {
    fn get(&self, name: &str) -> Result<Value, BackendError> {
        self.item
            .properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| BackendError::with_code(0x8004_1002_u32 as i32, format!("Not found: {}", name)))
    }

    fn property_names(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.item.properties.iter().map(|(key, _)| key.clone()).collect())
    }
}

/// In-memory [`Backend`] with failure injection
#[derive(Debug, Clone)]
pub struct MockBackend {
    items: Vec<MockItem>,
    fail_at: Option<MockStage>,
    nil_locator: bool,
    nil_enumerator: bool,
    init_status: i32,
    latency: Option<Duration>,
    counters: Arc<MockCounters>,
}

impl MockBackend {
    pub fn new(items: Vec<MockItem>) -> Self {
        Self {
            items,
            fail_at: None,
            nil_locator: false,
            nil_enumerator: false,
            init_status: S_OK,
            latency: None,
            counters: Arc::new(MockCounters::default()),
        }
    }

    pub fn failing_at(mut self, stage: MockStage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    pub fn with_nil_locator(mut self) -> Self {
        self.nil_locator = true;
        self
    }

    pub fn with_nil_enumerator(mut self) -> Self {
        self.nil_enumerator = true;
        self
    }

    /// Raw status the runtime initialization reports
    pub fn with_init_status(mut self, code: i32) -> Self {
        self.init_status = code;
        self
    }

    /// Hold the runtime for this long, to widen concurrency windows
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn counters(&self) -> Arc<MockCounters> {
        Arc::clone(&self.counters)
    }

    fn check(&self, stage: MockStage) -> Result<(), BackendError> {
        if self.fail_at == Some(stage) {
            return Err(BackendError::with_code(
                0x8000_4005_u32 as i32,
                format!("injected failure at {:?}", stage),
            ));
        }
        Ok(())
    }
}

impl Backend for MockBackend {
    type Runtime = MockRuntime;
    type Locator = MockHandle;
    type Dispatch = MockHandle;
    type Service = MockHandle;
    type ResultSet = MockResultSet;
    type Enumerator = MockEnumerator;
    type Item = MockObject;

    fn initialize(&self) -> Result<MockRuntime, BackendError> {
        self.counters.initializations.fetch_add(1, Ordering::SeqCst);
        self.check(MockStage::Initialize)?;
        if !is_tolerated_init_status(self.init_status) {
            return Err(BackendError::with_code(self.init_status, "CoInitializeEx failed"));
        }

        let active = self.counters.active_runtimes.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_active_runtimes.fetch_max(active, Ordering::SeqCst);
        let runtime = MockRuntime {
            _handle: MockHandle::acquire("runtime", &self.counters),
            counters: Arc::clone(&self.counters),
        };

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        Ok(runtime)
    }

    fn create_locator(&self, _runtime: &MockRuntime) -> Result<Option<MockHandle>, BackendError> {
        self.check(MockStage::CreateLocator)?;
        if self.nil_locator {
            return Ok(None);
        }
        Ok(Some(MockHandle::acquire("locator", &self.counters)))
    }

    fn dispatch(&self, _locator: &MockHandle) -> Result<MockHandle, BackendError> {
        self.check(MockStage::Dispatch)?;
        Ok(MockHandle::acquire("dispatch", &self.counters))
    }

    fn connect(&self, _dispatch: &MockHandle, args: &ConnectionArgs) -> Result<MockHandle, BackendError> {
        if let Ok(mut last) = self.counters.last_args.lock() {
            *last = Some(args.clone());
        }
        self.check(MockStage::Connect)?;
        Ok(MockHandle::acquire("service", &self.counters))
    }

    fn exec_query(&self, _service: &MockHandle, query: &str) -> Result<MockResultSet, BackendError> {
        if let Ok(mut last) = self.counters.last_query.lock() {
            *last = Some(query.to_string());
        }
        self.check(MockStage::ExecQuery)?;
        Ok(MockResultSet {
            _handle: MockHandle::acquire("result_set", &self.counters),
            items: self.items.clone(),
        })
    }

    fn enumerate(&self, results: &mut MockResultSet) -> Result<Option<MockEnumerator>, BackendError> {
        self.check(MockStage::Enumerate)?;
        if self.nil_enumerator {
            return Ok(None);
        }
        Ok(Some(MockEnumerator {
            _handle: MockHandle::acquire("enumerator", &self.counters),
            items: std::mem::take(&mut results.items).into_iter(),
            position: 0,
        }))
    }

    fn next_item(&self, enumerator: &mut MockEnumerator) -> Result<Option<MockObject>, BackendError> {
        enumerator.position += 1;
        self.check(MockStage::Next(enumerator.position))?;
        Ok(enumerator.items.next().map(|item| MockObject {
            _handle: MockHandle::acquire("item", &self.counters),
            item,
        }))
    }
}
